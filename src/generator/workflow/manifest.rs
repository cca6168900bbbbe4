use anyhow::Result;
use chrono::{DateTime, Utc};
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use crate::cache::{ArtifactKey, Checkpointer};
use crate::error::PipelineError;

const STAGE: &str = "manifest";

/// 暂存目录的运行清单，记录产物所属的主题
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunManifest {
    pub topic: String,
    /// 主题的MD5摘要
    pub topic_digest: String,
    pub created_at: DateTime<Utc>,
}

impl RunManifest {
    pub fn new(topic: &str) -> Self {
        Self {
            topic: topic.to_string(),
            topic_digest: Self::digest(topic),
            created_at: Utc::now(),
        }
    }

    pub fn key() -> ArtifactKey {
        ArtifactKey::json("manifest")
    }

    pub fn digest(topic: &str) -> String {
        let mut hasher = Md5::new();
        hasher.update(topic.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn matches(&self, topic: &str) -> bool {
        self.topic_digest == Self::digest(topic)
    }

    /// 确认暂存目录属于当前主题，首次运行时写入清单
    pub async fn ensure(checkpointer: &Checkpointer, topic: &str) -> Result<Self> {
        match checkpointer
            .load_json::<RunManifest>(STAGE, &Self::key())
            .await?
        {
            Some(manifest) if manifest.matches(topic) => {
                tracing::info!(
                    "♻️ 继续 {} 创建的运行",
                    manifest.created_at.format("%Y-%m-%d %H:%M:%S")
                );
                Ok(manifest)
            }
            Some(manifest) => Err(PipelineError::TopicMismatch {
                recorded: manifest.topic,
                requested: topic.to_string(),
            }
            .into()),
            None => {
                let manifest = Self::new(topic);
                checkpointer
                    .save_json(STAGE, &Self::key(), &manifest)
                    .await?;
                Ok(manifest)
            }
        }
    }
}
