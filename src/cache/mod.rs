use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt;

pub mod performance_monitor;
pub mod store;

pub use performance_monitor::{CheckpointMonitor, CheckpointReport};
pub use store::{DiskArtifactStore, MemoryArtifactStore};

/// 阶段产物在存储中的键（即暂存目录中的文件名）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactKey(String);

impl ArtifactKey {
    /// 结构化产物，以JSON保存
    pub fn json(stem: &str) -> Self {
        Self(format!("{}.json", stem))
    }

    /// 文本产物
    pub fn text(stem: &str) -> Self {
        Self(format!("{}.txt", stem))
    }

    /// 直接指定文件名
    pub fn file(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 阶段产物的存储后端
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// 产物是否已存在，这是判断阶段是否完成的唯一依据
    async fn contains(&self, key: &ArtifactKey) -> bool;

    async fn read(&self, key: &ArtifactKey) -> Result<Option<String>>;

    async fn write(&self, key: &ArtifactKey, contents: &str) -> Result<()>;

    /// 删除全部产物
    async fn clear(&self) -> Result<()>;
}

/// 检查点管理器：在存储后端之上提供类型化读写与命中统计
pub struct Checkpointer {
    store: Box<dyn ArtifactStore>,
    monitor: CheckpointMonitor,
}

impl Checkpointer {
    pub fn new(store: Box<dyn ArtifactStore>) -> Self {
        Self {
            store,
            monitor: CheckpointMonitor::new(),
        }
    }

    /// 检查一组产物是否全部存在
    pub async fn is_complete(&self, keys: &[&ArtifactKey]) -> bool {
        for key in keys {
            if !self.store.contains(key).await {
                return false;
            }
        }
        true
    }

    /// 读取JSON产物，不存在时返回None
    pub async fn load_json<T>(&self, stage: &str, key: &ArtifactKey) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        match self.load_text(stage, key).await? {
            Some(content) => {
                let data = serde_json::from_str(&content).map_err(|e| {
                    self.monitor
                        .record_error(stage, &format!("反序列化失败: {}", e));
                    e
                });
                Ok(Some(
                    data.with_context(|| format!("Failed to deserialize artifact {}", key))?,
                ))
            }
            None => Ok(None),
        }
    }

    /// 读取文本产物，不存在时返回None
    pub async fn load_text(&self, stage: &str, key: &ArtifactKey) -> Result<Option<String>> {
        if !self.store.contains(key).await {
            self.monitor.record_miss(stage);
            return Ok(None);
        }

        match self.store.read(key).await {
            Ok(Some(content)) => {
                self.monitor.record_hit(stage);
                Ok(Some(content))
            }
            Ok(None) => {
                self.monitor.record_miss(stage);
                Ok(None)
            }
            Err(e) => {
                self.monitor
                    .record_error(stage, &format!("读取产物失败: {}", e));
                Err(e)
            }
        }
    }

    pub async fn save_json<T>(&self, stage: &str, key: &ArtifactKey, data: &T) -> Result<()>
    where
        T: Serialize,
    {
        let content = serde_json::to_string_pretty(data)
            .with_context(|| format!("Failed to serialize artifact {}", key))?;
        self.save_text(stage, key, &content).await
    }

    pub async fn save_text(&self, stage: &str, key: &ArtifactKey, content: &str) -> Result<()> {
        match self.store.write(key, content).await {
            Ok(()) => {
                self.monitor.record_write(stage);
                Ok(())
            }
            Err(e) => {
                self.monitor
                    .record_error(stage, &format!("写入产物失败: {}", e));
                Err(e)
            }
        }
    }

    /// 清空全部产物
    pub async fn clear(&self) -> Result<()> {
        self.store.clear().await
    }

    pub fn generate_report(&self) -> CheckpointReport {
        self.monitor.generate_report()
    }
}
