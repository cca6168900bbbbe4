//! 带检查点的流水线阶段
//!
//! 每个阶段声明一个产物键。产物已存在时直接读取并跳过生产者，
//! 否则执行生产者并在返回前写入产物。

use std::future::Future;

use anyhow::Result;
use serde::{Serialize, de::DeserializeOwned};

use crate::cache::{ArtifactKey, Checkpointer};

/// 流水线阶段：名称与其唯一的产物
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    name: String,
    key: ArtifactKey,
}

impl Stage {
    pub fn new(name: impl Into<String>, key: ArtifactKey) -> Self {
        Self {
            name: name.into(),
            key,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &ArtifactKey {
        &self.key
    }

    /// 运行产出结构化数据的阶段
    pub async fn run_json<T, F, Fut>(&self, checkpointer: &Checkpointer, produce: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(data) = self.load_json(checkpointer).await? {
            return Ok(data);
        }

        tracing::info!("▶️ 执行阶段 [{}]", self.name);
        let data = produce().await?;
        self.save_json(checkpointer, &data).await?;
        Ok(data)
    }

    /// 运行产出文本的阶段
    pub async fn run_text<F, Fut>(&self, checkpointer: &Checkpointer, produce: F) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        if let Some(text) = checkpointer.load_text(&self.name, &self.key).await? {
            tracing::info!("⏭️ 阶段 [{}] 已有产物 {}，跳过", self.name, self.key);
            return Ok(text);
        }

        tracing::info!("▶️ 执行阶段 [{}]", self.name);
        let text = produce().await?;
        checkpointer.save_text(&self.name, &self.key, &text).await?;
        Ok(text)
    }

    pub async fn load_json<T>(&self, checkpointer: &Checkpointer) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let data = checkpointer.load_json(&self.name, &self.key).await?;
        if data.is_some() {
            tracing::info!("⏭️ 阶段 [{}] 已有产物 {}，跳过", self.name, self.key);
        }
        Ok(data)
    }

    pub async fn save_json<T>(&self, checkpointer: &Checkpointer, data: &T) -> Result<()>
    where
        T: Serialize,
    {
        checkpointer.save_json(&self.name, &self.key, data).await
    }

    // 各阶段及其产物

    pub fn queries() -> Self {
        Self::new("queries", ArtifactKey::json("queries"))
    }

    pub fn article_metadata() -> Self {
        Self::new("fetch", ArtifactKey::json("article_metadata"))
    }

    pub fn abstract_filtered() -> Self {
        Self::new("relevance", ArtifactKey::json("abstract_filtered"))
    }

    pub fn article_listing() -> Self {
        Self::new("listing", ArtifactKey::text("articles"))
    }

    pub fn bibliography() -> Self {
        Self::new("bibliography", ArtifactKey::file("citations.bib"))
    }

    pub fn methods() -> Self {
        Self::new("methods", ArtifactKey::text("methods"))
    }

    pub fn categories() -> Self {
        Self::new("categorize", ArtifactKey::json("article_categories"))
    }

    /// 第 `index` 个结果章节的文章摘要
    pub fn subsection_summaries(index: usize) -> Self {
        Self::new(
            "summaries",
            ArtifactKey::json(&format!("subsection_summaries_{}", index)),
        )
    }

    /// 第 `index` 个结果章节的正文
    pub fn subsection(index: usize) -> Self {
        Self::new("subsection", ArtifactKey::text(&format!("subsection_{}", index)))
    }

    pub fn results_intro() -> Self {
        Self::new("results_intro", ArtifactKey::text("results_intro"))
    }

    pub fn discussion_limitations() -> Self {
        Self::new(
            "discussion_limitations",
            ArtifactKey::text("discussion_limitations"),
        )
    }

    pub fn discussion_future_directions() -> Self {
        Self::new(
            "discussion_future_directions",
            ArtifactKey::text("discussion_future_directions"),
        )
    }

    pub fn discussion_intro() -> Self {
        Self::new("discussion_intro", ArtifactKey::text("discussion_intro"))
    }
}
