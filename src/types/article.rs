use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 一条文献检索结果，获取后不再修改
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    /// 外部唯一标识，例如 `http://arxiv.org/abs/2301.01234v1`
    pub entry_id: String,

    pub title: String,

    pub authors: Vec<String>,

    /// 摘要
    pub summary: String,

    #[serde(default)]
    pub doi: Option<String>,
}

impl ArticleRecord {
    /// 标识中 `abs/` 之后的部分，用于拼接全文HTML地址
    pub fn short_id(&self) -> &str {
        match self.entry_id.split_once("/abs/") {
            Some((_, short)) => short,
            None => self.eprint(),
        }
    }

    /// 标识的最后一段路径
    pub fn eprint(&self) -> &str {
        self.entry_id.rsplit('/').next().unwrap_or(&self.entry_id)
    }
}

/// 按 `entry_id` 去重，保留首次出现的记录及其顺序
pub fn deduplicate(articles: Vec<ArticleRecord>) -> Vec<ArticleRecord> {
    let mut seen = HashSet::new();
    articles
        .into_iter()
        .filter(|article| seen.insert(article.entry_id.clone()))
        .collect()
}
