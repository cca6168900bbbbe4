//! 外部文献服务：检索API与全文HTML

use anyhow::Result;
use async_trait::async_trait;

use crate::types::ArticleRecord;

pub mod arxiv;
pub mod html;

pub use arxiv::ArxivClient;
pub use html::{HtmlArticleFetcher, extract_paragraphs};

/// 按检索词查询文献
#[async_trait]
pub trait LiteratureSearch: Send + Sync {
    /// 返回至多 `max_results` 条结果
    async fn search(&self, term: &str, max_results: usize) -> Result<Vec<ArticleRecord>>;
}

/// 获取文章渲染后的HTML全文
#[async_trait]
pub trait ArticleBodySource: Send + Sync {
    async fn fetch_body(&self, article: &ArticleRecord) -> Result<String>;
}
