use anyhow::{Context, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::sync::LazyLock;

use super::ArticleBodySource;
use crate::config::SearchConfig;
use crate::types::ArticleRecord;

static PARAGRAPH_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p.ltx_p").expect("static selector is valid"));

/// 从arXiv的HTML渲染页获取全文
pub struct HtmlArticleFetcher {
    http: reqwest::Client,
    html_base_url: String,
}

impl HtmlArticleFetcher {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            html_base_url: config.html_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url_for(&self, article: &ArticleRecord) -> String {
        format!("{}/{}", self.html_base_url, article.short_id())
    }
}

#[async_trait]
impl ArticleBodySource for HtmlArticleFetcher {
    /// 不检查HTTP状态：没有HTML版本的文章返回的错误页中不含正文段落，会在提取时被跳过
    async fn fetch_body(&self, article: &ArticleRecord) -> Result<String> {
        let url = self.url_for(article);
        self.http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch article body {}", url))?
            .text()
            .await
            .with_context(|| format!("Failed to read article body {}", url))
    }
}

/// 提取正文段落（`p.ltx_p`）的文本，每段一行；没有任何非空段落时返回None
pub fn extract_paragraphs(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let paragraphs: Vec<String> = document
        .select(&PARAGRAPH_SELECTOR)
        .map(|p| p.text().collect::<Vec<_>>().join(" "))
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|text| !text.is_empty())
        .collect();

    if paragraphs.is_empty() {
        None
    } else {
        Some(paragraphs.join("\n"))
    }
}
