use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::LiteratureSearch;
use crate::config::SearchConfig;
use crate::types::ArticleRecord;

/// arXiv检索API客户端
pub struct ArxivClient {
    http: reqwest::Client,
    api_base_url: String,
    request_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(default)]
    entry: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    author: Vec<AtomAuthor>,
    #[serde(rename = "arxiv:doi", alias = "doi", default)]
    doi: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomAuthor {
    name: String,
}

impl ArxivClient {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base_url: config.api_base_url.clone(),
            request_interval: Duration::from_millis(config.request_interval_ms),
            last_request: Mutex::new(None),
        }
    }

    /// 保证相邻两次请求之间至少间隔 `request_interval`
    async fn wait_for_slot(&self) {
        let mut last_request = self.last_request.lock().await;
        if let Some(last) = *last_request {
            let ready_at = last + self.request_interval;
            if ready_at > Instant::now() {
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last_request = Some(Instant::now());
    }
}

#[async_trait]
impl LiteratureSearch for ArxivClient {
    async fn search(&self, term: &str, max_results: usize) -> Result<Vec<ArticleRecord>> {
        self.wait_for_slot().await;

        let max_results = max_results.to_string();
        let body = self
            .http
            .get(&self.api_base_url)
            .query(&[
                ("search_query", term),
                ("start", "0"),
                ("max_results", max_results.as_str()),
            ])
            .send()
            .await
            .with_context(|| format!("arXiv request failed for query `{}`", term))?
            .error_for_status()
            .with_context(|| format!("arXiv returned an error for query `{}`", term))?
            .text()
            .await?;

        parse_feed(&body).with_context(|| format!("Failed to parse arXiv feed for `{}`", term))
    }
}

/// 解析arXiv返回的Atom feed
pub fn parse_feed(xml: &str) -> Result<Vec<ArticleRecord>> {
    let feed: AtomFeed = quick_xml::de::from_str(xml)?;
    Ok(feed
        .entry
        .into_iter()
        // 查询语法错误时arXiv会返回一个指向错误说明的条目
        .filter(|entry| !entry.id.contains("/api/errors"))
        .map(|entry| ArticleRecord {
            entry_id: entry.id.trim().to_string(),
            title: collapse_whitespace(&entry.title),
            authors: entry
                .author
                .into_iter()
                .map(|author| collapse_whitespace(&author.name))
                .collect(),
            summary: collapse_whitespace(&entry.summary),
            doi: entry
                .doi
                .map(|doi| doi.trim().to_string())
                .filter(|doi| !doi.is_empty()),
        })
        .collect())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/" xmlns:arxiv="http://arxiv.org/schemas/atom">
  <id>https://arxiv.org/api/abc</id>
  <title>arXiv Query: search_query=all:deepfake</title>
  <updated>2024-01-01T00:00:00Z</updated>
  <opensearch:totalResults>2</opensearch:totalResults>
  <opensearch:startIndex>0</opensearch:startIndex>
  <opensearch:itemsPerPage>2</opensearch:itemsPerPage>
  <entry>
    <id>http://arxiv.org/abs/2301.01234v2</id>
    <updated>2023-02-01T00:00:00Z</updated>
    <published>2023-01-03T00:00:00Z</published>
    <title>Explaining Audio
      Deepfake Detectors</title>
    <summary>  We study saliency maps
  for spoofing countermeasures. </summary>
    <author>
      <name>Jane Doe</name>
    </author>
    <author>
      <name>John Roe</name>
    </author>
    <arxiv:doi>10.1000/xyz123</arxiv:doi>
    <link href="http://arxiv.org/abs/2301.01234v2" rel="alternate" type="text/html"/>
    <arxiv:primary_category term="cs.SD" scheme="http://arxiv.org/schemas/atom"/>
    <category term="cs.SD" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2402.00042v1</id>
    <updated>2024-02-01T00:00:00Z</updated>
    <published>2024-02-01T00:00:00Z</published>
    <title>Interpretable Anti-Spoofing</title>
    <summary>Attention rollout for ASVspoof.</summary>
    <author>
      <name>Alex Poe</name>
    </author>
    <link href="http://arxiv.org/abs/2402.00042v1" rel="alternate" type="text/html"/>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_feed_entries() {
        let articles = parse_feed(FEED).unwrap();
        assert_eq!(articles.len(), 2);

        let first = &articles[0];
        assert_eq!(first.entry_id, "http://arxiv.org/abs/2301.01234v2");
        assert_eq!(first.title, "Explaining Audio Deepfake Detectors");
        assert_eq!(first.summary, "We study saliency maps for spoofing countermeasures.");
        assert_eq!(first.authors, vec!["Jane Doe", "John Roe"]);
        assert_eq!(first.doi.as_deref(), Some("10.1000/xyz123"));

        let second = &articles[1];
        assert_eq!(second.short_id(), "2402.00042v1");
        assert!(second.doi.is_none());
    }

    #[test]
    fn test_parse_feed_without_entries() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>arXiv Query</title>
</feed>"#;
        assert!(parse_feed(xml).unwrap().is_empty());
    }

    #[test]
    fn test_parse_feed_drops_error_entries() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <id>http://arxiv.org/api/errors#incorrect_id_format_for_1234</id>
    <title>Error</title>
    <summary>incorrect id format for 1234</summary>
    <author><name>arXiv api core</name></author>
  </entry>
</feed>"#;
        assert!(parse_feed(xml).unwrap().is_empty());
    }

    #[test]
    fn test_parse_feed_rejects_garbage() {
        assert!(parse_feed("<feed><entry><title>unterminated").is_err());
    }

    #[tokio::test]
    async fn test_consecutive_requests_are_spaced() {
        let client = ArxivClient::new(&SearchConfig {
            request_interval_ms: 50,
            ..Default::default()
        });

        let started = Instant::now();
        for _ in 0..3 {
            client.wait_for_slot().await;
        }

        assert!(started.elapsed() >= Duration::from_millis(100));
    }
}
