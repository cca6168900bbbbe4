use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use paper_scribe::cache::{ArtifactKey, DiskArtifactStore, MemoryArtifactStore};
use paper_scribe::config::Config;
use paper_scribe::generator::context::GeneratorContext;
use paper_scribe::llm::client::ChatModel;
use paper_scribe::run_pipeline;
use paper_scribe::search::{ArticleBodySource, LiteratureSearch};
use paper_scribe::types::ArticleRecord;
use tempfile::TempDir;

const TOPIC: &str = "Explainable AI in audio deepfake detection";

/// 每次检索返回10篇新文章
#[derive(Default)]
struct TenNewPerCall {
    calls: AtomicUsize,
}

#[async_trait]
impl LiteratureSearch for TenNewPerCall {
    async fn search(&self, _term: &str, _max_results: usize) -> Result<Vec<ArticleRecord>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((call * 10..call * 10 + 10)
            .map(|id| ArticleRecord {
                entry_id: format!("http://arxiv.org/abs/2310.{:05}v1", id),
                title: format!("Deepfake explanation study {}", id),
                authors: vec![format!("Researcher {}", id)],
                summary: format!("Abstract {}", id),
                doi: (id % 3 == 0).then(|| format!("10.48550/arXiv.2310.{:05}", id)),
            })
            .collect())
    }
}

/// 每轮只给出一条检索词，接受全部文章，分为两个章节
#[derive(Default)]
struct StubModel {
    calls: AtomicUsize,
}

#[async_trait]
impl ChatModel for StubModel {
    async fn chat(&self, prompt: &str) -> Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = if prompt.contains("JSON array of strings") {
            format!(r#"["xai audio deepfake {}"]"#, call)
        } else if prompt.contains("screening articles") {
            "<think>It fits.</think>\nyes".to_string()
        } else if prompt.contains("thematic categories") {
            let (first, second): (Vec<usize>, Vec<usize>) = (0..50).partition(|i| i % 2 == 0);
            serde_json::json!({ "Saliency": first, "Attention": second }).to_string()
        } else {
            "<think>drafting</think>\nDrafted text.".to_string()
        };
        Ok(reply)
    }
}

struct OneParagraph;

#[async_trait]
impl ArticleBodySource for OneParagraph {
    async fn fetch_body(&self, article: &ArticleRecord) -> Result<String> {
        Ok(format!(
            r#"<html><body><p class="ltx_p">Body of {}.</p></body></html>"#,
            article.short_id()
        ))
    }
}

/// 任何外部调用都失败
struct Offline;

#[async_trait]
impl ChatModel for Offline {
    async fn chat(&self, _prompt: &str) -> Result<String> {
        anyhow::bail!("offline")
    }
}

#[async_trait]
impl LiteratureSearch for Offline {
    async fn search(&self, _term: &str, _max_results: usize) -> Result<Vec<ArticleRecord>> {
        anyhow::bail!("offline")
    }
}

#[async_trait]
impl ArticleBodySource for Offline {
    async fn fetch_body(&self, _article: &ArticleRecord) -> Result<String> {
        anyhow::bail!("offline")
    }
}

fn config(temp_dir: &TempDir) -> Config {
    let mut config = Config {
        topic: TOPIC.to_string(),
        staging_dir: temp_dir.path().join("temp"),
        ..Default::default()
    };
    config.search.min_articles = 50;
    config.latex.compile = false;
    config
}

#[tokio::test]
async fn test_search_reaches_threshold_in_five_calls() {
    let temp_dir = TempDir::new().unwrap();
    let search = Arc::new(TenNewPerCall::default());
    let context = GeneratorContext::with_services(
        config(&temp_dir),
        Arc::new(StubModel::default()),
        search.clone(),
        Arc::new(OneParagraph),
        Box::new(MemoryArtifactStore::new()),
    );

    let document_path = run_pipeline(&context).await.unwrap();

    assert_eq!(search.calls.load(Ordering::SeqCst), 5);

    let articles: Vec<ArticleRecord> = context
        .checkpointer
        .load_json("fetch", &ArtifactKey::json("article_metadata"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(articles.len(), 50);
    let ids: HashSet<_> = articles.iter().map(|a| a.entry_id.as_str()).collect();
    assert_eq!(ids.len(), 50);

    let queries: Vec<String> = context
        .checkpointer
        .load_json("queries", &ArtifactKey::json("queries"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(queries.len(), 5);

    let document = std::fs::read_to_string(&document_path).unwrap();
    assert!(document.contains(&format!("\\title{{{}}}", TOPIC)));
    assert!(document.contains("Drafted text."));

    let bibliography =
        std::fs::read_to_string(temp_dir.path().join("temp/result/citations.bib")).unwrap();
    assert_eq!(bibliography.matches("@article{").count(), 50);
    assert_eq!(bibliography.matches("  doi = {").count(), 17);
}

#[tokio::test]
async fn test_staging_directory_resumes_across_runs() {
    let temp_dir = TempDir::new().unwrap();
    let first = GeneratorContext::with_services(
        config(&temp_dir),
        Arc::new(StubModel::default()),
        Arc::new(TenNewPerCall::default()),
        Arc::new(OneParagraph),
        Box::new(DiskArtifactStore::new(temp_dir.path().join("temp"))),
    );
    run_pipeline(&first).await.unwrap();

    let staging = temp_dir.path().join("temp");
    for artifact in [
        "manifest.json",
        "queries.json",
        "article_metadata.json",
        "abstract_filtered.json",
        "articles.txt",
        "citations.bib",
        "methods.txt",
        "article_categories.json",
        "subsection_summaries_0.json",
        "subsection_summaries_1.json",
        "subsection_0.txt",
        "subsection_1.txt",
        "results_intro.txt",
        "discussion_limitations.txt",
        "discussion_future_directions.txt",
        "discussion_intro.txt",
    ] {
        assert!(staging.join(artifact).is_file(), "missing {}", artifact);
    }

    // 新进程读取同一暂存目录，外部服务全部离线
    let resumed = GeneratorContext::with_services(
        config(&temp_dir),
        Arc::new(Offline),
        Arc::new(Offline),
        Arc::new(Offline),
        Box::new(DiskArtifactStore::new(temp_dir.path().join("temp"))),
    );
    let document_path = run_pipeline(&resumed).await.unwrap();
    assert!(document_path.ends_with("temp/result/main.tex"));

    let report = resumed.checkpointer.generate_report();
    assert_eq!(report.writes, 0);
}
