//! 生成器单元测试共用的替身服务

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use crate::cache::MemoryArtifactStore;
use crate::config::Config;
use crate::generator::context::GeneratorContext;
use crate::llm::client::{ChatModel, ScriptedModel};
use crate::search::{ArticleBodySource, LiteratureSearch};
use crate::types::ArticleRecord;

pub fn article(id: usize, title: &str) -> ArticleRecord {
    ArticleRecord {
        entry_id: format!("http://arxiv.org/abs/2301.{:05}v1", id),
        title: title.to_string(),
        authors: vec![format!("Author {}", id), "Second Author".to_string()],
        summary: format!("Abstract of article {}", id),
        doi: None,
    }
}

/// 不返回任何结果的检索
pub struct EmptySearch;

#[async_trait]
impl LiteratureSearch for EmptySearch {
    async fn search(&self, _term: &str, _max_results: usize) -> Result<Vec<ArticleRecord>> {
        Ok(Vec::new())
    }
}

/// 每次检索返回 `per_call` 篇此前从未出现过的文章
pub struct SequentialSearch {
    per_call: usize,
    calls: AtomicUsize,
}

impl SequentialSearch {
    pub fn new(per_call: usize) -> Self {
        Self {
            per_call,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LiteratureSearch for SequentialSearch {
    async fn search(&self, _term: &str, _max_results: usize) -> Result<Vec<ArticleRecord>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let first = call * self.per_call;
        Ok((first..first + self.per_call)
            .map(|id| article(id, &format!("Article {}", id)))
            .collect())
    }
}

/// 检索或调用模型即报错，用于验证已完成的阶段不会重新执行
pub struct Unreachable;

#[async_trait]
impl LiteratureSearch for Unreachable {
    async fn search(&self, term: &str, _max_results: usize) -> Result<Vec<ArticleRecord>> {
        anyhow::bail!("search `{}` should have been served from a checkpoint", term)
    }
}

#[async_trait]
impl ChatModel for Unreachable {
    async fn chat(&self, _prompt: &str) -> Result<String> {
        anyhow::bail!("model should not be called for a completed stage")
    }
}

#[async_trait]
impl ArticleBodySource for Unreachable {
    async fn fetch_body(&self, article: &ArticleRecord) -> Result<String> {
        anyhow::bail!("body of {} should not be fetched", article.short_id())
    }
}

/// 按prompt开头识别模板并给出固定回复的模型
///
/// 相关性判断拒绝标题以奇数结尾的文章；分类使用已筛选列表的前五个序号。
pub fn paper_model() -> ScriptedModel {
    ScriptedModel::routed(|prompt| {
        let reply = if prompt.starts_with("You are helping to write") {
            r#"["explainable audio deepfake detection"]"#.to_string()
        } else if prompt.starts_with("You are screening articles") {
            let odd = prompt
                .lines()
                .find_map(|line| line.strip_prefix("Title: Article "))
                .and_then(|id| id.trim().parse::<usize>().ok())
                .is_some_and(|id| id % 2 == 1);
            if odd { "no" } else { "yes" }.to_string()
        } else if prompt.starts_with("You are organizing the results section") {
            r#"{"Saliency Methods": [0, 1, 2], "Attention Analysis": [3, 4]}"#.to_string()
        } else if prompt.starts_with("You are writing the methods section") {
            "\\section{Methods}".to_string()
        } else if prompt.starts_with("You are preparing the subsection") {
            "A short summary.".to_string()
        } else if prompt.starts_with("You are writing the subsection") {
            let section = prompt.split('"').nth(1).unwrap_or_default();
            format!("\\subsection{{{}}}", section)
        } else if prompt.starts_with("You are writing the introduction to the results") {
            "\\section{Results}".to_string()
        } else if prompt.starts_with("You are writing the limitations part") {
            "\\subsection{Limitations}".to_string()
        } else if prompt.starts_with("You are writing the future directions part") {
            "\\subsection{Future Directions}".to_string()
        } else if prompt.starts_with("You are writing the introduction to the discussion") {
            "\\section{Discussion}".to_string()
        } else {
            "unexpected prompt".to_string()
        };
        format!("<think>routing</think>\n{}", reply)
    })
}

/// 以 `short_id` 查表返回HTML，未登记的文章返回不含正文的页面
#[derive(Default)]
pub struct StaticBodies {
    pages: HashMap<String, String>,
    requested: Mutex<Vec<String>>,
}

impl StaticBodies {
    pub fn with_page(mut self, article: &ArticleRecord, html: &str) -> Self {
        self.pages
            .insert(article.short_id().to_string(), html.to_string());
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArticleBodySource for StaticBodies {
    async fn fetch_body(&self, article: &ArticleRecord) -> Result<String> {
        let short_id = article.short_id().to_string();
        self.requested.lock().unwrap().push(short_id.clone());
        Ok(self
            .pages
            .get(&short_id)
            .cloned()
            .unwrap_or_else(|| "<html><body><h1>Not Found</h1></body></html>".to_string()))
    }
}

pub fn test_context(llm: Arc<dyn ChatModel>) -> GeneratorContext {
    test_context_with_bodies(llm, Arc::new(StaticBodies::default()))
}

pub fn test_context_with_bodies(
    llm: Arc<dyn ChatModel>,
    bodies: Arc<dyn ArticleBodySource>,
) -> GeneratorContext {
    GeneratorContext::with_services(
        Config::default(),
        llm,
        Arc::new(EmptySearch),
        bodies,
        Box::new(MemoryArtifactStore::new()),
    )
}
