use std::collections::HashSet;
use std::future::Future;

use anyhow::Result;

use super::queries::generate_queries;
use crate::config::SearchConfig;
use crate::error::PipelineError;
use crate::generator::context::GeneratorContext;
use crate::search::LiteratureSearch;
use crate::types::{ArticleRecord, deduplicate};

/// 检索循环的累积状态
#[derive(Debug, Default, Clone)]
pub struct SearchAccumulator {
    /// 已使用的检索词，按生成顺序追加
    pub queries: Vec<String>,
    /// 不重复的文章，按首次出现的顺序
    pub articles: Vec<ArticleRecord>,
    /// 已完成的轮数
    pub rounds: u32,
    seen: HashSet<String>,
}

impl SearchAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn is_satisfied(&self, min_articles: usize) -> bool {
        self.articles.len() >= min_articles
    }

    pub fn record_queries(&mut self, queries: &[String]) {
        self.queries.extend_from_slice(queries);
    }

    /// 收入一次检索的结果，跳过此前（包括本轮）已见过的文章，返回新增数量
    pub fn absorb(&mut self, records: Vec<ArticleRecord>) -> usize {
        let before = self.articles.len();
        for record in records {
            if self.seen.insert(record.entry_id.clone()) {
                self.articles.push(record);
            }
        }
        self.articles.len() - before
    }

    /// 结束检索，返回检索词与去重后的文章
    pub fn finish(self) -> (Vec<String>, Vec<ArticleRecord>) {
        (self.queries, deduplicate(self.articles))
    }
}

/// 使用模型生成检索词，检索直到累计 `min_articles` 篇不重复文章
pub async fn gather_articles(context: &GeneratorContext) -> Result<(Vec<String>, Vec<ArticleRecord>)> {
    let accumulator = search_until(context.search.as_ref(), &context.config.search, || {
        generate_queries(context)
    })
    .await?;

    let (queries, articles) = accumulator.finish();
    tracing::info!(
        "📚 检索完成：{} 条检索词，{} 篇不重复文章",
        queries.len(),
        articles.len()
    );
    Ok((queries, articles))
}

/// 检索循环
///
/// 每轮先通过 `next_queries` 取得一批新的检索词，逐条检索并去重；
/// 一轮结束后累计数量达到阈值即停止。设置了 `max_search_rounds` 时，
/// 达到轮数上限仍未满足阈值返回 [`PipelineError::SearchExhausted`]。
pub async fn search_until<F, Fut>(
    search: &dyn LiteratureSearch,
    config: &SearchConfig,
    mut next_queries: F,
) -> Result<SearchAccumulator>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Vec<String>>>,
{
    let mut accumulator = SearchAccumulator::new();

    while !accumulator.is_satisfied(config.min_articles) {
        if let Some(max_rounds) = config.max_search_rounds
            && accumulator.rounds >= max_rounds
        {
            return Err(PipelineError::SearchExhausted {
                rounds: accumulator.rounds,
                found: accumulator.len(),
                target: config.min_articles,
            }
            .into());
        }

        accumulator.rounds += 1;
        let queries = next_queries().await?;
        tracing::info!(
            "🔎 第 {} 轮检索，{} 条检索词",
            accumulator.rounds,
            queries.len()
        );
        accumulator.record_queries(&queries);

        for term in &queries {
            let records = search.search(term, config.max_results_per_query).await?;
            let returned = records.len();
            let added = accumulator.absorb(records);
            tracing::debug!("检索 `{}`：返回 {} 篇，新增 {} 篇", term, returned, added);
        }

        tracing::info!(
            "📈 已累计 {} / {} 篇不重复文章",
            accumulator.len(),
            config.min_articles
        );
    }

    Ok(accumulator)
}
