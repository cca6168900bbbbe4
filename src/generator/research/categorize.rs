use anyhow::{Context, Result};

use crate::generator::context::GeneratorContext;
use crate::llm::client::{extract_last_delimited, prompt_until_parsed, strip_reasoning};
use crate::prompts::PromptKind;
use crate::types::{ArticleRecord, CategoryMap};

/// 将已筛选的文章归入结果章节
pub async fn categorize_articles(
    context: &GeneratorContext,
    articles: &[ArticleRecord],
) -> Result<CategoryMap> {
    tracing::info!("🗂️ 正在为 {} 篇文章划分结果章节...", articles.len());

    let abstracts: Vec<(usize, &str)> = articles
        .iter()
        .enumerate()
        .map(|(index, article)| (index, article.summary.as_str()))
        .collect();
    let abstracts =
        serde_json::to_string(&abstracts).context("Failed to serialize article abstracts")?;

    let prompt = context.render_prompt(
        PromptKind::DetermineArticleCategories,
        &[("ABSTRACTS", abstracts.as_str())],
    )?;

    let article_count = articles.len();
    let categories = prompt_until_parsed(
        context.llm.as_ref(),
        "determine_article_categories",
        &prompt,
        context.max_parse_attempts(),
        |response| parse_categories(response, article_count),
    )
    .await?;

    for category in categories.iter() {
        tracing::info!(
            "📂 {}: {} 篇",
            category.name,
            category.article_indices.len()
        );
    }
    Ok(categories)
}

/// 解析回复末尾的JSON对象，序号越界同样视为无法解析
pub fn parse_categories(response: &str, article_count: usize) -> Option<CategoryMap> {
    let object = extract_last_delimited(strip_reasoning(response), '{', '}')?;
    let value: serde_json::Value = serde_json::from_str(object).ok()?;
    let categories = CategoryMap::from_json_object(value.as_object()?)?;

    match categories.validate(article_count) {
        Ok(()) => Some(categories),
        Err(e) => {
            tracing::warn!("⚠️ {}", e);
            None
        }
    }
}
