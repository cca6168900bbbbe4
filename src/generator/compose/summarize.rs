use std::collections::{BTreeMap, HashSet};

use anyhow::{Context, Result};

use crate::generator::context::GeneratorContext;
use crate::llm::client::strip_reasoning;
use crate::prompts::PromptKind;
use crate::search::extract_paragraphs;
use crate::types::{ArticleRecord, Category};

/// 为一个结果章节中的每篇文章生成摘要
///
/// 返回文章序号到摘要的有序映射；取不到正文段落的文章被跳过，不出现在结果中。
pub async fn summarize_category(
    context: &GeneratorContext,
    articles: &[ArticleRecord],
    category: &Category,
) -> Result<BTreeMap<usize, String>> {
    tracing::info!("📑 正在为章节「{}」生成文章摘要...", category.name);
    let mut summaries = BTreeMap::new();
    let mut visited = HashSet::new();

    for &index in &category.article_indices {
        if !visited.insert(index) {
            continue;
        }
        let article = articles.get(index).with_context(|| {
            format!(
                "Category `{}` references missing article {}",
                category.name, index
            )
        })?;

        let html = context.bodies.fetch_body(article).await?;
        let Some(paragraphs) = extract_paragraphs(&html) else {
            tracing::warn!("⏭️ 跳过 #{}：没有可提取的正文 ({})", index, article.short_id());
            continue;
        };

        let prompt = context.render_prompt(
            PromptKind::SummarizeArticle,
            &[
                ("SECTION", category.name.as_str()),
                ("ARTICLE", paragraphs.as_str()),
            ],
        )?;
        let response = context.llm.chat(&prompt).await?;
        summaries.insert(index, strip_reasoning(&response).to_string());
        tracing::debug!("已摘要 #{}: {}", index, article.title);
    }

    tracing::info!(
        "✅ 章节「{}」：{} / {} 篇完成摘要",
        category.name,
        summaries.len(),
        category.article_indices.len()
    );
    Ok(summaries)
}
