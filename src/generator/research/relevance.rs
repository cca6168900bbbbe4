use anyhow::Result;

use crate::generator::context::GeneratorContext;
use crate::llm::client::prompt_until_parsed;
use crate::prompts::PromptKind;
use crate::types::ArticleRecord;

/// 解析相关性判断：去掉末尾空白后必须以 `yes` 或 `no` 结尾
pub fn parse_relevance_answer(response: &str) -> Option<bool> {
    let answer = response.trim_end();
    if answer.ends_with("yes") {
        Some(true)
    } else if answer.ends_with("no") {
        Some(false)
    } else {
        None
    }
}

/// 根据标题与摘要判断文章是否与主题相关
pub async fn assess_article(context: &GeneratorContext, article: &ArticleRecord) -> Result<bool> {
    let prompt = context.render_prompt(
        PromptKind::AssessArticleByAbstract,
        &[
            ("TITLE", article.title.as_str()),
            ("ABSTRACT", article.summary.as_str()),
        ],
    )?;

    prompt_until_parsed(
        context.llm.as_ref(),
        "assess_article_by_abstract",
        &prompt,
        context.max_parse_attempts(),
        parse_relevance_answer,
    )
    .await
}

/// 逐篇筛选，保留相关文章的原有顺序
pub async fn filter_articles(
    context: &GeneratorContext,
    articles: &[ArticleRecord],
) -> Result<Vec<ArticleRecord>> {
    let mut accepted = Vec::new();

    for (index, article) in articles.iter().enumerate() {
        if assess_article(context, article).await? {
            tracing::info!("✅ [{}/{}] 保留: {}", index + 1, articles.len(), article.title);
            accepted.push(article.clone());
        } else {
            tracing::info!("🚫 [{}/{}] 排除: {}", index + 1, articles.len(), article.title);
        }
    }

    tracing::info!("🧹 相关性筛选完成：保留 {} / {} 篇", accepted.len(), articles.len());
    Ok(accepted)
}
