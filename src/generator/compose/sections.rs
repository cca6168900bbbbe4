use std::collections::BTreeMap;

use anyhow::{Context, Result};

use crate::generator::context::GeneratorContext;
use crate::llm::client::strip_reasoning;
use crate::prompts::PromptKind;
use crate::types::ArticleRecord;

/// 单次请求生成一段正文，只保留推理标记之后的内容
async fn write_section(
    context: &GeneratorContext,
    label: &str,
    kind: PromptKind,
    vars: &[(&str, &str)],
) -> Result<String> {
    tracing::info!("✍️ 正在撰写 {}...", label);
    let prompt = context.render_prompt(kind, vars)?;
    let response = context.llm.chat(&prompt).await?;
    Ok(strip_reasoning(&response).to_string())
}

/// 方法章节：检索词与入选文章标题
pub async fn write_methods(
    context: &GeneratorContext,
    queries: &[String],
    articles: &[ArticleRecord],
) -> Result<String> {
    let titles: Vec<&str> = articles.iter().map(|a| a.title.as_str()).collect();
    let queries = serde_json::to_string(queries).context("Failed to serialize queries")?;
    let titles = serde_json::to_string(&titles).context("Failed to serialize titles")?;

    write_section(
        context,
        "Methods",
        PromptKind::MakeMethodsSection,
        &[("QUERIES", queries.as_str()), ("TITLES", titles.as_str())],
    )
    .await
}

/// 结果小节：章节内各文章的摘要，以引用键为索引
pub async fn write_results_subsection(
    context: &GeneratorContext,
    section: &str,
    summaries: &BTreeMap<usize, String>,
) -> Result<String> {
    let summaries =
        serde_json::to_string_pretty(summaries).context("Failed to serialize summaries")?;

    write_section(
        context,
        &format!("Results / {}", section),
        PromptKind::MakeResultsSubsection,
        &[("SECTION", section), ("SUMMARIES", summaries.as_str())],
    )
    .await
}

pub async fn write_results_intro(context: &GeneratorContext, subsections: &[String]) -> Result<String> {
    let subsections = subsections.join("\n");
    write_section(
        context,
        "Results introduction",
        PromptKind::MakeResultsIntro,
        &[("SUBSECTIONS", subsections.as_str())],
    )
    .await
}

/// 完整的结果章节：引言在前，小节按章节顺序
fn results_section(results_intro: &str, subsections: &[String]) -> String {
    std::iter::once(results_intro)
        .chain(subsections.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn write_discussion_limitations(
    context: &GeneratorContext,
    results_intro: &str,
    subsections: &[String],
) -> Result<String> {
    let results = results_section(results_intro, subsections);
    write_section(
        context,
        "Discussion / Limitations",
        PromptKind::DiscussionLimitations,
        &[("RESULTS", results.as_str())],
    )
    .await
}

pub async fn write_discussion_future_directions(
    context: &GeneratorContext,
    results_intro: &str,
    subsections: &[String],
) -> Result<String> {
    let results = results_section(results_intro, subsections);
    write_section(
        context,
        "Discussion / Future Directions",
        PromptKind::DiscussionFutureDirections,
        &[("RESULTS", results.as_str())],
    )
    .await
}

pub async fn write_discussion_intro(
    context: &GeneratorContext,
    limitations: &str,
    future_directions: &str,
) -> Result<String> {
    let subsections = [limitations, future_directions].join("\n");
    write_section(
        context,
        "Discussion introduction",
        PromptKind::MakeDiscussionIntro,
        &[("SUBSECTIONS", subsections.as_str())],
    )
    .await
}
