use anyhow::Result;

use crate::generator::context::GeneratorContext;
use crate::llm::client::{extract_last_delimited, prompt_until_parsed, strip_reasoning};
use crate::prompts::PromptKind;

/// 请求模型生成一批检索词
pub async fn generate_queries(context: &GeneratorContext) -> Result<Vec<String>> {
    let prompt = context.render_prompt(PromptKind::CreateQueries, &[])?;
    let queries = prompt_until_parsed(
        context.llm.as_ref(),
        "create_queries",
        &prompt,
        context.max_parse_attempts(),
        parse_queries,
    )
    .await?;

    tracing::debug!("生成检索词: {:?}", queries);
    Ok(queries)
}

/// 从回复末尾的JSON字符串数组中解析检索词
///
/// 空数组、空白检索词都视为无法解析。
pub fn parse_queries(response: &str) -> Option<Vec<String>> {
    let array = extract_last_delimited(strip_reasoning(response), '[', ']')?;
    let queries: Vec<String> = serde_json::from_str(array).ok()?;
    let queries: Vec<String> = queries
        .into_iter()
        .map(|q| q.trim().to_string())
        .collect();

    if queries.is_empty() || queries.iter().any(|q| q.is_empty()) {
        return None;
    }
    Some(queries)
}
