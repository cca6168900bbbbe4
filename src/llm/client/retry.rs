//! 模型输出解析失败时的有界重试

use anyhow::Result;

use super::ChatModel;
use crate::error::PipelineError;

/// 以同一prompt反复请求模型，直到 `parse` 成功或达到 `max_attempts`
///
/// 解析失败会立即重试，不做退避；模型调用本身出错则直接向上返回。
/// 所有尝试都无法解析时返回 [`PipelineError::Unparseable`]。
pub async fn prompt_until_parsed<T, F>(
    model: &dyn ChatModel,
    task: &str,
    prompt: &str,
    max_attempts: u32,
    parse: F,
) -> Result<T>
where
    F: Fn(&str) -> Option<T>,
{
    let max_attempts = max_attempts.max(1);
    let mut last_response = String::new();

    for attempt in 1..=max_attempts {
        let response = model.chat(prompt).await?;
        if let Some(parsed) = parse(&response) {
            return Ok(parsed);
        }

        tracing::warn!(
            "🔁 [{}] 模型输出无法解析，重试中 (第 {} / {} 次尝试)",
            task,
            attempt,
            max_attempts
        );
        tracing::debug!("[{}] 无法解析的输出: {}", task, response);
        last_response = response;
    }

    Err(PipelineError::Unparseable {
        task: task.to_string(),
        attempts: max_attempts,
        last_response,
    }
    .into())
}
