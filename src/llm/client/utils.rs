/// 推理模型在思考过程结束处输出的标记
pub const REASONING_MARKER: &str = "</think>";

/// 去掉模型回复中的推理过程，只保留正文
///
/// 正文为第一个 [`REASONING_MARKER`] 之后的全部内容；回复中没有该标记时整段回复即为正文。
/// 两种情况都会去掉开头的空白。
pub fn strip_reasoning(response: &str) -> &str {
    match response.find(REASONING_MARKER) {
        Some(pos) => response[pos + REASONING_MARKER.len()..].trim_start(),
        None => response.trim_start(),
    }
}

/// 截取最后一个 `open` 到最后一个 `close`（含）之间的片段
///
/// 用于从夹杂说明文字的回复中取出末尾的JSON数组或对象。
pub fn extract_last_delimited(content: &str, open: char, close: char) -> Option<&str> {
    let start = content.rfind(open)?;
    let end = content.rfind(close)?;
    if end < start {
        return None;
    }
    Some(&content[start..end + close.len_utf8()])
}
