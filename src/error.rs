//! 流水线中可被调用方区分处理的错误类型

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// 模型输出在多次重试后仍无法解析
    #[error("model output for `{task}` could not be parsed after {attempts} attempts")]
    Unparseable {
        task: String,
        attempts: u32,
        last_response: String,
    },

    /// 分类结果引用了不存在的文章序号
    #[error("category `{category}` references article index {index}, but only {len} articles were accepted")]
    IndexOutOfRange {
        category: String,
        index: usize,
        len: usize,
    },

    /// 检索轮数达到上限仍未凑够文章
    #[error("search stopped after {rounds} rounds with {found} of {target} unique articles")]
    SearchExhausted {
        rounds: u32,
        found: usize,
        target: usize,
    },

    /// 暂存目录中的产物属于另一个主题
    #[error("staging directory was created for topic `{recorded}`, refusing to resume with `{requested}` (use --force-regenerate)")]
    TopicMismatch { recorded: String, requested: String },

    /// 排版工具链执行失败
    #[error("`{program}` exited with status {status}")]
    Toolchain { program: String, status: i32 },
}
