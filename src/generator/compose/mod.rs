//! 论文撰写：按章节摘要文章并逐段生成正文
//!
//! 每个撰写步骤只发送一次prompt，保留推理标记之后的回复原文，不做格式校验。

pub mod sections;
pub mod summarize;

pub use sections::{
    write_discussion_future_directions, write_discussion_intro, write_discussion_limitations,
    write_methods, write_results_intro, write_results_subsection,
};
pub use summarize::summarize_category;
