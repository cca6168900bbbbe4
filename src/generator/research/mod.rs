//! 文献调研：生成检索词、检索去重、相关性筛选、章节归类
//!
//! 检索词生成与检索交替进行，直到累计足够多的不重复文章；
//! 筛选与归类都依赖模型输出的固定格式，格式不符时按原prompt有限次重试。

pub mod categorize;
pub mod fetch;
pub mod queries;
pub mod relevance;

pub use categorize::{categorize_articles, parse_categories};
pub use fetch::{SearchAccumulator, gather_articles, search_until};
pub use queries::{generate_queries, parse_queries};
pub use relevance::{assess_article, filter_articles, parse_relevance_answer};
