pub mod article;
pub mod category;

pub use article::{ArticleRecord, deduplicate};
pub use category::{Category, CategoryMap};
