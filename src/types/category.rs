use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// 结果章节划分：章节名 -> 已筛选文章列表中的序号
///
/// 以有序列表保存，章节的先后顺序决定了逐章节产物的编号。
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct CategoryMap {
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub article_indices: Vec<usize>,
}

impl CategoryMap {
    /// 从模型返回的JSON对象构建，保持对象中键的顺序
    pub fn from_json_object(object: &serde_json::Map<String, serde_json::Value>) -> Option<Self> {
        let mut categories = Vec::with_capacity(object.len());
        for (name, value) in object {
            let indices = value
                .as_array()?
                .iter()
                .map(|v| v.as_u64().map(|i| i as usize))
                .collect::<Option<Vec<_>>>()?;
            categories.push(Category {
                name: name.clone(),
                article_indices: indices,
            });
        }
        Some(Self { categories })
    }

    /// 校验所有序号都落在已筛选文章列表范围内
    pub fn validate(&self, article_count: usize) -> Result<(), PipelineError> {
        for category in &self.categories {
            if let Some(&index) = category
                .article_indices
                .iter()
                .find(|&&index| index >= article_count)
            {
                return Err(PipelineError::IndexOutOfRange {
                    category: category.name.clone(),
                    index,
                    len: article_count,
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }
}
