//! prompt与文档模板
//!
//! 模板是带有 `{{NAME}}` 占位符的纯文本，通过字符串替换填充。内置模板编译进二进制，
//! 配置了 `prompts_dir` 时目录中的同名文件优先。

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::Config;

/// 各阶段使用的prompt模板
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    CreateQueries,
    AssessArticleByAbstract,
    DetermineArticleCategories,
    MakeMethodsSection,
    SummarizeArticle,
    MakeResultsSubsection,
    MakeResultsIntro,
    DiscussionLimitations,
    DiscussionFutureDirections,
    MakeDiscussionIntro,
}

impl PromptKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            PromptKind::CreateQueries => "create_queries.txt",
            PromptKind::AssessArticleByAbstract => "assess_article_by_abstract.txt",
            PromptKind::DetermineArticleCategories => "determine_article_categories.txt",
            PromptKind::MakeMethodsSection => "make_methods_section.txt",
            PromptKind::SummarizeArticle => "summarize_article.txt",
            PromptKind::MakeResultsSubsection => "make_results_subsection.txt",
            PromptKind::MakeResultsIntro => "make_results_intro.txt",
            PromptKind::DiscussionLimitations => "discussion_limitations.txt",
            PromptKind::DiscussionFutureDirections => "discussion_future_directions.txt",
            PromptKind::MakeDiscussionIntro => "make_discussion_intro.txt",
        }
    }

    fn builtin(&self) -> &'static str {
        match self {
            PromptKind::CreateQueries => include_str!("templates/create_queries.txt"),
            PromptKind::AssessArticleByAbstract => {
                include_str!("templates/assess_article_by_abstract.txt")
            }
            PromptKind::DetermineArticleCategories => {
                include_str!("templates/determine_article_categories.txt")
            }
            PromptKind::MakeMethodsSection => include_str!("templates/make_methods_section.txt"),
            PromptKind::SummarizeArticle => include_str!("templates/summarize_article.txt"),
            PromptKind::MakeResultsSubsection => {
                include_str!("templates/make_results_subsection.txt")
            }
            PromptKind::MakeResultsIntro => include_str!("templates/make_results_intro.txt"),
            PromptKind::DiscussionLimitations => {
                include_str!("templates/discussion_limitations.txt")
            }
            PromptKind::DiscussionFutureDirections => {
                include_str!("templates/discussion_future_directions.txt")
            }
            PromptKind::MakeDiscussionIntro => include_str!("templates/make_discussion_intro.txt"),
        }
    }
}

/// 内置LaTeX文档模板，占位符为 TITLE、AUTHOR、SECTIONS
pub const DOCUMENT_TEMPLATE: &str = include_str!("templates/main.tex");

/// 依次替换模板中的 `{{NAME}}` 占位符
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |acc, (name, value)| {
        acc.replace(&format!("{{{{{}}}}}", name), value)
    })
}

/// prompt模板库
#[derive(Debug, Clone, Default)]
pub struct PromptLibrary {
    prompts_dir: Option<PathBuf>,
    template_path: Option<PathBuf>,
}

impl PromptLibrary {
    pub fn new(config: &Config) -> Self {
        Self {
            prompts_dir: config.prompts_dir.clone(),
            template_path: config.template_override().map(|p| p.to_path_buf()),
        }
    }

    /// 读取模板原文，自定义目录中的同名文件优先
    pub fn load(&self, kind: PromptKind) -> Result<String> {
        if let Some(path) = self
            .prompts_dir
            .as_ref()
            .map(|dir| dir.join(kind.file_name()))
            .filter(|path| path.is_file())
        {
            return std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read prompt template {:?}", path));
        }
        Ok(kind.builtin().to_string())
    }

    /// 读取并填充模板
    pub fn render(&self, kind: PromptKind, vars: &[(&str, &str)]) -> Result<String> {
        Ok(fill(&self.load(kind)?, vars))
    }

    /// 读取LaTeX文档模板
    pub fn document_template(&self) -> Result<String> {
        match &self.template_path {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read document template {:?}", path)),
            None => Ok(DOCUMENT_TEMPLATE.to_string()),
        }
    }
}
