use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::generator::context::GeneratorContext;

pub mod bibliography;
pub mod latex;

pub use bibliography::{create_bibliography, render_article_listing, render_entry};
pub use latex::{LatexToolchain, render_document};

/// 待排版的论文
#[derive(Debug, Clone)]
pub struct PaperDraft {
    pub title: String,
    pub author: String,
    /// 按出现顺序排列的章节正文
    pub sections: Vec<String>,
    pub bibliography: String,
}

/// 保存论文
pub async fn save(context: &GeneratorContext, draft: &PaperDraft) -> Result<PathBuf> {
    DiskOutlet::new(context.config.result_dir())
        .save(context, draft)
        .await
}

pub trait Outlet {
    async fn save(&self, context: &GeneratorContext, draft: &PaperDraft) -> Result<PathBuf>;
}

/// 将论文写入结果目录并按配置调用排版工具链
pub struct DiskOutlet {
    result_dir: PathBuf,
}

impl DiskOutlet {
    pub fn new(result_dir: PathBuf) -> Self {
        Self { result_dir }
    }
}

impl Outlet for DiskOutlet {
    async fn save(&self, context: &GeneratorContext, draft: &PaperDraft) -> Result<PathBuf> {
        tracing::info!("🖊️ 论文存储中...");
        tokio::fs::create_dir_all(&self.result_dir)
            .await
            .with_context(|| format!("Failed to create {}", self.result_dir.display()))?;

        let template = context.prompts.document_template()?;
        let document =
            latex::render_document(&template, &draft.title, &draft.author, &draft.sections);

        let document_path = self.result_dir.join(latex::DOCUMENT_FILE);
        tokio::fs::write(&document_path, document)
            .await
            .with_context(|| format!("Failed to write {}", document_path.display()))?;
        let bibliography_path = self.result_dir.join(latex::BIBLIOGRAPHY_FILE);
        tokio::fs::write(&bibliography_path, &draft.bibliography)
            .await
            .with_context(|| format!("Failed to write {}", bibliography_path.display()))?;
        tracing::info!("💾 已保存: {}", document_path.display());

        if context.config.latex.compile {
            LatexToolchain::new(&context.config.latex)
                .compile(&self.result_dir)
                .await?;
        } else {
            tracing::info!("⏭️ 已关闭PDF编译");
        }

        Ok(document_path)
    }
}
