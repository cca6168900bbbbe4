use std::path::Path;
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::process::Command as TokioCommand;

use crate::config::LatexConfig;
use crate::error::PipelineError;
use crate::prompts::fill;

/// 主文档文件名，参考文献文件名需与模板中的 `\bibliography{citations}` 一致
pub const DOCUMENT_FILE: &str = "main.tex";
pub const BIBLIOGRAPHY_FILE: &str = "citations.bib";

/// 填充文档模板，各章节以换行连接
pub fn render_document(template: &str, title: &str, author: &str, sections: &[String]) -> String {
    let sections = sections.join("\n");
    fill(
        template,
        &[
            ("TITLE", title),
            ("AUTHOR", author),
            ("SECTIONS", sections.as_str()),
        ],
    )
}

/// LaTeX工具链
///
/// 依次执行：文档编译、参考文献编译、两次文档编译。
pub struct LatexToolchain<'a> {
    config: &'a LatexConfig,
}

impl<'a> LatexToolchain<'a> {
    pub fn new(config: &'a LatexConfig) -> Self {
        Self { config }
    }

    /// 检查程序是否可用
    pub async fn is_available(program: &str) -> bool {
        match TokioCommand::new(program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
        {
            Ok(status) => status.success(),
            Err(_) => false,
        }
    }

    /// 在 `work_dir` 中编译 `main.tex`
    ///
    /// 文档编译器缺失时只给出警告并跳过。中间各遍的失败只给出警告，
    /// 最后一遍文档编译失败返回 [`PipelineError::Toolchain`]。
    pub async fn compile(&self, work_dir: &Path) -> Result<()> {
        let tex_engine = &self.config.tex_engine;
        if !Self::is_available(tex_engine).await {
            tracing::warn!("⚠️ 警告: {} 未安装或不可用，跳过PDF编译", tex_engine);
            tracing::info!(
                "💡 提示: 可以手动在 {} 中编译 {}",
                work_dir.display(),
                DOCUMENT_FILE
            );
            return Ok(());
        }

        tracing::info!("🔧 开始编译 {}...", DOCUMENT_FILE);
        self.run_intermediate_tex(work_dir).await?;
        self.run_bibliography(work_dir).await;
        self.run_intermediate_tex(work_dir).await?;

        let status = self.run_tex(work_dir).await?;
        if !status.success() {
            return Err(PipelineError::Toolchain {
                program: tex_engine.clone(),
                status: status.code().unwrap_or(-1),
            }
            .into());
        }

        tracing::info!(
            "✅ PDF编译完成: {}",
            work_dir.join("main.pdf").display()
        );
        Ok(())
    }

    /// 可恢复的LaTeX错误同样返回非零状态码，后续各遍仍需执行
    async fn run_intermediate_tex(&self, work_dir: &Path) -> Result<()> {
        let status = self.run_tex(work_dir).await?;
        if !status.success() {
            tracing::warn!(
                "⚠️ {} 返回非零状态码: {}，继续编译",
                self.config.tex_engine,
                status.code().unwrap_or(-1)
            );
        }
        Ok(())
    }

    /// 参考文献编译器缺失或失败都只给出警告
    async fn run_bibliography(&self, work_dir: &Path) {
        let bib_engine = &self.config.bib_engine;
        match self.run(bib_engine, &["main"], work_dir).await {
            Ok(status) if status.success() => {}
            Ok(status) => tracing::warn!(
                "⚠️ {} 返回非零状态码: {}，参考文献可能不完整",
                bib_engine,
                status.code().unwrap_or(-1)
            ),
            Err(err) => tracing::warn!("⚠️ {} 不可用，跳过参考文献编译: {:#}", bib_engine, err),
        }
    }

    async fn run_tex(&self, work_dir: &Path) -> Result<std::process::ExitStatus> {
        self.run(
            &self.config.tex_engine,
            &["-interaction=nonstopmode", DOCUMENT_FILE],
            work_dir,
        )
        .await
    }

    async fn run(
        &self,
        program: &str,
        args: &[&str],
        work_dir: &Path,
    ) -> Result<std::process::ExitStatus> {
        tracing::debug!("执行命令: {} {}", program, args.join(" "));
        TokioCommand::new(program)
            .args(args)
            .current_dir(work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .status()
            .await
            .with_context(|| format!("Failed to run {}", program))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::DOCUMENT_TEMPLATE;

    #[test]
    fn test_render_document() {
        let document = render_document(
            DOCUMENT_TEMPLATE,
            "Explainable AI in audio deepfake detection",
            "Bot",
            &["\\section{Methods}".to_string(), "\\section{Results}".to_string()],
        );

        assert!(document.contains("\\title{Explainable AI in audio deepfake detection}"));
        assert!(document.contains("\\author{Bot}"));
        assert!(document.contains("\\section{Methods}\n\\section{Results}"));
        assert!(!document.contains("{{"));
    }

    #[tokio::test]
    async fn test_missing_toolchain_is_not_an_error() {
        let config = LatexConfig {
            compile: true,
            tex_engine: "paper-scribe-missing-tex".to_string(),
            bib_engine: "paper-scribe-missing-bib".to_string(),
        };
        let temp_dir = tempfile::TempDir::new().unwrap();

        assert!(!LatexToolchain::is_available(&config.tex_engine).await);
        LatexToolchain::new(&config)
            .compile(temp_dir.path())
            .await
            .unwrap();
    }

    /// 在临时目录中写入记录调用参数的替身编译器
    #[cfg(unix)]
    fn stub_engine(dir: &Path, name: &str, log: &Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        let script = format!(
            "#!/bin/sh\nif [ \"$1\" = \"--version\" ]; then exit 0; fi\necho \"{} $*\" >> \"{}\"\n{}\n",
            name,
            log.display(),
            body
        );
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.display().to_string()
    }

    #[cfg(unix)]
    fn recorded_calls(log: &Path) -> Vec<String> {
        std::fs::read_to_string(log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_bibliography_pass_is_a_warning() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let log = temp_dir.path().join("calls.log");
        let work_dir = temp_dir.path().join("result");
        std::fs::create_dir(&work_dir).unwrap();
        let config = LatexConfig {
            compile: true,
            tex_engine: stub_engine(temp_dir.path(), "oktex", &log, "exit 0"),
            bib_engine: stub_engine(temp_dir.path(), "failbib", &log, "exit 2"),
        };

        LatexToolchain::new(&config).compile(&work_dir).await.unwrap();

        assert_eq!(
            recorded_calls(&log),
            vec![
                "oktex -interaction=nonstopmode main.tex",
                "failbib main",
                "oktex -interaction=nonstopmode main.tex",
                "oktex -interaction=nonstopmode main.tex",
            ]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_recoverable_tex_errors_run_the_whole_chain() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let log = temp_dir.path().join("calls.log");
        let work_dir = temp_dir.path().join("result");
        std::fs::create_dir(&work_dir).unwrap();
        // 前两遍失败，最后一遍成功
        let tex_body = format!(
            "if [ \"$(grep -c failtex \"{}\")\" -lt 3 ]; then exit 1; fi\nexit 0",
            log.display()
        );
        let config = LatexConfig {
            compile: true,
            tex_engine: stub_engine(temp_dir.path(), "failtex", &log, &tex_body),
            bib_engine: stub_engine(temp_dir.path(), "okbib", &log, "exit 0"),
        };

        LatexToolchain::new(&config).compile(&work_dir).await.unwrap();

        let calls = recorded_calls(&log);
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[1], "okbib main");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_final_tex_pass_is_an_error() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let log = temp_dir.path().join("calls.log");
        let work_dir = temp_dir.path().join("result");
        std::fs::create_dir(&work_dir).unwrap();
        let config = LatexConfig {
            compile: true,
            tex_engine: stub_engine(temp_dir.path(), "failtex", &log, "exit 1"),
            bib_engine: stub_engine(temp_dir.path(), "okbib", &log, "exit 0"),
        };

        let err = LatexToolchain::new(&config)
            .compile(&work_dir)
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::Toolchain { status: 1, .. })
        ));
        assert_eq!(recorded_calls(&log).len(), 4);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_missing_bibliography_engine_still_builds_document() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let log = temp_dir.path().join("calls.log");
        let work_dir = temp_dir.path().join("result");
        std::fs::create_dir(&work_dir).unwrap();
        let config = LatexConfig {
            compile: true,
            tex_engine: stub_engine(temp_dir.path(), "oktex", &log, "exit 0"),
            bib_engine: "paper-scribe-missing-bib".to_string(),
        };

        LatexToolchain::new(&config).compile(&work_dir).await.unwrap();

        assert_eq!(recorded_calls(&log).len(), 3);
    }
}
