use std::sync::Arc;

use anyhow::Result;

use crate::cache::{ArtifactStore, Checkpointer, DiskArtifactStore};
use crate::config::Config;
use crate::llm::client::{ChatModel, LLMClient};
use crate::prompts::{PromptKind, PromptLibrary};
use crate::search::{ArticleBodySource, ArxivClient, HtmlArticleFetcher, LiteratureSearch};

/// 生成器上下文，各阶段共享的外部服务与配置
#[derive(Clone)]
pub struct GeneratorContext {
    /// 配置
    pub config: Config,
    /// 对话模型
    pub llm: Arc<dyn ChatModel>,
    /// 文献检索
    pub search: Arc<dyn LiteratureSearch>,
    /// 文章全文来源
    pub bodies: Arc<dyn ArticleBodySource>,
    /// 阶段产物检查点
    pub checkpointer: Arc<Checkpointer>,
    /// prompt模板
    pub prompts: PromptLibrary,
}

impl GeneratorContext {
    /// 使用已创建的模型客户端，搭配arXiv检索与暂存目录存储
    pub fn with_llm_client(config: Config, llm: LLMClient) -> Self {
        let search = ArxivClient::new(&config.search);
        let bodies = HtmlArticleFetcher::new(&config.search);
        let store = DiskArtifactStore::new(config.staging_dir.clone());
        Self::with_services(
            config,
            Arc::new(llm),
            Arc::new(search),
            Arc::new(bodies),
            Box::new(store),
        )
    }

    /// 注入任意服务实现
    pub fn with_services(
        config: Config,
        llm: Arc<dyn ChatModel>,
        search: Arc<dyn LiteratureSearch>,
        bodies: Arc<dyn ArticleBodySource>,
        store: Box<dyn ArtifactStore>,
    ) -> Self {
        let prompts = PromptLibrary::new(&config);
        Self {
            config,
            llm,
            search,
            bodies,
            checkpointer: Arc::new(Checkpointer::new(store)),
            prompts,
        }
    }

    pub fn topic(&self) -> &str {
        &self.config.topic
    }

    /// 渲染prompt，`TOPIC` 占位符总是先于其它变量填充
    pub fn render_prompt(&self, kind: PromptKind, vars: &[(&str, &str)]) -> Result<String> {
        let mut all_vars = Vec::with_capacity(vars.len() + 1);
        all_vars.push(("TOPIC", self.topic()));
        all_vars.extend_from_slice(vars);
        self.prompts.render(kind, &all_vars)
    }

    pub fn max_parse_attempts(&self) -> u32 {
        self.config.llm.max_parse_attempts
    }
}
