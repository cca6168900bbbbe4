use crate::config::{Config, LLMProvider};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// paper-scribe - 基于文献检索与大模型的综述论文起草工具
#[derive(Parser, Debug)]
#[command(name = "paper-scribe")]
#[command(
    about = "Drafts a literature-review paper: searches arXiv, filters and categorizes the results with an LLM, summarizes every article and typesets the paper with LaTeX. Each stage is checkpointed so reruns resume."
)]
#[command(version)]
pub struct Args {
    /// 论文主题
    #[arg(short, long)]
    pub topic: Option<String>,

    /// 论文作者
    #[arg(short, long)]
    pub author: Option<String>,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 暂存目录
    #[arg(short, long)]
    pub staging_dir: Option<PathBuf>,

    /// 自定义prompt模板目录
    #[arg(long)]
    pub prompts_dir: Option<PathBuf>,

    /// 自定义LaTeX模板
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// 是否启用详细日志
    #[arg(short, long)]
    pub verbose: bool,

    /// 模型名称
    #[arg(short, long)]
    pub model: Option<String>,

    /// LLM API基地址
    #[arg(long)]
    pub llm_api_base_url: Option<String>,

    /// LLM API KEY
    #[arg(long)]
    pub llm_api_key: Option<String>,

    /// LLM Provider (ollama, openai, deepseek, anthropic)
    #[arg(long)]
    pub llm_provider: Option<String>,

    /// 温度参数
    #[arg(long)]
    pub temperature: Option<f64>,

    /// 模型输出无法解析时的最大尝试次数
    #[arg(long)]
    pub max_parse_attempts: Option<u32>,

    /// 进入筛选前至少需要的文章数
    #[arg(long)]
    pub min_articles: Option<usize>,

    /// 单条检索词的最大结果数
    #[arg(long)]
    pub max_results_per_query: Option<usize>,

    /// 检索轮数上限
    #[arg(long)]
    pub max_search_rounds: Option<u32>,

    /// 只生成 main.tex 与 citations.bib，不调用排版工具链
    #[arg(long)]
    pub no_compile: bool,

    /// 强制重新生成（清空暂存目录）
    #[arg(long)]
    pub force_regenerate: bool,
}

impl Args {
    /// 将CLI参数转换为配置
    pub fn into_config(self) -> Result<Config> {
        let mut config = if let Some(config_path) = &self.config {
            // 如果显式指定了配置文件路径，从该路径加载
            Config::from_file(config_path)?
        } else {
            // 如果没有显式指定配置文件，尝试从默认位置加载
            let default_config_path = std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join("paper-scribe.toml");

            if default_config_path.exists() {
                Config::from_file(&default_config_path)?
            } else {
                Config::default()
            }
        };

        // 覆盖配置文件中的设置
        if let Some(topic) = self.topic {
            config.topic = topic;
        }
        if let Some(author) = self.author {
            config.author = author;
        }
        if let Some(staging_dir) = self.staging_dir {
            config.staging_dir = staging_dir;
        }
        if self.prompts_dir.is_some() {
            config.prompts_dir = self.prompts_dir;
        }
        if self.template.is_some() {
            config.template_path = self.template;
        }

        // 覆盖LLM配置
        if let Some(provider_str) = self.llm_provider {
            match provider_str.parse::<LLMProvider>() {
                Ok(provider) => config.llm.provider = provider,
                Err(_) => tracing::warn!(
                    "⚠️ 未知的provider: {}，使用 {}",
                    provider_str,
                    config.llm.provider
                ),
            }
        }
        if let Some(llm_api_base_url) = self.llm_api_base_url {
            config.llm.api_base_url = llm_api_base_url;
        }
        if let Some(llm_api_key) = self.llm_api_key {
            config.llm.api_key = llm_api_key;
        }
        if let Some(model) = self.model {
            config.llm.model = model;
        }
        if let Some(temperature) = self.temperature {
            config.llm.temperature = temperature;
        }
        if let Some(max_parse_attempts) = self.max_parse_attempts {
            config.llm.max_parse_attempts = max_parse_attempts.max(1);
        }

        // 检索配置
        if let Some(min_articles) = self.min_articles {
            config.search.min_articles = min_articles;
        }
        if let Some(max_results_per_query) = self.max_results_per_query {
            config.search.max_results_per_query = max_results_per_query;
        }
        if self.max_search_rounds.is_some() {
            config.search.max_search_rounds = self.max_search_rounds;
        }

        // 其他配置
        if self.no_compile {
            config.latex.compile = false;
        }
        config.force_regenerate = self.force_regenerate;
        config.verbose = self.verbose;

        Ok(config)
    }
}
