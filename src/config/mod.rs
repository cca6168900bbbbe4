use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// LLM Provider类型
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub enum LLMProvider {
    #[serde(rename = "ollama")]
    #[default]
    Ollama,
    #[serde(rename = "openai")]
    OpenAI,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "anthropic")]
    Anthropic,
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::Ollama => write!(f, "ollama"),
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::DeepSeek => write!(f, "deepseek"),
            LLMProvider::Anthropic => write!(f, "anthropic"),
        }
    }
}

impl std::str::FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(LLMProvider::Ollama),
            "openai" => Ok(LLMProvider::OpenAI),
            "deepseek" => Ok(LLMProvider::DeepSeek),
            "anthropic" => Ok(LLMProvider::Anthropic),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// 应用程序配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Config {
    /// 论文主题
    pub topic: String,

    /// 论文作者
    pub author: String,

    /// 暂存目录，保存各阶段产物与最终排版结果
    pub staging_dir: PathBuf,

    /// 自定义prompt模板目录，同名文件覆盖内置模板
    pub prompts_dir: Option<PathBuf>,

    /// 自定义LaTeX文档模板
    pub template_path: Option<PathBuf>,

    /// LLM模型配置
    pub llm: LLMConfig,

    /// 文献检索配置
    pub search: SearchConfig,

    /// 排版配置
    pub latex: LatexConfig,

    /// 强制重新生成（清空暂存目录）
    pub force_regenerate: bool,

    /// 是否启用详细日志
    pub verbose: bool,
}

/// LLM模型配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LLMConfig {
    /// LLM Provider类型
    pub provider: LLMProvider,

    /// LLM API KEY
    pub api_key: String,

    /// LLM API基地址
    pub api_base_url: String,

    /// 模型名称
    pub model: String,

    /// 最大tokens
    pub max_tokens: u32,

    /// 温度
    pub temperature: f64,

    /// 模型输出无法解析时，同一prompt的最大尝试次数
    pub max_parse_attempts: u32,
}

/// 文献检索配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    /// 检索API地址
    pub api_base_url: String,

    /// 全文HTML地址前缀
    pub html_base_url: String,

    /// 单条检索词返回的最大结果数
    pub max_results_per_query: usize,

    /// 进入筛选前至少需要的去重文章数
    pub min_articles: usize,

    /// 检索轮数上限，None表示不设上限
    pub max_search_rounds: Option<u32>,

    /// 相邻两次检索API请求的最小间隔（毫秒）
    pub request_interval_ms: u64,
}

/// 排版配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LatexConfig {
    /// 是否调用排版工具链生成PDF
    pub compile: bool,

    /// 文档编译器
    pub tex_engine: String,

    /// 参考文献编译器
    pub bib_engine: String,
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file: {:?}", path))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// 最终排版结果所在目录
    pub fn result_dir(&self) -> PathBuf {
        self.staging_dir.join("result")
    }

    /// 自定义LaTeX模板，存在时才返回
    pub fn template_override(&self) -> Option<&Path> {
        self.template_path.as_deref().filter(|path| path.is_file())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            topic: String::from("Explainable AI in the area of audio deepfake detection."),
            author: String::from("Bot"),
            staging_dir: PathBuf::from("temp"),
            prompts_dir: None,
            template_path: None,
            llm: LLMConfig::default(),
            search: SearchConfig::default(),
            latex: LatexConfig::default(),
            force_regenerate: false,
            verbose: false,
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::default(),
            api_key: std::env::var("PAPER_SCRIBE_LLM_API_KEY").unwrap_or_default(),
            api_base_url: String::from("http://localhost:11434"),
            model: String::from("qwen3:14b"),
            max_tokens: 32768,
            temperature: 0.6,
            max_parse_attempts: 5,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::from("http://export.arxiv.org/api/query"),
            html_base_url: String::from("https://arxiv.org/html"),
            max_results_per_query: 10,
            min_articles: 50,
            max_search_rounds: None,
            request_interval_ms: 3000,
        }
    }
}

impl Default for LatexConfig {
    fn default() -> Self {
        Self {
            compile: true,
            tex_engine: String::from("pdflatex"),
            bib_engine: String::from("bibtex"),
        }
    }
}
