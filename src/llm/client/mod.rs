//! LLM客户端 - 提供统一的LLM服务接口

use anyhow::Result;
use async_trait::async_trait;

use crate::config::LLMConfig;

mod providers;
pub mod retry;
pub mod utils;

use providers::ProviderClient;

pub use retry::prompt_until_parsed;
pub use utils::{REASONING_MARKER, extract_last_delimited, strip_reasoning};

/// 无状态的单轮对话模型
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// 发送一条用户消息并返回模型的完整回复
    async fn chat(&self, prompt: &str) -> Result<String>;
}

/// LLM客户端 - 基于rig的provider实现
#[derive(Clone)]
pub struct LLMClient {
    config: LLMConfig,
    client: ProviderClient,
}

impl LLMClient {
    /// 创建新的LLM客户端
    pub fn new(config: LLMConfig) -> Result<Self> {
        let client = ProviderClient::new(&config)?;
        Ok(Self { client, config })
    }

    /// 检查模型连接和功能是否正常
    pub async fn check_connection(&self) -> Result<()> {
        tracing::info!(
            "🔄 正在检查模型连接... ({} / {})",
            self.config.provider,
            self.config.model
        );
        match self.chat("Hello").await {
            Ok(_) => {
                tracing::info!("✅ 模型连接正常");
                Ok(())
            }
            Err(e) => {
                tracing::error!("❌ 模型连接失败: {}", e);
                Err(e)
            }
        }
    }
}

#[async_trait]
impl ChatModel for LLMClient {
    async fn chat(&self, prompt: &str) -> Result<String> {
        let agent = self.client.create_agent(&self.config.model, &self.config);
        agent.prompt(prompt).await
    }
}

/// 按脚本回复的测试模型
#[cfg(test)]
pub struct ScriptedModel {
    script: Script,
    prompts: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
enum Script {
    /// 依次返回，用尽后报错
    Sequence(std::sync::Mutex<std::collections::VecDeque<String>>),
    /// 根据prompt内容决定回复
    Routed(Box<dyn Fn(&str) -> String + Send + Sync>),
}

#[cfg(test)]
impl ScriptedModel {
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            script: Script::Sequence(std::sync::Mutex::new(
                responses.into_iter().map(String::from).collect(),
            )),
            prompts: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn routed(route: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self {
            script: Script::Routed(Box::new(route)),
            prompts: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl ChatModel for ScriptedModel {
    async fn chat(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.script {
            Script::Sequence(responses) => responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("scripted model ran out of responses")),
            Script::Routed(route) => Ok(route(prompt)),
        }
    }
}
