//! LLM 网关
//!
//! OpenAI 兼容的 chat completions 客户端。传输错误、非 2xx 状态码和空回复
//! 统一转换为 `AppError::Gateway`，由调用方决定是否重试。

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::LlmConfig;
use crate::error::{AppError, Result};
use crate::models::prompt::PromptMessage;
use crate::services::extractor::CompletionSource;

/// 对话补全网关
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// 提交有序消息序列，返回模型回复文本
    async fn complete(&self, messages: &[PromptMessage]) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI 兼容网关
#[derive(Clone)]
pub struct OpenAiGateway {
    client: Client,
    endpoint: String,
    config: LlmConfig,
}

impl OpenAiGateway {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));

        Ok(Self {
            client,
            endpoint,
            config,
        })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    async fn send(&self, messages: &[PromptMessage], temperature: f32) -> Result<String> {
        let body = ChatRequest {
            model: &self.config.model,
            messages,
            temperature,
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if !self.config.api_key.is_empty() {
            request = request.bearer_auth(&self.config.api_key);
        }

        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "LLM request failed");
            AppError::Gateway(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "LLM returned error status");
            return Err(AppError::Gateway(format!("status {}: {}", status, detail)));
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::Gateway("completion contained no choices".to_string()))?;

        debug!(model = %self.config.model, chars = content.len(), "LLM completion received");
        Ok(content)
    }
}

#[async_trait]
impl LlmGateway for OpenAiGateway {
    async fn complete(&self, messages: &[PromptMessage]) -> Result<String> {
        self.send(messages, self.config.temperature).await
    }
}

#[async_trait]
impl CompletionSource for OpenAiGateway {
    async fn complete_prompt(&self, prompt: &str) -> Result<String> {
        let messages = [PromptMessage::user(prompt)];
        self.send(&messages, self.config.extraction_temperature).await
    }
}
