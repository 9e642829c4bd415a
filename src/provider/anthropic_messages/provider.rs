use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::LLMError;
use crate::http::{DynHttpTransport, post_json_with_headers};
use crate::provider::LLMProvider;
use crate::provider::status::ensure_success;

use super::types::{AnthropicMessageRequest, AnthropicMessageResponse, AnthropicRequestMessage};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_VERSION: &str = "2023-06-01";
/// 默认模型
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";
/// 默认输出 token 上限 Messages API 要求必须提供
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Anthropic Messages Provider（兼容 Claude Messages API）
pub struct AnthropicMessagesProvider {
    pub(crate) transport: DynHttpTransport,
    pub(crate) base_url: String,
    pub(crate) api_key: String,
    pub(crate) version: String,
    pub(crate) model: String,
    pub(crate) max_tokens: u32,
}

impl AnthropicMessagesProvider {
    /// 使用默认 base_url、anthropic-version 与模型创建 Provider
    pub fn new(transport: DynHttpTransport, api_key: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            version: DEFAULT_VERSION.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// 自定义 base_url，便于接入代理或兼容层
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// 自定义 Anthropic API 版本（anthropic-version）
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// 设置模型名称
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// 设置 max_tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub(crate) fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if base.ends_with("/v1") {
            format!("{base}/messages")
        } else {
            format!("{base}/v1/messages")
        }
    }

    fn build_headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        headers.insert("x-api-key".to_string(), self.api_key.clone());
        headers.insert("Accept".to_string(), "application/json".to_string());
        headers.insert("anthropic-version".to_string(), self.version.clone());
        headers
    }

    fn try_parse<T: DeserializeOwned>(&self, text: &str) -> Result<T, LLMError> {
        serde_json::from_str(text).map_err(|err| LLMError::Provider {
            provider: self.name(),
            message: format!("failed to parse Anthropic response: {err}"),
        })
    }

    fn first_block_text(&self, response: AnthropicMessageResponse) -> Result<String, LLMError> {
        let block = response
            .content
            .into_iter()
            .next()
            .ok_or(LLMError::EmptyContent {
                provider: self.name(),
            })?;
        tracing::debug!(
            provider = self.name(),
            id = response.id.as_deref().unwrap_or_default(),
            model = response.model.as_deref().unwrap_or_default(),
            stop_reason = response.stop_reason.as_deref().unwrap_or_default(),
            block = block.kind.as_deref().unwrap_or_default(),
            "received message"
        );
        Ok(block.text.unwrap_or_default())
    }
}

#[async_trait]
impl LLMProvider for AnthropicMessagesProvider {
    async fn complete(&self, prompt: &str) -> Result<String, LLMError> {
        let body = AnthropicMessageRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![AnthropicRequestMessage {
                role: "user",
                content: prompt,
            }],
        };
        let response = post_json_with_headers(
            self.transport.as_ref(),
            self.endpoint(),
            self.build_headers(),
            &body,
        )
        .await?;
        let text = ensure_success(self.name(), response)?;
        let parsed: AnthropicMessageResponse = self.try_parse(&text)?;
        self.first_block_text(parsed)
    }

    fn name(&self) -> &'static str {
        "anthropic_messages"
    }
}
