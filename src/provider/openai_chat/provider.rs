use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::LLMError;
use crate::http::{DynHttpTransport, post_json_with_headers};
use crate::provider::LLMProvider;
use crate::provider::status::ensure_success;

use super::types::{OpenAiChatRequest, OpenAiChatResponse, OpenAiRequestMessage};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
/// 默认模型
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// OpenAI Chat Completions Provider
pub struct OpenAiChatProvider {
    pub(crate) transport: DynHttpTransport,
    pub(crate) base_url: String,
    pub(crate) api_key: String,
    pub(crate) model: String,
}

impl OpenAiChatProvider {
    /// 创建带默认 base_url 与默认模型的 Provider
    pub fn new(transport: DynHttpTransport, api_key: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// 自定义 base_url
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// 设置模型
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub(crate) fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if base.ends_with("/v1") {
            format!("{base}/chat/completions")
        } else {
            format!("{base}/v1/chat/completions")
        }
    }

    fn build_headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        headers.insert(
            "Authorization".to_string(),
            format!("Bearer {}", self.api_key),
        );
        headers.insert("Accept".to_string(), "application/json".to_string());
        headers
    }

    fn try_parse<T: DeserializeOwned>(&self, text: &str) -> Result<T, LLMError> {
        serde_json::from_str(text).map_err(|err| LLMError::Provider {
            provider: self.name(),
            message: format!("failed to parse OpenAI response: {err}"),
        })
    }

    fn first_choice_text(&self, response: OpenAiChatResponse) -> Result<String, LLMError> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(LLMError::EmptyContent {
                provider: self.name(),
            })?;
        tracing::debug!(
            provider = self.name(),
            model = response.model.as_deref().unwrap_or_default(),
            finish_reason = choice.finish_reason.as_deref().unwrap_or_default(),
            "received chat completion"
        );
        // `content` is null when the model stops without producing text.
        Ok(choice
            .message
            .and_then(|message| message.content)
            .map(|content| content.into_text())
            .unwrap_or_default())
    }
}

#[async_trait]
impl LLMProvider for OpenAiChatProvider {
    async fn complete(&self, prompt: &str) -> Result<String, LLMError> {
        let body = OpenAiChatRequest {
            model: &self.model,
            messages: vec![OpenAiRequestMessage {
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
        let parsed: OpenAiChatResponse = self.try_parse(&text)?;
        self.first_choice_text(parsed)
    }

    fn name(&self) -> &'static str {
        "openai_chat"
    }
}
