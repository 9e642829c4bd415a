use std::collections::HashMap;
use std::env;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dispatch::Dispatcher;
use crate::error::LLMError;
use crate::http::DynHttpTransport;
use crate::provider::DynProvider;
use crate::provider::anthropic_messages::{self, AnthropicMessagesProvider};
use crate::provider::openai_chat::{self, OpenAiChatProvider};

/// 模型配置 描述一个参与调度的后端
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// 展示用标签 同时作为凭据表的键 例如 `GPT-4o`
    pub label: String,
    pub provider: ProviderKind,
    /// 读取 API Key 的环境变量名
    pub api_key_env: String,
    /// 留空时使用 provider 默认模型
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    /// 仅 Anthropic 使用
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

/// 供应商类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    OpenAiChat,
    AnthropicMessages,
}

/// 默认的两个后端 顺序即输出顺序
pub fn default_configs() -> Vec<ModelConfig> {
    vec![
        ModelConfig {
            label: "GPT-4o".to_string(),
            provider: ProviderKind::OpenAiChat,
            api_key_env: "OPENAI_API_KEY".to_string(),
            model: Some(openai_chat::DEFAULT_MODEL.to_string()),
            base_url: None,
            max_tokens: None,
        },
        ModelConfig {
            label: "Claude Sonnet 4.5".to_string(),
            provider: ProviderKind::AnthropicMessages,
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            model: Some(anthropic_messages::DEFAULT_MODEL.to_string()),
            base_url: None,
            max_tokens: Some(anthropic_messages::DEFAULT_MAX_TOKENS),
        },
    ]
}

/// 按标签索引的 API Key 表 由入口注入 不在调用路径中读取环境变量
#[derive(Clone, Default)]
pub struct Credentials {
    keys: HashMap<String, String>,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为某个标签登记 API Key
    pub fn with_key(mut self, label: impl Into<String>, key: impl Into<String>) -> Self {
        self.keys.insert(label.into(), key.into());
        self
    }

    /// 通过任意查找函数填充凭据 空白值视为缺失
    pub fn from_lookup<F>(configs: &[ModelConfig], mut lookup: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let keys = configs
            .iter()
            .filter_map(|config| {
                lookup(&config.api_key_env)
                    .filter(|value| !value.trim().is_empty())
                    .map(|value| (config.label.clone(), value))
            })
            .collect();
        Self { keys }
    }

    /// 从进程环境变量读取
    pub fn from_env(configs: &[ModelConfig]) -> Self {
        Self::from_lookup(configs, |name| env::var(name).ok())
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.keys.get(label).map(String::as_str)
    }

    /// 返回缺少凭据的环境变量名 保持配置顺序
    pub fn missing<'a>(&self, configs: &'a [ModelConfig]) -> Vec<&'a str> {
        configs
            .iter()
            .filter(|config| !self.keys.contains_key(&config.label))
            .map(|config| config.api_key_env.as_str())
            .collect()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut labels: Vec<_> = self.keys.keys().collect();
        labels.sort();
        f.debug_struct("Credentials")
            .field("labels", &labels)
            .finish_non_exhaustive()
    }
}

/// 根据一组模型配置与凭据构建调度器
pub fn build_dispatcher(
    configs: &[ModelConfig],
    credentials: &Credentials,
    transport: DynHttpTransport,
) -> Result<Dispatcher, LLMError> {
    let mut builder = Dispatcher::builder();

    for config in configs {
        let api_key = credentials
            .get(&config.label)
            .ok_or_else(|| LLMError::InvalidConfig {
                field: config.api_key_env.clone(),
                reason: format!("no API key configured for {}", config.label),
            })?;
        let provider = build_provider_from_config(config, api_key, transport.clone());
        builder = builder.register(config.label.clone(), provider);
    }

    Ok(builder.build())
}

fn build_provider_from_config(
    config: &ModelConfig,
    api_key: &str,
    transport: DynHttpTransport,
) -> DynProvider {
    match config.provider {
        ProviderKind::OpenAiChat => {
            let mut provider = OpenAiChatProvider::new(transport, api_key);

            if let Some(base_url) = &config.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            if let Some(model) = &config.model {
                provider = provider.with_model(model.clone());
            }

            Arc::new(provider)
        }
        ProviderKind::AnthropicMessages => {
            let mut provider = AnthropicMessagesProvider::new(transport, api_key);

            if let Some(base_url) = &config.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            if let Some(model) = &config.model {
                provider = provider.with_model(model.clone());
            }
            if let Some(max_tokens) = config.max_tokens {
                provider = provider.with_max_tokens(max_tokens);
            }

            Arc::new(provider)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::reqwest::default_dyn_transport;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl FnMut(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn default_configs_keep_presentation_order() {
        let configs = default_configs();
        let labels: Vec<_> = configs.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["GPT-4o", "Claude Sonnet 4.5"]);
        assert_eq!(configs[0].provider, ProviderKind::OpenAiChat);
        assert_eq!(configs[1].max_tokens, Some(1024));
    }

    #[test]
    fn from_lookup_treats_blank_values_as_missing() {
        let configs = default_configs();
        let credentials = Credentials::from_lookup(
            &configs,
            lookup_from(&[("OPENAI_API_KEY", "sk-1"), ("ANTHROPIC_API_KEY", "  ")]),
        );

        assert_eq!(credentials.get("GPT-4o"), Some("sk-1"));
        assert_eq!(credentials.get("Claude Sonnet 4.5"), None);
        assert_eq!(credentials.missing(&configs), vec!["ANTHROPIC_API_KEY"]);
    }

    #[test]
    fn build_dispatcher_registers_every_config_in_order() {
        let configs = default_configs();
        let credentials = Credentials::new()
            .with_key("GPT-4o", "sk-1")
            .with_key("Claude Sonnet 4.5", "sk-ant-1");
        let transport = default_dyn_transport().expect("transport");

        let dispatcher = build_dispatcher(&configs, &credentials, transport).expect("dispatcher");
        assert_eq!(dispatcher.labels(), vec!["GPT-4o", "Claude Sonnet 4.5"]);
    }

    #[test]
    fn build_dispatcher_rejects_missing_credential() {
        let configs = default_configs();
        let credentials = Credentials::new().with_key("GPT-4o", "sk-1");
        let transport = default_dyn_transport().expect("transport");

        match build_dispatcher(&configs, &credentials, transport) {
            Err(LLMError::InvalidConfig { field, reason }) => {
                assert_eq!(field, "ANTHROPIC_API_KEY");
                assert!(reason.contains("Claude Sonnet 4.5"), "{reason}");
            }
            Err(other) => panic!("unexpected error type: {other:?}"),
            Ok(_) => panic!("missing credential must be rejected"),
        }
    }

    #[test]
    fn debug_output_never_contains_keys() {
        let credentials = Credentials::new().with_key("GPT-4o", "sk-secret");
        let debug = format!("{credentials:?}");
        assert!(debug.contains("GPT-4o"));
        assert!(!debug.contains("sk-secret"));
    }

    #[test]
    fn provider_kind_uses_snake_case() {
        let config: ModelConfig = serde_json::from_str(
            r#"{"label":"x","provider":"anthropic_messages","api_key_env":"K"}"#,
        )
        .expect("config");
        assert_eq!(config.provider, ProviderKind::AnthropicMessages);
        assert!(config.model.is_none());
    }
}
