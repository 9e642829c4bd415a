//! Anthropic Messages (`POST /v1/messages`)

mod provider;
mod types;

pub use provider::{AnthropicMessagesProvider, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
