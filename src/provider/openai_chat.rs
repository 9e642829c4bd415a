//! OpenAI Chat Completions (`POST /v1/chat/completions`)

mod provider;
mod types;

pub use provider::{DEFAULT_MODEL, OpenAiChatProvider};
