//! 同一问题并发发送给多个 LLM 后端 并按配置顺序对比输出

pub mod cli;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod prompt;
pub mod provider;
pub mod render;

pub use config::{Credentials, ModelConfig, ProviderKind, build_dispatcher, default_configs};
pub use context::{ContextLoader, LoadedContext, load_context};
pub use dispatch::{Dispatcher, ModelResult, ProviderSlot};
pub use error::LLMError;
pub use provider::{DynProvider, LLMProvider};
