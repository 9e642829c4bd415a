use std::sync::Arc;

use async_trait::async_trait;

use crate::error::LLMError;

pub mod anthropic_messages;
pub mod openai_chat;
pub(crate) mod status;

/// 统一的 Provider Trait 所有供应商实现该接口即可接入调度器
///
/// 每次调用都是独立的一次性请求 实现方不得在调用之间共享可变状态
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// 发送单条 user 消息并返回生成的文本
    ///
    /// 成功但内容为空时返回 `Ok(String::new())`；没有任何候选内容时返回
    /// [`LLMError::EmptyContent`]
    async fn complete(&self, prompt: &str) -> Result<String, LLMError>;

    /// 供应商名称
    fn name(&self) -> &'static str;
}

/// 线程安全 Provider
pub type DynProvider = Arc<dyn LLMProvider>;
