//! Concurrent fan-out of one prompt to every registered provider.
//!
//! Each provider runs in its own task and reports through an unordered completion
//! channel. [`Dispatcher::dispatch`] waits for all of them and hands the results back in
//! registration order, so presentation never depends on which provider answered first.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::error::LLMError;
use crate::provider::DynProvider;

/// Outcome of one provider call.
///
/// `content` is empty whenever `error` is set. A successful call may still carry empty
/// content; that case is reported to the user as a warning, not as a failure.
#[derive(Debug)]
pub struct ModelResult {
    /// Label of the slot that produced this result.
    pub name: String,
    pub content: String,
    pub error: Option<LLMError>,
    /// Wall-clock time spent in the provider call.
    pub duration: Duration,
}

impl ModelResult {
    pub fn new(
        name: impl Into<String>,
        outcome: Result<String, LLMError>,
        duration: Duration,
    ) -> Self {
        let (content, error) = match outcome {
            Ok(content) => (content, None),
            Err(err) => (String::new(), Some(err)),
        };
        Self {
            name: name.into(),
            content,
            error,
            duration,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// One registered provider and the label it is presented under.
#[derive(Clone)]
pub struct ProviderSlot {
    pub label: String,
    pub provider: DynProvider,
}

/// 调度入口 按注册顺序维护 Provider
pub struct Dispatcher {
    slots: Vec<ProviderSlot>,
}

impl Dispatcher {
    /// 创建 Builder 便于后续注册 Provider
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder { slots: Vec::new() }
    }

    /// 返回注册顺序下的标签
    pub fn labels(&self) -> Vec<&str> {
        self.slots.iter().map(|slot| slot.label.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Sends `prompt` to every provider concurrently and waits for all of them.
    ///
    /// Every slot yields exactly one [`ModelResult`], in registration order. A failing
    /// provider never short-circuits the others, and a task that dies before reporting
    /// is recorded as [`LLMError::Aborted`].
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn dispatch(&self, prompt: impl Into<Arc<str>>) -> Vec<ModelResult> {
        let prompt: Arc<str> = prompt.into();
        let started = Instant::now();
        tracing::info!(providers = self.slots.len(), "dispatching prompt");

        let (tx, mut rx) = mpsc::unbounded_channel::<(usize, ModelResult)>();
        let mut handles = Vec::with_capacity(self.slots.len());
        for (index, slot) in self.slots.iter().enumerate() {
            let tx = tx.clone();
            let label = slot.label.clone();
            let provider = Arc::clone(&slot.provider);
            let prompt = Arc::clone(&prompt);
            handles.push(tokio::spawn(async move {
                let start = Instant::now();
                let outcome = provider.complete(&prompt).await;
                let result = ModelResult::new(label, outcome, start.elapsed());
                // The receiver outlives every sender.
                let _ = tx.send((index, result));
            }));
        }
        drop(tx);

        let mut collected: Vec<Option<ModelResult>> =
            std::iter::repeat_with(|| None).take(self.slots.len()).collect();
        while let Some((index, result)) = rx.recv().await {
            match &result.error {
                None => tracing::info!(
                    provider = %result.name,
                    elapsed = ?result.duration,
                    chars = result.content.chars().count(),
                    "provider completed"
                ),
                Some(err) => tracing::warn!(
                    provider = %result.name,
                    elapsed = ?result.duration,
                    error = %err,
                    "provider failed"
                ),
            }
            collected[index] = Some(result);
        }

        for (index, handle) in handles.into_iter().enumerate() {
            if let Err(err) = handle.await {
                tracing::error!(
                    provider = %self.slots[index].label,
                    error = %err,
                    "dispatch task died"
                );
            }
        }

        collected
            .into_iter()
            .zip(&self.slots)
            .map(|(result, slot)| {
                result.unwrap_or_else(|| {
                    ModelResult::new(
                        slot.label.clone(),
                        Err(LLMError::Aborted {
                            message: format!("{} task ended without a result", slot.label),
                        }),
                        started.elapsed(),
                    )
                })
            })
            .collect()
    }
}

/// 负责按顺序注册 Provider 的 Builder
pub struct DispatcherBuilder {
    slots: Vec<ProviderSlot>,
}

impl DispatcherBuilder {
    /// 追加一个 Provider 注册顺序即输出顺序
    pub fn register<S: Into<String>>(mut self, label: S, provider: DynProvider) -> Self {
        self.slots.push(ProviderSlot {
            label: label.into(),
            provider,
        });
        self
    }

    /// 构建最终的 Dispatcher
    pub fn build(self) -> Dispatcher {
        Dispatcher { slots: self.slots }
    }
}
