use std::time::Duration;

use thiserror::Error;

/// Aggregates every failure mode a provider call or a context load can produce.
///
/// Provider failures are split by origin so callers can tell infrastructure problems
/// ([`LLMError::Transport`]) from provider-reported rejections ([`LLMError::Status`])
/// and from a well-formed reply that simply carried nothing ([`LLMError::EmptyContent`]).
#[derive(Debug, Error)]
pub enum LLMError {
    /// Represents transport-layer or networking failures.
    #[error("transport error: {message}")]
    Transport { message: String },
    /// The provider answered with a non-2xx status.
    #[error("provider {provider} returned status {status_line}, body: {body}")]
    Status {
        /// Name of the provider, such as `openai_chat`.
        provider: &'static str,
        /// Numeric HTTP status code.
        status: u16,
        /// Status code plus canonical reason, e.g. `429 Too Many Requests`.
        status_line: String,
        /// Raw response body, kept verbatim for diagnosis.
        body: String,
        /// Wait duration suggested through `Retry-After`, if any.
        retry_after: Option<Duration>,
    },
    /// The provider answered successfully but returned no choices or content blocks.
    #[error("provider {provider} returned no content")]
    EmptyContent { provider: &'static str },
    /// Wraps provider payloads that could not be decoded.
    #[error("provider {provider} error: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },
    /// Signals validation failures in the request payload.
    #[error("invalid request: {message}")]
    Validation { message: String },
    /// Raised when building or validating configuration fails.
    #[error("invalid configuration for {field}: {reason}")]
    InvalidConfig {
        /// Name of the configuration field that failed validation.
        field: String,
        /// Additional context explaining why the field is invalid.
        reason: String,
    },
    /// Structural failure while walking a context directory.
    #[error("failed to load context from {path}: {message}")]
    Context { path: String, message: String },
    /// A dispatch task ended without reporting a result.
    #[error("request aborted: {message}")]
    Aborted { message: String },
}

impl LLMError {
    /// Creates an [`LLMError::Transport`] from a textual description.
    ///
    /// # Examples
    ///
    /// ```
    /// use kotoba_duet::error::LLMError;
    ///
    /// let err = LLMError::transport("dns lookup failed");
    /// assert!(matches!(err, LLMError::Transport { .. }));
    /// ```
    pub fn transport<T: Into<String>>(message: T) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates an [`LLMError::Provider`] with the given provider name and message.
    pub fn provider<T: Into<String>>(provider: &'static str, message: T) -> Self {
        Self::Provider {
            provider,
            message: message.into(),
        }
    }

    /// Returns `true` for failures that may succeed if the same request is sent again.
    ///
    /// Transport errors, throttling (429) and server-side (5xx) statuses qualify.
    /// Nothing in this crate retries; the classification is for library callers.
    ///
    /// # Examples
    ///
    /// ```
    /// use kotoba_duet::error::LLMError;
    ///
    /// assert!(LLMError::transport("connection reset").is_retryable());
    /// assert!(!LLMError::EmptyContent { provider: "openai_chat" }.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Status { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }
}
