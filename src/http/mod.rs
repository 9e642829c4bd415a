//! The HTTP seam between providers and the network.
//!
//! Every provider call is a single JSON `POST` whose full response is buffered before
//! it is interpreted. Providers only see [`HttpRequest`] / [`HttpResponse`], so tests
//! swap [`reqwest::ReqwestTransport`] for an in-memory [`HttpTransport`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::LLMError;

/// A JSON `POST` about to be sent to a vendor endpoint.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Wraps an already serialized JSON payload and tags it as `application/json`.
    ///
    /// ```
    /// use kotoba_duet::http::HttpRequest;
    ///
    /// let payload = br#"{"model":"gpt-4o","messages":[]}"#.to_vec();
    /// let request = HttpRequest::post_json("https://api.openai.com/v1/chat/completions", payload);
    /// assert_eq!(request.headers["Content-Type"], "application/json");
    /// assert!(request.url.ends_with("/chat/completions"));
    /// ```
    pub fn post_json(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::from([("Content-Type".to_string(), "application/json".to_string())]),
            body,
        }
    }

    /// Adds vendor headers (credentials, API version). A name already present is
    /// overwritten.
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use kotoba_duet::http::HttpRequest;
    ///
    /// let request = HttpRequest::post_json("https://api.anthropic.com/v1/messages", Vec::new())
    ///     .with_headers(HashMap::from([
    ///         ("x-api-key".to_string(), "sk-ant-test".to_string()),
    ///         ("anthropic-version".to_string(), "2023-06-01".to_string()),
    ///     ]));
    /// assert_eq!(request.headers.len(), 3);
    /// assert_eq!(request.headers["anthropic-version"], "2023-06-01");
    /// ```
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }
}

/// A fully buffered vendor response. Non-2xx statuses are data here, not errors.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Header lookup ignoring ASCII case, since transports do not agree on casing.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Renders a status code as `"<code> <reason>"`, e.g. `429 Too Many Requests`.
///
/// Codes without a registered reason phrase are rendered as the bare number.
pub fn status_line(status: u16) -> String {
    match ::reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
    {
        Some(reason) => format!("{status} {reason}"),
        None => status.to_string(),
    }
}

/// Sends one buffered request and returns the buffered response.
///
/// Implementations report connection, DNS, TLS, timeout and body-read failures as
/// [`LLMError::Transport`]. Any status the server answers with, 4xx and 5xx included,
/// comes back as `Ok` so the provider can attach its own name to the failure.
///
/// A canned transport is enough to drive a provider offline:
///
/// ```
/// # use async_trait::async_trait;
/// use kotoba_duet::http::{HttpRequest, HttpResponse, HttpTransport};
/// use kotoba_duet::LLMError;
///
/// struct Overloaded;
///
/// #[async_trait]
/// impl HttpTransport for Overloaded {
///     async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, LLMError> {
///         Ok(HttpResponse {
///             status: 529,
///             headers: Default::default(),
///             body: br#"{"type":"error","error":{"type":"overloaded_error"}}"#.to_vec(),
///         })
///     }
/// }
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let request = HttpRequest::post_json("https://api.anthropic.com/v1/messages", Vec::new());
/// let response = Overloaded.send(request).await.unwrap();
/// assert!(!response.is_success());
/// # });
/// ```
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, LLMError>;
}

/// Shared transport handle; one instance serves every provider in a dispatch.
pub type DynHttpTransport = Arc<dyn HttpTransport>;

/// Serializes `body`, merges `headers` over the JSON content type and sends the POST.
///
/// A body that fails to serialize is reported as [`LLMError::Validation`] and nothing
/// is sent.
pub async fn post_json_with_headers<T: Serialize>(
    transport: &dyn HttpTransport,
    url: impl Into<String>,
    headers: HashMap<String, String>,
    body: &T,
) -> Result<HttpResponse, LLMError> {
    let payload = serde_json::to_vec(body).map_err(|err| LLMError::Validation {
        message: format!("failed to serialize request: {err}"),
    })?;
    let request = HttpRequest::post_json(url, payload).with_headers(headers);
    transport.send(request).await
}

pub mod reqwest;
