use serde::{Deserialize, Serialize};

/// Request body accepted by Anthropic Messages.
#[derive(Debug, Serialize)]
pub(crate) struct AnthropicMessageRequest<'a> {
    pub(crate) model: &'a str,
    pub(crate) max_tokens: u32,
    pub(crate) messages: Vec<AnthropicRequestMessage<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnthropicRequestMessage<'a> {
    pub(crate) role: &'a str,
    pub(crate) content: &'a str,
}

/// Non-streaming response payload returned by Anthropic Messages.
#[derive(Debug, Deserialize)]
pub(crate) struct AnthropicMessageResponse {
    /// Some compatibility layers omit the `id`, so keep it optional.
    #[serde(default)]
    pub(crate) id: Option<String>,
    #[serde(default)]
    pub(crate) model: Option<String>,
    /// Ordered list of content blocks.
    #[serde(default)]
    pub(crate) content: Vec<AnthropicContentBlock>,
    #[serde(default)]
    pub(crate) stop_reason: Option<String>,
}

/// Single content block; only the text payload is consumed.
#[derive(Debug, Deserialize)]
pub(crate) struct AnthropicContentBlock {
    #[serde(rename = "type", default)]
    pub(crate) kind: Option<String>,
    #[serde(default)]
    pub(crate) text: Option<String>,
}
