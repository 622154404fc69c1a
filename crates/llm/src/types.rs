//! Client Types
//!
//! Configuration, request/result types, and the error taxonomy for the
//! LM Studio client.

use jobdeck_core::streaming::DeltaSink;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default LM Studio server address
pub const LM_STUDIO_DEFAULT_URL: &str = "http://localhost:1234";

/// Configuration for the LM Studio client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudioConfig {
    /// Server base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model to request when the caller does not pick one explicitly
    #[serde(default)]
    pub model: String,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_base_url() -> String {
    LM_STUDIO_DEFAULT_URL.to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.7
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: String::new(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl StudioConfig {
    /// URL of the model listing endpoint.
    pub fn models_endpoint(&self) -> String {
        format!("{}/v1/models", self.base_url.trim_end_matches('/'))
    }

    /// URL of the chat completion endpoint.
    pub fn chat_endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// Input to a single streaming call.
///
/// The two sinks are invoked synchronously with stream processing, zero or
/// more times each, with cleaned text fragments in arrival order.
pub struct StreamRequest {
    /// Identifier used for cancellation lookup; unique per in-flight call
    pub stream_id: String,
    /// Which loaded model to invoke
    pub model: String,
    /// System prompt, passed through unexamined
    pub system_prompt: String,
    /// User prompt, passed through unexamined
    pub user_prompt: String,
    /// Bound on generated length
    pub max_tokens: u32,
    /// Sampling temperature, passed through unexamined
    pub temperature: f32,
    /// Sink for fragments routed to the thinking channel
    pub on_thinking_delta: Option<DeltaSink>,
    /// Sink for fragments routed to the document channel
    pub on_document_delta: Option<DeltaSink>,
}

impl StreamRequest {
    /// Create a request with a generated stream id and default bounds.
    pub fn new(
        model: impl Into<String>,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
    ) -> Self {
        Self {
            stream_id: uuid::Uuid::new_v4().to_string(),
            model: model.into(),
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            on_thinking_delta: None,
            on_document_delta: None,
        }
    }

    /// Create a request taking model and bounds from a config.
    pub fn from_config(
        config: &StudioConfig,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
    ) -> Self {
        Self {
            stream_id: uuid::Uuid::new_v4().to_string(),
            model: config.model.clone(),
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            on_thinking_delta: None,
            on_document_delta: None,
        }
    }

    /// Override the generated stream id.
    pub fn with_stream_id(mut self, stream_id: impl Into<String>) -> Self {
        self.stream_id = stream_id.into();
        self
    }

    /// Attach a sink for thinking-channel fragments.
    pub fn with_thinking_sink(mut self, sink: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_thinking_delta = Some(Box::new(sink));
        self
    }

    /// Attach a sink for document-channel fragments.
    pub fn with_document_sink(mut self, sink: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_document_delta = Some(Box::new(sink));
        self
    }
}

/// Output of a completed or terminated streaming call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreamResult {
    /// Trimmed concatenation of all thinking-channel fragments
    pub thinking_text: String,
    /// Trimmed concatenation of all document-channel fragments
    pub document_text: String,
    /// Why generation stopped; `None` if the server never reported one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
    /// True iff the call ended via explicit cancellation
    pub cancelled: bool,
}

/// Server-reported reason generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinishReason {
    /// Natural end of generation
    Stop,
    /// Token budget exhausted; content up to this point is still usable
    Length,
    /// Ended by explicit cancellation
    Cancelled,
}

impl From<&str> for FinishReason {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "length" | "max_tokens" => FinishReason::Length,
            "cancelled" => FinishReason::Cancelled,
            _ => FinishReason::Stop,
        }
    }
}

impl std::fmt::Display for FinishReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FinishReason::Stop => write!(f, "stop"),
            FinishReason::Length => write!(f, "length"),
            FinishReason::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// One model currently loaded by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelDescriptor {
    /// Model identifier as reported by the server
    pub id: String,
}

/// Errors surfaced by the LM Studio client.
///
/// Cancellation is not an error; it is reported through
/// [`StreamResult::cancelled`]. Malformed stream frames are logged and
/// skipped, never surfaced.
#[derive(Error, Debug)]
pub enum StudioError {
    /// The local server could not be reached
    #[error("Cannot reach LM Studio at {endpoint}. Start LM Studio and enable the local server, then try again.")]
    Connection { endpoint: String },

    /// The requested model is not loaded on the server
    #[error("Model \"{model}\" is not loaded in LM Studio. Enable just-in-time model loading in the server settings, load the model from the LM Studio window, or check that the model is downloaded.")]
    ModelNotLoaded { model: String },

    /// Any other non-2xx response from the server
    #[error("LM Studio request failed with status {status}: {message}")]
    Api { status: u16, message: String },
}

/// Result type alias for client operations
pub type StudioResult<T> = Result<T, StudioError>;
