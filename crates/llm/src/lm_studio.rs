//! LM Studio Client
//!
//! Streams chat completions from a locally running LM Studio server over its
//! OpenAI-compatible API, routing each delta into the thinking or document
//! channel as it arrives. Also exposes the model listing, a connection
//! check, and per-stream cancellation.

use futures_util::StreamExt;
use serde::Deserialize;

use crate::classifier::DeltaClassifier;
use crate::http_client::build_http_client;
use crate::registry::StreamRegistry;
use crate::sse::{SseFrame, SseFrameDecoder};
use crate::types::{
    FinishReason, ModelDescriptor, StreamRequest, StreamResult, StudioConfig, StudioError,
    StudioResult,
};
use jobdeck_core::streaming::{ChannelEvent, DeltaSink};

/// Client for a locally running LM Studio server.
pub struct LmStudioClient {
    config: StudioConfig,
    client: reqwest::Client,
    registry: StreamRegistry,
}

impl LmStudioClient {
    /// Create a client with the given configuration.
    pub fn new(config: StudioConfig) -> Self {
        Self {
            config,
            client: build_http_client(),
            registry: StreamRegistry::new(),
        }
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// List the models currently loaded by the server.
    ///
    /// Never fails: any error is logged and an empty list returned, since
    /// "no models" is a normal, displayable state for the caller.
    pub async fn fetch_models(&self) -> Vec<ModelDescriptor> {
        let url = self.config.models_endpoint();
        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("model listing failed to reach {}: {}", url, e);
                return vec![];
            }
        };
        if !response.status().is_success() {
            tracing::warn!("model listing returned status {}", response.status());
            return vec![];
        }
        match response.json::<ModelsResponse>().await {
            Ok(listing) => listing.data,
            Err(e) => {
                tracing::warn!("model listing response did not parse: {}", e);
                vec![]
            }
        }
    }

    /// Ping the server; true when the models endpoint answers with success.
    pub async fn test_connection(&self) -> bool {
        match self.client.get(self.config.models_endpoint()).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// Cancel an in-flight stream. Unknown ids are a no-op.
    pub fn cancel_stream(&self, stream_id: &str) {
        self.registry.cancel(stream_id);
    }

    /// Whether a stream id is currently registered.
    pub fn is_stream_active(&self, stream_id: &str) -> bool {
        self.registry.contains(stream_id)
    }

    /// Number of in-flight streams.
    pub fn active_streams(&self) -> usize {
        self.registry.len()
    }

    /// Stream a chat completion, routing deltas into the thinking and
    /// document channels as they are classified.
    ///
    /// The request's sinks see every fragment live; the returned result
    /// carries the trimmed channel concatenations. A cancelled stream
    /// returns empty text fields with `cancelled: true`; partial content
    /// is intentionally left to what the sinks already received.
    pub async fn stream_completion(&self, request: StreamRequest) -> StudioResult<StreamResult> {
        if !self.test_connection().await {
            return Err(StudioError::Connection {
                endpoint: self.config.base_url.clone(),
            });
        }

        let token = self.registry.register(&request.stream_id);
        let _guard = self.registry.removal_guard(&request.stream_id);
        tracing::debug!(
            "stream {} POST {} (model {})",
            request.stream_id,
            self.config.chat_endpoint(),
            request.model
        );

        let body = build_request_body(&request);
        let send = self
            .client
            .post(self.config.chat_endpoint())
            .header("Content-Type", "application/json")
            .json(&body)
            .send();

        let response = tokio::select! {
            _ = token.cancelled() => {
                tracing::debug!("stream {} cancelled before the request completed", request.stream_id);
                return Ok(cancelled_result());
            }
            response = send => response.map_err(|e| {
                tracing::warn!("stream {} request failed: {}", request.stream_id, e);
                StudioError::Connection {
                    endpoint: self.config.base_url.clone(),
                }
            })?,
        };

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(parse_error_body(status.as_u16(), &body_text, &request.model));
        }

        let mut on_thinking = request.on_thinking_delta;
        let mut on_document = request.on_document_delta;
        let mut classifier = DeltaClassifier::new();
        let mut decoder = SseFrameDecoder::new();
        let mut thinking_text = String::new();
        let mut document_text = String::new();
        let mut finish_reason: Option<FinishReason> = None;
        let mut stream = response.bytes_stream();

        loop {
            let next = tokio::select! {
                _ = token.cancelled() => {
                    tracing::debug!("stream {} cancelled mid-read", request.stream_id);
                    return Ok(cancelled_result());
                }
                next = stream.next() => next,
            };
            let Some(chunk) = next else { break };
            let chunk = chunk.map_err(|e| {
                tracing::warn!("stream {} body read failed: {}", request.stream_id, e);
                StudioError::Connection {
                    endpoint: self.config.base_url.clone(),
                }
            })?;

            for frame in decoder.feed(&chunk) {
                let payload = match frame {
                    // Stream end is signaled by the transport; the sentinel
                    // line itself is skipped.
                    SseFrame::Done => continue,
                    SseFrame::Data(payload) => payload,
                };
                let parsed: CompletionChunk = match serde_json::from_str(&payload) {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        tracing::warn!("stream {} skipping malformed frame: {}", request.stream_id, e);
                        continue;
                    }
                };
                if let Some(choice) = parsed.choices.first() {
                    if let Some(reason) = &choice.finish_reason {
                        finish_reason = Some(FinishReason::from(reason.as_str()));
                    }
                    if let Some(content) = choice.delta.as_ref().and_then(|d| d.content.as_deref())
                    {
                        for event in classifier.push(content) {
                            route_event(
                                event,
                                &mut thinking_text,
                                &mut document_text,
                                &mut on_thinking,
                                &mut on_document,
                            );
                        }
                    }
                }
            }
        }

        for event in classifier.finish() {
            route_event(
                event,
                &mut thinking_text,
                &mut document_text,
                &mut on_thinking,
                &mut on_document,
            );
        }

        Ok(StreamResult {
            thinking_text: thinking_text.trim().to_string(),
            document_text: document_text.trim().to_string(),
            finish_reason,
            cancelled: false,
        })
    }
}

/// Accumulate a routed fragment and forward it to its sink.
fn route_event(
    event: ChannelEvent,
    thinking_text: &mut String,
    document_text: &mut String,
    on_thinking: &mut Option<DeltaSink>,
    on_document: &mut Option<DeltaSink>,
) {
    match event {
        ChannelEvent::ThinkingDelta { content } => {
            thinking_text.push_str(&content);
            if let Some(sink) = on_thinking {
                sink(&content);
            }
        }
        ChannelEvent::DocumentDelta { content } => {
            document_text.push_str(&content);
            if let Some(sink) = on_document {
                sink(&content);
            }
        }
    }
}

/// Build the chat completion request body.
fn build_request_body(request: &StreamRequest) -> serde_json::Value {
    serde_json::json!({
        "model": request.model,
        "messages": [
            { "role": "system", "content": request.system_prompt },
            { "role": "user", "content": request.user_prompt },
        ],
        "max_tokens": request.max_tokens,
        "temperature": request.temperature,
        "stream": true,
    })
}

/// Translate a non-2xx completion response into a client error.
///
/// LM Studio reports an unloaded model with `error.code == "model_not_found"`;
/// everything else becomes an API error carrying the server's message when
/// available, otherwise the raw body or a bare status line.
fn parse_error_body(status: u16, body: &str, model: &str) -> StudioError {
    if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(body) {
        if parsed["error"]["code"].as_str() == Some("model_not_found") {
            return StudioError::ModelNotLoaded {
                model: model.to_string(),
            };
        }
        if let Some(message) = parsed["error"]["message"].as_str() {
            return StudioError::Api {
                status,
                message: message.to_string(),
            };
        }
    }
    StudioError::Api {
        status,
        message: if body.is_empty() {
            format!("HTTP {}", status)
        } else {
            body.to_string()
        },
    }
}

/// Result returned for every cancellation exit.
///
/// Text fields are intentionally empty; sinks already saw partial content.
fn cancelled_result() -> StreamResult {
    StreamResult {
        thinking_text: String::new(),
        document_text: String::new(),
        finish_reason: Some(FinishReason::Cancelled),
        cancelled: true,
    }
}

/// Streaming chunk in the OpenAI-compatible wire format
#[derive(Debug, Deserialize)]
struct CompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Option<ChunkDelta>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Response shape of the models endpoint
#[derive(Debug, Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    data: Vec<ModelDescriptor>,
}
