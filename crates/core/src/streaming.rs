//! Stream Channel Events
//!
//! Event types for model output that has been routed into separate thinking
//! and document channels. Shared between the LLM crate (which produces them)
//! and UI-facing code (which renders them).

use serde::{Deserialize, Serialize};

/// One routed fragment of streamed model output.
///
/// Reasoning text and answer text are kept on distinct channels so callers
/// can render them independently while the stream is still arriving.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChannelEvent {
    /// Reasoning text routed to the thinking channel
    ThinkingDelta { content: String },

    /// Answer text routed to the document channel
    DocumentDelta { content: String },
}

impl ChannelEvent {
    /// The text fragment carried by this event.
    pub fn content(&self) -> &str {
        match self {
            ChannelEvent::ThinkingDelta { content } => content,
            ChannelEvent::DocumentDelta { content } => content,
        }
    }
}

/// Callback invoked with each routed text fragment, in arrival order.
pub type DeltaSink = Box<dyn FnMut(&str) + Send>;
