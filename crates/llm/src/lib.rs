//! JobDeck LLM
//!
//! Streaming client for a locally running LM Studio server. Decodes the
//! server's SSE chat-completion stream incrementally and routes every delta
//! into a thinking channel or a document channel, so callers can show the
//! model's reasoning separately from the document it produces.
//!
//! Also includes prompt construction for job extraction and document
//! generation, per-stream cancellation, and the HTTP client factory.

pub mod classifier;
pub mod http_client;
pub mod lm_studio;
pub mod prompt;
pub mod registry;
pub mod sse;
pub mod types;

// Re-export main types
pub use classifier::DeltaClassifier;
pub use http_client::build_http_client;
pub use lm_studio::LmStudioClient;
pub use prompt::{document_prompts, extraction_prompts, DocumentKind, PromptPair};
pub use registry::StreamRegistry;
pub use sse::{SseFrame, SseFrameDecoder};
pub use types::*;
