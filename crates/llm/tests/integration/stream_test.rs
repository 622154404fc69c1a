//! Streaming Channel Routing Tests
//!
//! Drive full completions through a mock server and check how deltas land
//! in the thinking and document channels.

use std::sync::{Arc, Mutex};

use jobdeck_llm::{FinishReason, StreamRequest};
use wiremock::MockServer;

use crate::support::{client_for, delta_frame, finish_frame, mount_completion, mount_models, sse_body};

#[tokio::test]
async fn test_stream_routes_thinking_and_document() {
    let server = MockServer::start().await;
    mount_models(&server).await;
    mount_completion(
        &server,
        sse_body(&[
            delta_frame("<think>plan the letter"),
            delta_frame("</think>Dear hiring team,"),
            delta_frame(" I am excited to apply."),
            finish_frame("stop"),
        ]),
    )
    .await;

    let client = client_for(&server);
    let thinking_log = Arc::new(Mutex::new(String::new()));
    let document_log = Arc::new(Mutex::new(String::new()));
    let thinking_sink = Arc::clone(&thinking_log);
    let document_sink = Arc::clone(&document_log);

    let request = StreamRequest::from_config(client.config(), "system", "user")
        .with_thinking_sink(move |delta| thinking_sink.lock().unwrap().push_str(delta))
        .with_document_sink(move |delta| document_sink.lock().unwrap().push_str(delta));

    let result = client.stream_completion(request).await.unwrap();

    assert_eq!(result.thinking_text, "plan the letter");
    assert_eq!(result.document_text, "Dear hiring team, I am excited to apply.");
    assert_eq!(result.finish_reason, Some(FinishReason::Stop));
    assert!(!result.cancelled);
    assert_eq!(*thinking_log.lock().unwrap(), "plan the letter");
    assert_eq!(
        *document_log.lock().unwrap(),
        "Dear hiring team, I am excited to apply."
    );
    assert_eq!(client.active_streams(), 0);
}

#[tokio::test]
async fn test_stream_without_thinking_tags_is_all_document() {
    let server = MockServer::start().await;
    mount_models(&server).await;
    mount_completion(
        &server,
        sse_body(&[
            delta_frame("Plain answer, "),
            delta_frame("no reasoning shown."),
            finish_frame("stop"),
        ]),
    )
    .await;

    let client = client_for(&server);
    let request = StreamRequest::from_config(client.config(), "system", "user");
    let result = client.stream_completion(request).await.unwrap();

    assert_eq!(result.thinking_text, "");
    assert_eq!(result.document_text, "Plain answer, no reasoning shown.");
}

#[tokio::test]
async fn test_stream_preserves_multibyte_content() {
    // Accented and CJK text must come through byte for byte, with no
    // replacement characters introduced by the body decode.
    let server = MockServer::start().await;
    mount_models(&server).await;
    mount_completion(
        &server,
        sse_body(&[
            delta_frame("<think>résumé first</think>"),
            delta_frame("Chère équipe, "),
            delta_frame("ありがとう"),
            finish_frame("stop"),
        ]),
    )
    .await;

    let client = client_for(&server);
    let request = StreamRequest::from_config(client.config(), "system", "user");
    let result = client.stream_completion(request).await.unwrap();

    assert_eq!(result.thinking_text, "résumé first");
    assert_eq!(result.document_text, "Chère équipe, ありがとう");
}

#[tokio::test]
async fn test_split_opener_in_first_frame_stays_document() {
    // Channel detection happens on the first non-empty delta. An opening
    // tag split across frames never matches, so everything is document.
    let server = MockServer::start().await;
    mount_models(&server).await;
    mount_completion(
        &server,
        sse_body(&[
            delta_frame("<thi"),
            delta_frame("nk>reason</think>Answer"),
            finish_frame("stop"),
        ]),
    )
    .await;

    let client = client_for(&server);
    let request = StreamRequest::from_config(client.config(), "system", "user");
    let result = client.stream_completion(request).await.unwrap();

    assert_eq!(result.thinking_text, "");
    assert_eq!(result.document_text, "<think>reason</think>Answer");
}

#[tokio::test]
async fn test_split_closer_across_frames() {
    let server = MockServer::start().await;
    mount_models(&server).await;
    mount_completion(
        &server,
        sse_body(&[
            delta_frame("<think>partial"),
            delta_frame("</thi"),
            delta_frame("nk>done"),
            finish_frame("stop"),
        ]),
    )
    .await;

    let client = client_for(&server);
    let thinking_log = Arc::new(Mutex::new(String::new()));
    let thinking_sink = Arc::clone(&thinking_log);

    let request = StreamRequest::from_config(client.config(), "system", "user")
        .with_thinking_sink(move |delta| thinking_sink.lock().unwrap().push_str(delta));
    let result = client.stream_completion(request).await.unwrap();

    // The half closer is held back, never reaching the thinking channel.
    assert_eq!(*thinking_log.lock().unwrap(), "partial");
    assert_eq!(result.thinking_text, "partial");
    assert_eq!(result.document_text, "done");
}

#[tokio::test]
async fn test_result_trims_but_sinks_see_raw_fragments() {
    let server = MockServer::start().await;
    mount_models(&server).await;
    mount_completion(
        &server,
        sse_body(&[
            delta_frame("<think> padded "),
            delta_frame("</think> Doc body "),
            finish_frame("stop"),
        ]),
    )
    .await;

    let client = client_for(&server);
    let thinking_log = Arc::new(Mutex::new(String::new()));
    let document_log = Arc::new(Mutex::new(String::new()));
    let thinking_sink = Arc::clone(&thinking_log);
    let document_sink = Arc::clone(&document_log);

    let request = StreamRequest::from_config(client.config(), "system", "user")
        .with_thinking_sink(move |delta| thinking_sink.lock().unwrap().push_str(delta))
        .with_document_sink(move |delta| document_sink.lock().unwrap().push_str(delta));
    let result = client.stream_completion(request).await.unwrap();

    assert_eq!(*thinking_log.lock().unwrap(), " padded ");
    assert_eq!(*document_log.lock().unwrap(), " Doc body ");
    assert_eq!(result.thinking_text, "padded");
    assert_eq!(result.document_text, "Doc body");
}

#[tokio::test]
async fn test_stream_reports_length_truncation() {
    let server = MockServer::start().await;
    mount_models(&server).await;
    mount_completion(
        &server,
        sse_body(&[
            delta_frame("The first half of a docum"),
            finish_frame("length"),
        ]),
    )
    .await;

    let client = client_for(&server);
    let request = StreamRequest::from_config(client.config(), "system", "user");
    let result = client.stream_completion(request).await.unwrap();

    assert_eq!(result.document_text, "The first half of a docum");
    assert_eq!(result.finish_reason, Some(FinishReason::Length));
    assert!(!result.cancelled);
}

#[tokio::test]
async fn test_malformed_frames_are_skipped() {
    let server = MockServer::start().await;
    mount_models(&server).await;
    mount_completion(
        &server,
        sse_body(&[
            delta_frame("Hello"),
            "{not valid json".to_string(),
            delta_frame(" world"),
            finish_frame("stop"),
        ]),
    )
    .await;

    let client = client_for(&server);
    let request = StreamRequest::from_config(client.config(), "system", "user");
    let result = client.stream_completion(request).await.unwrap();

    assert_eq!(result.document_text, "Hello world");
    assert_eq!(result.finish_reason, Some(FinishReason::Stop));
}
