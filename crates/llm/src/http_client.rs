//! HTTP Client Factory
//!
//! Builds the reqwest client used for all LM Studio calls.

/// Build a `reqwest::Client` for talking to the local server.
///
/// No request timeout is set: local model warm-up can be arbitrarily slow,
/// and callers bound long generations with `cancel_stream` instead. Proxies
/// are explicitly disabled (ignoring env vars) since the server is reached
/// over loopback.
pub fn build_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("failed to build reqwest client")
}
