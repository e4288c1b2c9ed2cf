//! Shared HTTP Client Module
//!
//! Provides a global, lazy-initialized HTTP client with connection pooling for
//! generation calls, plus a builder for callers that need their own timeout.
//!
//! Timeouts are the transport's only; the pipeline adds none of its own.

use once_cell::sync::Lazy;
use reqwest::Client;
use std::time::Duration;

/// Default transport timeout for generation round trips
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Global HTTP client for generation calls
///
/// Deck generation is one long non-streaming request, so the timeout is generous.
pub static GENERATION_CLIENT: Lazy<Client> = Lazy::new(|| {
    build_client(DEFAULT_TIMEOUT_SECS).expect("Failed to create generation HTTP client")
});

/// Build a pooled client with the given timeout
pub fn build_client(timeout_secs: u64) -> Result<Client, String> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .tcp_nodelay(true)
        .build()
        .map_err(|e| format!("Failed to create HTTP client: {}", e))
}

/// Get the global generation HTTP client
#[inline]
pub fn generation_client() -> &'static Client {
    &GENERATION_CLIENT
}
