//! LLM provider client for Parlor.
//!
//! Parlor talks to any endpoint that implements the OpenAI
//! `/chat/completions` contract (OpenAI itself, Azure-style gateways, local
//! servers such as Ollama or LM Studio). Requests are non-streaming: the REPL
//! waits for the whole reply, then splits it into text and code turns.
//!
//! # Error Handling
//!
//! Every failure is a [`ProviderError`]. Non-2xx responses keep a capped
//! copy of the body so the caller can show the provider's own message.

mod chat;

use std::time::Duration;

pub use chat::{ChatClient, ChatMessage, DEFAULT_BASE_URL, ProviderError};

const CONNECT_TIMEOUT_SECS: u64 = 30;
const TCP_KEEPALIVE_SECS: u64 = 60;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

/// Shared client settings. Plain-HTTP endpoints stay allowed so local model
/// servers work; redirects are never followed so credentials can't leak.
fn base_client_builder() -> reqwest::ClientBuilder {
    use reqwest::header::{HeaderMap, HeaderValue};

    let mut default_headers = HeaderMap::new();
    default_headers.insert(
        "X-Parlor-OS",
        HeaderValue::from_static(std::env::consts::OS),
    );

    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::none())
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
        .default_headers(default_headers)
}

pub fn http_client_with_timeout(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    base_client_builder().timeout(timeout).build()
}
