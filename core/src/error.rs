//! Error types for signaling requests.
//!
//! # Design
//! Two families with different delivery paths. `HttpError` is what a sent
//! request can end in; it only ever reaches the caller through
//! `HttpEvents::on_http_error`, and its `Display` output is that message
//! verbatim. `RequestError` is returned synchronously from construction and
//! `send()` for misuse the caller can act on immediately.

use thiserror::Error;

/// Terminal failure of a sent request.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Connect, response read or overall deadline elapsed.
    #[error("HTTP {method} to {url} timeout")]
    Timeout { method: String, url: String },

    /// The TLS context could not be set up (missing algorithm or key material).
    #[error("HTTP {method} to {url} no such algorithm: {detail}")]
    TlsSetup {
        method: String,
        url: String,
        detail: String,
    },

    /// Any other I/O failure: DNS, refused or reset connection, bad response.
    #[error("HTTP {method} to {url} error: {detail}")]
    Transport {
        method: String,
        url: String,
        detail: String,
    },

    /// The server answered with something other than 200. The body is not read.
    #[error("Non-200 response to {method} to URL: {url} : {status_line}")]
    NonSuccessStatus {
        method: String,
        url: String,
        status: u16,
        status_line: String,
    },
}

impl HttpError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, HttpError::Timeout { .. })
    }
}

/// Errors returned synchronously by `AsyncRequest`.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request method is empty")]
    EmptyMethod,

    #[error("invalid request method: {0:?}")]
    InvalidMethod(String),

    #[error("request url is empty")]
    EmptyUrl,

    /// `send()` already ran; a request is single-shot.
    #[error("request was already sent")]
    AlreadySent,

    /// The background worker thread could not be started. No callback fires.
    #[error("failed to spawn request worker: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("invalid transport config: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// Errors raised while loading or validating an `HttpConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse failed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("timeout_ms must be greater than zero")]
    ZeroTimeout,

    #[error("deadline_ms must be greater than zero when set")]
    ZeroDeadline,

    #[error("origin must not be empty")]
    EmptyOrigin,
}
