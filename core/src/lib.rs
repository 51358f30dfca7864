//! One-shot asynchronous HTTP(S) requests for a WebRTC signaling client.
//!
//! # Overview
//! `AsyncRequest` sends a single GET/POST (or any other verb) to the room
//! server on a background thread and reports the outcome exactly once
//! through `HttpEvents`, never blocking the thread that called `send()`.
//!
//! # Design
//! - `RequestDescriptor::build` turns what the caller asked for into a plain
//!   `HttpRequest` (headers, body rules) without touching the network.
//! - `Transport` executes that plan with its own TLS trust policy and
//!   timeouts; no process-wide TLS state is modified.
//! - Failures are classified into `HttpError` and delivered as text through
//!   `on_http_error`; misuse (`AlreadySent`, bad arguments) is returned
//!   synchronously as `RequestError`.

pub mod config;
pub mod error;
pub mod events;
pub mod http;
pub mod request;
pub mod transport;

pub use config::{HttpConfig, TrustPolicy, DEFAULT_CONTENT_TYPE, DEFAULT_ORIGIN, DEFAULT_TIMEOUT_MS};
pub use error::{ConfigError, HttpError, RequestError};
pub use events::{Completion, HttpEvents};
pub use http::{HttpRequest, RequestDescriptor};
pub use request::{AsyncRequest, RequestState};
pub use transport::Transport;
