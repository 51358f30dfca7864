//! Completion delivery for sent requests.
//!
//! # Design
//! `HttpEvents` is the callback pair a caller hands to `AsyncRequest`.
//! Exactly one of the two methods is called, once, from the request's worker
//! thread. Callers that prefer a value over a callback can pass an
//! `mpsc::Sender<Completion>` and receive the outcome on the other end.

use std::sync::mpsc::Sender;

/// Callbacks for the outcome of one request.
pub trait HttpEvents: Send + 'static {
    /// The server answered 200; `response` is the full body.
    fn on_http_complete(&self, response: String);

    /// The request failed; `message` names the method and URL.
    fn on_http_error(&self, message: String);
}

/// Outcome of one request as a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Complete(String),
    Error(String),
}

impl Completion {
    pub fn is_complete(&self) -> bool {
        matches!(self, Completion::Complete(_))
    }

    pub fn into_result(self) -> Result<String, String> {
        match self {
            Completion::Complete(body) => Ok(body),
            Completion::Error(message) => Err(message),
        }
    }
}

impl HttpEvents for Sender<Completion> {
    fn on_http_complete(&self, response: String) {
        // A dropped receiver means nobody is waiting any more.
        let _ = self.send(Completion::Complete(response));
    }

    fn on_http_error(&self, message: String) {
        let _ = self.send(Completion::Error(message));
    }
}
