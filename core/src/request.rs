//! Single-shot asynchronous request.
//!
//! # Design
//! `AsyncRequest` moves through `Created → Sent → {Completed | Failed}`.
//! `send()` hands the callback, the built wire request and the transport to
//! one named worker thread and returns at once; the worker owns the
//! connection for its whole life and ends by calling exactly one of the two
//! callbacks. Because the callback is moved out on the first `send()`, a second
//! call finds nothing to hand over and fails with `AlreadySent`.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;

use crate::config::HttpConfig;
use crate::error::{HttpError, RequestError};
use crate::events::HttpEvents;
use crate::http::RequestDescriptor;
use crate::transport::Transport;

const WORKER_NAME: &str = "signal-http";

/// Lifecycle of an `AsyncRequest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RequestState {
    Created = 0,
    Sent = 1,
    Completed = 2,
    Failed = 3,
}

impl RequestState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => RequestState::Created,
            1 => RequestState::Sent,
            2 => RequestState::Completed,
            _ => RequestState::Failed,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RequestState::Completed | RequestState::Failed)
    }
}

/// One HTTP(S) request to the room server, reported through `HttpEvents`.
pub struct AsyncRequest {
    descriptor: RequestDescriptor,
    config: HttpConfig,
    transport: Option<Transport>,
    events: Option<Box<dyn HttpEvents>>,
    state: Arc<AtomicU8>,
}

impl AsyncRequest {
    /// Describe a request. No I/O happens until `send()`.
    pub fn new(
        method: &str,
        url: &str,
        body: Option<&str>,
        events: impl HttpEvents,
    ) -> Result<Self, RequestError> {
        Ok(Self {
            descriptor: RequestDescriptor::new(method, url, body)?,
            config: HttpConfig::default(),
            transport: None,
            events: Some(Box::new(events)),
            state: Arc::new(AtomicU8::new(RequestState::Created as u8)),
        })
    }

    /// Replace the default config. Ignored for TLS and timeouts when a
    /// transport is injected, which carries its own.
    pub fn with_config(mut self, config: HttpConfig) -> Self {
        self.config = config;
        self
    }

    /// Run through an existing transport context instead of building one.
    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn set_content_type(&mut self, content_type: &str) -> Result<(), RequestError> {
        if self.state() != RequestState::Created {
            return Err(RequestError::AlreadySent);
        }
        self.descriptor.set_content_type(content_type);
        Ok(())
    }

    pub fn descriptor(&self) -> &RequestDescriptor {
        &self.descriptor
    }

    /// Current lifecycle state.
    ///
    /// The worker records `Completed` or `Failed` before it invokes the
    /// callback, so any code that runs after the callback (or after receiving
    /// its `Completion`) sees a terminal state. Polling without waiting for
    /// the callback may see the terminal state slightly before the callback
    /// has finished.
    pub fn state(&self) -> RequestState {
        RequestState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Start the request on a background thread and return immediately.
    ///
    /// The outcome arrives through the callback given to `new`. Returns
    /// `AlreadySent` on any call after the first. If the worker cannot be
    /// spawned the request is marked failed and no callback fires.
    pub fn send(&mut self) -> Result<(), RequestError> {
        self.config.validate()?;
        let Some(events) = self.events.take() else {
            return Err(RequestError::AlreadySent);
        };

        let request = self.descriptor.build(&self.config);
        let transport = self.transport.take();
        let config = self.config.clone();
        let state = Arc::clone(&self.state);
        self.state.store(RequestState::Sent as u8, Ordering::Release);

        tracing::debug!(method = %request.method, url = %request.url, "sending request");

        let spawned = thread::Builder::new()
            .name(WORKER_NAME.to_string())
            .spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    let transport = transport.unwrap_or_else(|| Transport::new(&config));
                    transport.execute(&request)
                }))
                .unwrap_or_else(|_| {
                    Err(HttpError::Transport {
                        method: request.method.clone(),
                        url: request.url.clone(),
                        detail: "request worker panicked".to_string(),
                    })
                });
                deliver(&*events, &state, &request.method, &request.url, outcome);
            });

        if let Err(e) = spawned {
            self.state.store(RequestState::Failed as u8, Ordering::Release);
            return Err(RequestError::Spawn(e));
        }
        Ok(())
    }
}

/// Record the terminal state, then fire the single callback.
///
/// State goes first so observers woken by the callback never see `Sent`.
fn deliver(
    events: &dyn HttpEvents,
    state: &AtomicU8,
    method: &str,
    url: &str,
    outcome: Result<String, HttpError>,
) {
    match outcome {
        Ok(body) => {
            tracing::debug!(method, url, bytes = body.len(), "request complete");
            state.store(RequestState::Completed as u8, Ordering::Release);
            events.on_http_complete(body);
        }
        Err(err) => {
            if let HttpError::NonSuccessStatus { status, .. } = &err {
                tracing::warn!(method, url, status, "non-200 response");
            } else {
                tracing::debug!(method, url, error = %err, "request failed");
            }
            state.store(RequestState::Failed as u8, Ordering::Release);
            events.on_http_error(err.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    use crate::events::Completion;

    fn unreachable_url() -> String {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        format!("http://127.0.0.1:{port}/params")
    }

    #[test]
    fn new_request_starts_created() {
        let (tx, _rx) = mpsc::channel::<Completion>();
        let req = AsyncRequest::new("GET", "http://localhost/params", None, tx).unwrap();
        assert_eq!(req.state(), RequestState::Created);
        assert_eq!(req.descriptor().method(), "GET");
    }

    #[test]
    fn invalid_arguments_are_rejected_up_front() {
        let (tx, _rx) = mpsc::channel::<Completion>();
        let err = AsyncRequest::new("", "http://localhost", None, tx.clone())
            .err()
            .unwrap();
        assert!(matches!(err, RequestError::EmptyMethod));
        let err = AsyncRequest::new("GET", "", None, tx).err().unwrap();
        assert!(matches!(err, RequestError::EmptyUrl));
    }

    #[test]
    fn second_send_fails_deterministically() {
        let (tx, rx) = mpsc::channel::<Completion>();
        let mut req = AsyncRequest::new("GET", &unreachable_url(), None, tx).unwrap();
        req.send().unwrap();
        assert!(matches!(req.send(), Err(RequestError::AlreadySent)));

        let completion = rx.recv_timeout(Duration::from_secs(10)).unwrap();
        assert!(!completion.is_complete());
        // The callback is dropped after its single use, closing the channel.
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn content_type_is_frozen_after_send() {
        let (tx, rx) = mpsc::channel::<Completion>();
        let mut req = AsyncRequest::new("POST", &unreachable_url(), Some("x"), tx).unwrap();
        req.set_content_type("application/json").unwrap();
        req.send().unwrap();
        assert!(matches!(
            req.set_content_type("text/html"),
            Err(RequestError::AlreadySent)
        ));
        assert_eq!(req.descriptor().content_type(), "application/json");
        rx.recv_timeout(Duration::from_secs(10)).unwrap();
    }

    #[test]
    fn invalid_config_keeps_request_sendable() {
        let (tx, _rx) = mpsc::channel::<Completion>();
        let bad = HttpConfig {
            timeout_ms: 0,
            ..HttpConfig::default()
        };
        let mut req = AsyncRequest::new("GET", "http://localhost", None, tx)
            .unwrap()
            .with_config(bad);
        assert!(matches!(req.send(), Err(RequestError::InvalidConfig(_))));
        assert_eq!(req.state(), RequestState::Created);
        // The callback was not consumed, so a retry fails for the same reason.
        assert!(matches!(req.send(), Err(RequestError::InvalidConfig(_))));
    }

    #[test]
    fn terminal_state_is_visible_as_soon_as_the_callback_ran() {
        for _ in 0..20 {
            let (tx, rx) = mpsc::channel::<Completion>();
            let mut req = AsyncRequest::new("GET", &unreachable_url(), None, tx).unwrap();
            req.send().unwrap();
            rx.recv_timeout(Duration::from_secs(10)).unwrap();
            assert_eq!(req.state(), RequestState::Failed);
        }
    }

    #[test]
    fn failure_moves_state_to_failed() {
        let (tx, rx) = mpsc::channel::<Completion>();
        let mut req = AsyncRequest::new("GET", &unreachable_url(), None, tx).unwrap();
        req.send().unwrap();
        let completion = rx.recv_timeout(Duration::from_secs(10)).unwrap();
        assert!(matches!(completion, Completion::Error(ref m) if m.contains(" error: ")));
        assert_eq!(req.state(), RequestState::Failed);
        assert!(req.state().is_terminal());
    }

    struct ThreadName(mpsc::Sender<Option<String>>);

    impl HttpEvents for ThreadName {
        fn on_http_complete(&self, _response: String) {
            let _ = self.0.send(thread::current().name().map(str::to_string));
        }

        fn on_http_error(&self, _message: String) {
            let _ = self.0.send(thread::current().name().map(str::to_string));
        }
    }

    #[test]
    fn callback_runs_on_worker_thread() {
        let (tx, rx) = mpsc::channel::<Option<String>>();
        let mut req = AsyncRequest::new("GET", &unreachable_url(), None, ThreadName(tx)).unwrap();
        req.send().unwrap();
        let name = rx.recv_timeout(Duration::from_secs(10)).unwrap();
        assert_eq!(name.as_deref(), Some(WORKER_NAME));
    }
}
