//! Blocking HTTP transport context.
//!
//! # Design
//! A `Transport` owns one `ureq::Agent` configured from an `HttpConfig`,
//! including its TLS trust policy. The policy lives in the agent and nowhere
//! else, so a trust-all transport never changes how any other connection in
//! the process verifies certificates. Clones share the agent, which lets one
//! context serve several requests from the same signaling client.

use std::io;

use ureq::http::{self, Method, StatusCode};
use ureq::tls::TlsConfig;

use crate::config::{HttpConfig, TrustPolicy};
use crate::error::HttpError;
use crate::http::HttpRequest;

#[derive(Clone)]
pub struct Transport {
    agent: ureq::Agent,
    trust: TrustPolicy,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport").field("trust", &self.trust).finish()
    }
}

impl Transport {
    pub fn new(config: &HttpConfig) -> Self {
        let tls = match config.trust {
            TrustPolicy::TrustAll => {
                tracing::warn!(
                    origin = %config.origin,
                    "building trust-all TLS transport: server certificates and hostnames are NOT verified"
                );
                TlsConfig::builder().disable_verification(true).build()
            }
            TrustPolicy::Verify => TlsConfig::builder().build(),
        };

        let timeout = Some(config.timeout());
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_connect(timeout)
            .timeout_recv_response(timeout)
            .timeout_recv_body(timeout)
            .timeout_global(config.deadline())
            .max_redirects(config.max_redirects)
            .allow_non_standard_methods(true)
            .tls_config(tls)
            .build()
            .new_agent();

        Self {
            agent,
            trust: config.trust,
        }
    }

    pub fn trust(&self) -> TrustPolicy {
        self.trust
    }

    /// Run one request to completion and return the drained body.
    ///
    /// Only a 200 answer is a success. Any other status ends the exchange
    /// without reading the body. A 200 body is drained whatever its size and
    /// decoded lossily, so malformed UTF-8 becomes U+FFFD instead of an error.
    pub fn execute(&self, request: &HttpRequest) -> Result<String, HttpError> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|e| transport_failure(request, e.to_string()))?;

        let mut builder = http::Request::builder().method(method).uri(request.url.as_str());
        for (name, value) in &request.headers {
            // ureq derives content-length from the body it sends.
            if name.eq_ignore_ascii_case("content-length") {
                continue;
            }
            builder = builder.header(name.as_str(), value.as_str());
        }

        let sent = match &request.body {
            Some(body) => {
                let req = builder
                    .body(body.as_bytes())
                    .map_err(|e| transport_failure(request, e.to_string()))?;
                self.agent.run(req)
            }
            None => {
                let req = builder
                    .body(())
                    .map_err(|e| transport_failure(request, e.to_string()))?;
                self.agent.run(req)
            }
        };
        let mut response = sent.map_err(|e| classify(request, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(HttpError::NonSuccessStatus {
                method: request.method.clone(),
                url: request.url.clone(),
                status: status.as_u16(),
                status_line: format!("{:?} {}", response.version(), status),
            });
        }

        let bytes = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(|e| classify(request, e))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn transport_failure(request: &HttpRequest, detail: String) -> HttpError {
    HttpError::Transport {
        method: request.method.clone(),
        url: request.url.clone(),
        detail,
    }
}

/// Map a ureq failure onto the request error taxonomy.
fn classify(request: &HttpRequest, err: ureq::Error) -> HttpError {
    match err {
        ureq::Error::Timeout(_) => HttpError::Timeout {
            method: request.method.clone(),
            url: request.url.clone(),
        },
        ureq::Error::Io(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
            HttpError::Timeout {
                method: request.method.clone(),
                url: request.url.clone(),
            }
        }
        ureq::Error::Tls(detail) => HttpError::TlsSetup {
            method: request.method.clone(),
            url: request.url.clone(),
            detail: detail.to_string(),
        },
        other => transport_failure(request, other.to_string()),
    }
}
