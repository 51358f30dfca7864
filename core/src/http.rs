//! Request descriptor and the wire request derived from it.
//!
//! # Design
//! `RequestDescriptor` is what the caller asks for. `HttpRequest` is what
//! actually goes on the wire once a config is applied: the header list, and
//! the body only if the method may carry one. Building it is pure, so the
//! header and body rules are testable without a socket; `Transport` then
//! executes the plan verbatim.

use ureq::http::Method;

use crate::config::{HttpConfig, DEFAULT_CONTENT_TYPE};
use crate::error::RequestError;

/// Immutable description of one signaling request.
///
/// The method is kept as the caller's string so verbs other than GET and
/// POST pass through, but it must be a valid HTTP token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    method: String,
    url: String,
    body: Option<String>,
    content_type: Option<String>,
}

impl RequestDescriptor {
    pub fn new(method: &str, url: &str, body: Option<&str>) -> Result<Self, RequestError> {
        if method.is_empty() {
            return Err(RequestError::EmptyMethod);
        }
        if Method::from_bytes(method.as_bytes()).is_err() {
            return Err(RequestError::InvalidMethod(method.to_string()));
        }
        if url.trim().is_empty() {
            return Err(RequestError::EmptyUrl);
        }
        Ok(Self {
            method: method.to_string(),
            url: url.to_string(),
            body: body.map(str::to_string),
            content_type: None,
        })
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn set_content_type(&mut self, content_type: &str) {
        self.content_type = Some(content_type.to_string());
    }

    /// The supplied content type, or `text/plain; charset=utf-8`.
    pub fn content_type(&self) -> &str {
        self.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE)
    }

    /// GET and HEAD never carry a body, whatever was supplied.
    pub fn method_allows_body(&self) -> bool {
        !(self.method.eq_ignore_ascii_case("GET") || self.method.eq_ignore_ascii_case("HEAD"))
    }

    /// Produce the wire request for this descriptor under `config`.
    pub fn build(&self, config: &HttpConfig) -> HttpRequest {
        let mut headers = vec![
            ("origin".to_string(), config.origin.clone()),
            ("cache-control".to_string(), "no-cache".to_string()),
        ];

        let body = if self.method_allows_body() {
            self.body.clone()
        } else {
            None
        };
        if let Some(body) = &body {
            headers.push(("content-type".to_string(), self.content_type().to_string()));
            headers.push(("content-length".to_string(), body.len().to_string()));
        }

        HttpRequest {
            method: self.method.clone(),
            url: self.url.clone(),
            headers,
            body,
        }
    }
}

/// An HTTP request described as plain data, ready for `Transport::execute`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
