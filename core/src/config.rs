//! Transport configuration for signaling requests.
//!
//! # Design
//! Every value the room-server exchange used to hardcode (the `origin`
//! header, the connect/read timeout, the TLS trust policy) lives here with
//! a documented default. `#[serde(default)]` lets a config document name only
//! the fields it overrides.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Origin sent to the AppRTC-compatible room server.
pub const DEFAULT_ORIGIN: &str = "https://appr.tc";

/// Connect and read timeout, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 8000;

/// Content type used when a body is attached without an explicit type.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

pub const DEFAULT_MAX_REDIRECTS: u32 = 10;

/// How server certificates are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustPolicy {
    /// Accept any certificate and any hostname. Sandbox use only.
    TrustAll,
    /// Validate certificates against the bundled web PKI roots.
    Verify,
}

/// Settings for one transport context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Value of the `origin` request header.
    pub origin: String,

    /// Applied separately to connect and to response read.
    pub timeout_ms: u64,

    /// Optional bound on the whole request, from connect to last body byte.
    pub deadline_ms: Option<u64>,

    pub trust: TrustPolicy,

    pub max_redirects: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            deadline_ms: None,
            trust: TrustPolicy::TrustAll,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl HttpConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: HttpConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.deadline_ms == Some(0) {
            return Err(ConfigError::ZeroDeadline);
        }
        if self.origin.trim().is_empty() {
            return Err(ConfigError::EmptyOrigin);
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }
}
