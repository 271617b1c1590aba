//! Client configuration
//!
//! All knobs have documented defaults and are fixed once a client is built.
//! A configuration can be read from YAML and adjusted from environment
//! variables prefixed with `PMOSOAP_CONFIG__`:
//!
//! ```yaml
//! dial_timeout_secs: 10
//! request_timeout_secs: 60
//! user_agent: my-app/1.0
//! verbose: true
//! ```

use crate::error::{Result, SoapError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use std::{env, fs};
use tracing::debug;

/// Default connect timeout
pub const DEFAULT_DIAL_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent header
pub const DEFAULT_USER_AGENT: &str = "go-soap-0.1";

/// Default cap on response body size (10 MiB)
pub const DEFAULT_MAX_RESPONSE_BYTES: u64 = 10 * 1024 * 1024;

/// Prefix of the environment variables read by [`ClientConfig::apply_env_overrides`]
pub const ENV_PREFIX: &str = "PMOSOAP_CONFIG__";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Connect timeout used by the default transport
    pub dial_timeout_secs: u64,

    /// Whole-call timeout used by the default transport (none by default)
    pub request_timeout_secs: Option<u64>,

    pub user_agent: String,

    /// Log raw request and response bodies through `tracing`
    pub verbose: bool,

    pub max_response_bytes: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            dial_timeout_secs: DEFAULT_DIAL_TIMEOUT_SECS,
            request_timeout_secs: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            verbose: false,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }
}

impl ClientConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path)
            .map_err(|e| SoapError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_yaml_str(&yaml)
    }

    pub fn dial_timeout(&self) -> Duration {
        Duration::from_secs(self.dial_timeout_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Override fields from `PMOSOAP_CONFIG__*` environment variables
    pub fn apply_env_overrides(self) -> Result<Self> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// Override fields from a key lookup
    ///
    /// Keys are `PMOSOAP_CONFIG__DIAL_TIMEOUT_SECS`, `..REQUEST_TIMEOUT_SECS`,
    /// `..USER_AGENT`, `..VERBOSE` and `..MAX_RESPONSE_BYTES`.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            let key = format!("{ENV_PREFIX}{name}");
            lookup(&key).map(|value| {
                debug!(key = key.as_str(), value = value.as_str(), "SOAP config override");
                (key, value)
            })
        };

        if let Some((key, value)) = get("DIAL_TIMEOUT_SECS") {
            self.dial_timeout_secs = parse_value(&key, &value)?;
        }
        if let Some((key, value)) = get("REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = if value.trim().is_empty() {
                None
            } else {
                Some(parse_value(&key, &value)?)
            };
        }
        if let Some((_, value)) = get("USER_AGENT") {
            self.user_agent = value;
        }
        if let Some((key, value)) = get("VERBOSE") {
            self.verbose = parse_value(&key, &value)?;
        }
        if let Some((key, value)) = get("MAX_RESPONSE_BYTES") {
            self.max_response_bytes = parse_value(&key, &value)?;
        }

        Ok(self)
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| SoapError::Config(format!("invalid value '{value}' for {key}: {e}")))
}
