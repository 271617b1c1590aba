//! HTTP transports
//!
//! The client hands a fully built request to a [`Transport`] and gets back
//! the response with its body already read. The underlying reader must be
//! released before `execute` returns, whatever the outcome.

use crate::config::{ClientConfig, DEFAULT_MAX_RESPONSE_BYTES};
use crate::error::Result;
use std::fmt;
use std::time::Duration;
use ureq::Agent;
use ureq::http::{Request, Response};

/// Executes one HTTP exchange
pub trait Transport: Send + Sync {
    fn execute(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>>;
}

impl<F> Transport for F
where
    F: Fn(Request<Vec<u8>>) -> Result<Response<Vec<u8>>> + Send + Sync,
{
    fn execute(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>> {
        self(request)
    }
}

/// Default transport: a blocking `ureq` agent
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
    max_response_bytes: u64,
}

impl UreqTransport {
    /// Build an agent with the given connect timeout and no global timeout
    pub fn new(dial_timeout: Duration) -> Self {
        Self::with_timeouts(dial_timeout, None, DEFAULT_MAX_RESPONSE_BYTES)
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::with_timeouts(
            config.dial_timeout(),
            config.request_timeout(),
            config.max_response_bytes,
        )
    }

    /// Build an agent with explicit connect and whole-call timeouts
    pub fn with_timeouts(
        dial_timeout: Duration,
        request_timeout: Option<Duration>,
        max_response_bytes: u64,
    ) -> Self {
        // SOAP faults come back as HTTP 500: status codes must not become
        // errors or the fault body would be lost.
        let agent: Agent = Agent::config_builder()
            .timeout_connect(Some(dial_timeout))
            .timeout_global(request_timeout)
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            max_response_bytes,
        }
    }

    /// Reuse an existing agent (shared pool, proxy, TLS settings...)
    ///
    /// HTTP status codes never become errors, whatever the agent's own
    /// configuration says.
    pub fn with_agent(agent: Agent, max_response_bytes: u64) -> Self {
        Self {
            agent,
            max_response_bytes,
        }
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport")
            .field("max_response_bytes", &self.max_response_bytes)
            .finish_non_exhaustive()
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::from_config(&ClientConfig::default())
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>> {
        let (parts, payload) = request.into_parts();
        // Agents passed to `with_agent` may still turn statuses into errors:
        // SOAP faults come back as HTTP 500 and their body must be read.
        let request = self
            .agent
            .configure_request(Request::from_parts(parts, payload.as_slice()))
            .http_status_as_error(false)
            .build();
        let response = self.agent.run(request)?;
        let (parts, mut body) = response.into_parts();

        let bytes = body
            .with_config()
            .limit(self.max_response_bytes)
            .read_to_vec()?;

        Ok(Response::from_parts(parts, bytes))
    }
}
