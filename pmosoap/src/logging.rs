//! Wire-level diagnostics
//!
//! A [`WireLogger`] sees the exact bytes sent and received by a client.
//! It replaces a global verbosity switch: install one on the client that
//! needs it.

use ureq::http::StatusCode;

/// Sink receiving raw request and response bodies
pub trait WireLogger: Send + Sync {
    fn on_request(&self, endpoint: &str, action: &str, body: &[u8]);

    fn on_response(&self, status: StatusCode, body: &[u8]);
}

/// Logs raw bodies through `tracing` at `DEBUG` level, target `pmosoap::wire`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingWireLogger;

impl WireLogger for TracingWireLogger {
    fn on_request(&self, endpoint: &str, action: &str, body: &[u8]) {
        tracing::debug!(
            target: "pmosoap::wire",
            endpoint,
            action,
            body = %String::from_utf8_lossy(body),
            "POST SOAP request"
        );
    }

    fn on_response(&self, status: StatusCode, body: &[u8]) {
        if body.is_empty() {
            tracing::debug!(target: "pmosoap::wire", status = status.as_u16(), "empty response");
            return;
        }
        tracing::debug!(
            target: "pmosoap::wire",
            status = status.as_u16(),
            body = %String::from_utf8_lossy(body),
            "SOAP response"
        );
    }
}
