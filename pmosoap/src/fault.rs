//! SOAP Faults

use std::fmt;

/// Protocol-level error carried in a SOAP `Body`
///
/// A `Fault` is only ever built from a response envelope. It is an error
/// value on its own, so callers can propagate it with `?` or match on
/// [`Fault::code`] without downcasting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("SOAP fault {fault_code}: {fault_string}")]
pub struct Fault {
    /// Qualified fault code as sent by the server (ex: "soap:Client")
    pub fault_code: String,

    /// Human readable description
    pub fault_string: String,

    /// URI of the node that raised the fault, if given
    pub fault_actor: Option<String>,

    /// Raw XML content of the `detail` element, if given
    pub detail: Option<String>,
}

/// Semantic category of a fault, taken from the local part of its code
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FaultCode {
    VersionMismatch,
    MustUnderstand,
    /// The request was at fault (SOAP 1.2 `Sender`)
    Client,
    /// The server failed to process a valid request (SOAP 1.2 `Receiver`)
    Server,
    Other(String),
}

impl FaultCode {
    /// Classify a qualified code such as `soap:Client` or `env:Receiver`
    pub fn from_qname(code: &str) -> Self {
        let local = code.trim().rsplit(':').next().unwrap_or_default();
        match local {
            "VersionMismatch" => FaultCode::VersionMismatch,
            "MustUnderstand" => FaultCode::MustUnderstand,
            "Client" | "Sender" => FaultCode::Client,
            "Server" | "Receiver" => FaultCode::Server,
            other => FaultCode::Other(other.to_string()),
        }
    }
}

impl fmt::Display for FaultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultCode::VersionMismatch => f.write_str("VersionMismatch"),
            FaultCode::MustUnderstand => f.write_str("MustUnderstand"),
            FaultCode::Client => f.write_str("Client"),
            FaultCode::Server => f.write_str("Server"),
            FaultCode::Other(code) => f.write_str(code),
        }
    }
}

impl Fault {
    /// Build a fault from its code and reason
    pub fn new(fault_code: impl Into<String>, fault_string: impl Into<String>) -> Self {
        Self {
            fault_code: fault_code.into(),
            fault_string: fault_string.into(),
            fault_actor: None,
            detail: None,
        }
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.fault_actor = Some(actor.into());
        self
    }

    /// Attach raw XML detail content
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Semantic category of this fault
    pub fn code(&self) -> FaultCode {
        FaultCode::from_qname(&self.fault_code)
    }

    pub fn is_client(&self) -> bool {
        self.code() == FaultCode::Client
    }

    pub fn is_server(&self) -> bool {
        self.code() == FaultCode::Server
    }
}
