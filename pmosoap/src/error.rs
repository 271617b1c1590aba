//! Error types for SOAP calls

use crate::fault::Fault;
use std::fmt;
use ureq::http::Response;

/// Result type alias for SOAP operations
pub type Result<T> = std::result::Result<T, SoapError>;

/// Boxed error used to carry transport failures from any [`Transport`](crate::Transport)
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur during a SOAP exchange
#[derive(Debug, thiserror::Error)]
pub enum SoapError {
    /// The request payload could not be encoded; nothing was sent
    #[error("SOAP serialization failed: {0}")]
    Serialization(String),

    /// The endpoint address is not a usable URL
    #[error("Invalid SOAP endpoint '{0}': {1}")]
    InvalidEndpoint(String, String),

    /// Request construction or network dispatch failed
    #[error("SOAP transport error: {0}")]
    Transport(#[source] BoxError),

    /// Response bytes were received but are not a valid envelope
    #[error("SOAP deserialization failed: {0}")]
    Deserialization(String),

    /// A well-formed envelope carrying a Fault was received
    #[error("{fault} (HTTP status {})", .response.status())]
    Fault {
        fault: Fault,
        response: Box<Response<Vec<u8>>>,
    },

    /// Client configuration could not be loaded
    #[error("SOAP client configuration error: {0}")]
    Config(String),
}

/// Coarse classification of a [`SoapError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Serialization,
    Transport,
    Deserialization,
    ProtocolFault,
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Serialization => "serialization",
            ErrorKind::Transport => "transport",
            ErrorKind::Deserialization => "deserialization",
            ErrorKind::ProtocolFault => "protocol fault",
            ErrorKind::Config => "configuration",
        };
        f.write_str(name)
    }
}

impl SoapError {
    /// Build a serialization error from any displayable cause
    pub fn serialization(cause: impl fmt::Display) -> Self {
        Self::Serialization(cause.to_string())
    }

    /// Build a deserialization error from any displayable cause
    pub fn deserialization(cause: impl fmt::Display) -> Self {
        Self::Deserialization(cause.to_string())
    }

    /// Wrap any error as a transport failure
    pub fn transport(cause: impl Into<BoxError>) -> Self {
        Self::Transport(cause.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SoapError::Serialization(_) => ErrorKind::Serialization,
            SoapError::InvalidEndpoint(..) | SoapError::Transport(_) => ErrorKind::Transport,
            SoapError::Deserialization(_) => ErrorKind::Deserialization,
            SoapError::Fault { .. } => ErrorKind::ProtocolFault,
            SoapError::Config(_) => ErrorKind::Config,
        }
    }

    /// The SOAP fault, when the server answered with one
    pub fn fault(&self) -> Option<&Fault> {
        match self {
            SoapError::Fault { fault, .. } => Some(fault),
            _ => None,
        }
    }

    /// The raw HTTP response that accompanied a fault
    pub fn response(&self) -> Option<&Response<Vec<u8>>> {
        match self {
            SoapError::Fault { response, .. } => Some(response),
            _ => None,
        }
    }

    /// Consume the error and return the fault it carries, if any
    pub fn into_fault(self) -> Option<Fault> {
        match self {
            SoapError::Fault { fault, .. } => Some(fault),
            _ => None,
        }
    }
}

impl From<ureq::Error> for SoapError {
    fn from(err: ureq::Error) -> Self {
        SoapError::Transport(Box::new(err))
    }
}

impl From<ureq::http::Error> for SoapError {
    fn from(err: ureq::http::Error) -> Self {
        SoapError::Transport(Box::new(err))
    }
}

impl From<serde_yaml::Error> for SoapError {
    fn from(err: serde_yaml::Error) -> Self {
        SoapError::Config(err.to_string())
    }
}
