//! # pmosoap - Generic SOAP client
//!
//! Wraps any serde-serializable payload in a SOAP envelope, posts it over
//! HTTP and unwraps the response into a caller-supplied value. Protocol
//! faults come back as first-class errors.
//!
//! ## Architecture
//!
//! - [`Envelope`] / [`Body`] : data shapes of a SOAP message
//! - [`Fault`] : SOAP fault, usable directly as an error
//! - [`XmlCodec`] : marshalling contract, [`QuickXmlCodec`] by default
//! - [`Transport`] : HTTP exchange, [`UreqTransport`] by default
//! - [`SoapClient`] : builds the request, dispatches it, classifies the response
//!
//! ## Example
//!
//! ```no_run
//! use pmosoap::{SoapClient, SoapError};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize)]
//! struct DoWork {
//!     #[serde(rename = "Job")]
//!     job: String,
//! }
//!
//! #[derive(Deserialize, Default)]
//! struct DoWorkResponse {
//!     #[serde(rename = "Status")]
//!     status: String,
//! }
//!
//! let client = SoapClient::builder("http://localhost:8080/soap")
//!     .basic_auth("alice", "secret")
//!     .build()?;
//!
//! let mut result = DoWorkResponse::default();
//! match client.call("DoWork", &DoWork { job: "reindex".into() }, &mut result) {
//!     Ok(response) => println!("{} -> {}", response.status(), result.status),
//!     Err(SoapError::Fault { fault, .. }) if fault.is_client() => {
//!         eprintln!("rejected: {}", fault.fault_string)
//!     }
//!     Err(err) => return Err(err),
//! }
//! # Ok::<(), SoapError>(())
//! ```

pub mod client;
pub mod codec;
pub mod config;
pub mod envelope;
pub mod error;
pub mod fault;
pub mod logging;
pub mod transport;

pub use client::{BasicAuth, ClientBuilder, SOAP_ACTION_HEADER, SOAP_CONTENT_TYPE, SoapClient};
pub use codec::{QuickXmlCodec, XmlCodec};
pub use config::ClientConfig;
pub use envelope::{Body, Envelope, SOAP_ENV_NS, SOAP12_ENV_NS};
pub use error::{ErrorKind, Result, SoapError};
pub use fault::{Fault, FaultCode};
pub use logging::{TracingWireLogger, WireLogger};
pub use transport::{Transport, UreqTransport};

/// Re-export of the HTTP types used by [`Transport`] and returned by [`SoapClient::call`]
pub use ureq::http;
