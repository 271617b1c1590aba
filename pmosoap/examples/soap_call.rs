//! Example: call a SOAP operation and print the decoded answer
//!
//! Queries the public "NumberConversion" service.
//!
//! Run with: cargo run --example soap_call -- [number]
//!
//! Set `RUST_LOG=pmosoap::wire=debug` to see the raw envelopes.

use anyhow::{Context, Result};
use pmosoap::{ClientConfig, SoapClient, SoapError};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

const ENDPOINT: &str = "https://www.dataaccess.com/webservicesserver/NumberConversion.wso";

#[derive(Serialize)]
#[serde(rename = "NumberToWords")]
struct NumberToWords {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    #[serde(rename = "ubiNum")]
    number: u64,
}

#[derive(Deserialize, Default)]
struct NumberToWordsResponse {
    #[serde(rename = "NumberToWordsResult")]
    result: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let number: u64 = std::env::args()
        .nth(1)
        .map(|arg| arg.parse())
        .transpose()
        .context("argument must be a positive integer")?
        .unwrap_or(42);

    let config = ClientConfig {
        verbose: true,
        ..ClientConfig::default()
    }
    .apply_env_overrides()?;

    let client = SoapClient::with_config(ENDPOINT, None, &config)?;

    let request = NumberToWords {
        xmlns: "http://www.dataaccess.com/webservicesserver/",
        number,
    };
    let mut answer = NumberToWordsResponse::default();

    match client.call("", &request, &mut answer) {
        Ok(response) => {
            println!("HTTP {}", response.status());
            println!("{number} -> {}", answer.result.trim());
        }
        Err(SoapError::Fault { fault, .. }) => {
            println!("Fault [{}]: {}", fault.code(), fault.fault_string);
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}
