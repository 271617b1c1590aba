//! SOAP client: one request/response exchange per [`SoapClient::call`]

use crate::codec::{QuickXmlCodec, XmlCodec};
use crate::config::{
    ClientConfig, DEFAULT_DIAL_TIMEOUT_SECS, DEFAULT_MAX_RESPONSE_BYTES, DEFAULT_USER_AGENT,
};
use crate::envelope::Envelope;
use crate::error::{Result, SoapError};
use crate::logging::{TracingWireLogger, WireLogger};
use crate::transport::{Transport, UreqTransport};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use ureq::http::header::{AUTHORIZATION, CONNECTION, CONTENT_TYPE, USER_AGENT};
use ureq::http::{Request, Response};
use url::Url;

/// Content type of every SOAP request
pub const SOAP_CONTENT_TYPE: &str = r#"text/xml; charset="utf-8""#;

/// Header carrying the operation identifier
pub const SOAP_ACTION_HEADER: &str = "SOAPAction";

/// HTTP Basic credentials applied to every request
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub login: String,
    pub password: String,
}

impl BasicAuth {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }

    /// Value of the `Authorization` header
    pub fn header_value(&self) -> String {
        let credentials = format!("{}:{}", self.login, self.password);
        format!("Basic {}", STANDARD.encode(credentials))
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("login", &self.login)
            .field("password", &"***")
            .finish()
    }
}

/// Generic SOAP client
///
/// Configuration is fixed at construction; the client holds no per-call
/// state and can be shared between threads. The codec and the transport
/// are type parameters so they can be replaced with
/// [`with_codec`](Self::with_codec) and [`with_transport`](Self::with_transport).
///
/// # Example
///
/// ```no_run
/// use pmosoap::{BasicAuth, SoapClient};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize)]
/// struct GetPrice {
///     #[serde(rename = "Item")]
///     item: String,
/// }
///
/// #[derive(Deserialize, Default)]
/// struct GetPriceResponse {
///     #[serde(rename = "Price")]
///     price: f64,
/// }
///
/// let client = SoapClient::new(
///     "https://shop.example.com/soap",
///     Some(BasicAuth::new("alice", "secret")),
/// )?;
///
/// let mut price = GetPriceResponse::default();
/// client.call(
///     "GetPrice",
///     &GetPrice { item: "Apples".into() },
///     &mut price,
/// )?;
/// println!("{}", price.price);
/// # Ok::<(), pmosoap::SoapError>(())
/// ```
pub struct SoapClient<C = QuickXmlCodec, T = UreqTransport> {
    endpoint: String,
    auth: Option<BasicAuth>,
    user_agent: String,
    codec: C,
    transport: T,
    wire_logger: Option<Arc<dyn WireLogger>>,
}

impl SoapClient {
    /// Create a client with default settings
    pub fn new(endpoint: impl Into<String>, auth: Option<BasicAuth>) -> Result<Self> {
        let mut builder = Self::builder(endpoint);
        builder.auth = auth;
        builder.build()
    }

    /// Create a client from a [`ClientConfig`]
    pub fn with_config(
        endpoint: impl Into<String>,
        auth: Option<BasicAuth>,
        config: &ClientConfig,
    ) -> Result<Self> {
        let mut builder = Self::builder(endpoint).config(config);
        builder.auth = auth;
        builder.build()
    }

    pub fn builder(endpoint: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(endpoint)
    }
}

impl<C, T> SoapClient<C, T>
where
    C: XmlCodec,
    T: Transport,
{
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn auth(&self) -> Option<&BasicAuth> {
        self.auth.as_ref()
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Replace the XML codec
    pub fn with_codec<C2: XmlCodec>(self, codec: C2) -> SoapClient<C2, T> {
        SoapClient {
            endpoint: self.endpoint,
            auth: self.auth,
            user_agent: self.user_agent,
            codec,
            transport: self.transport,
            wire_logger: self.wire_logger,
        }
    }

    /// Replace the HTTP transport
    pub fn with_transport<T2: Transport>(self, transport: T2) -> SoapClient<C, T2> {
        SoapClient {
            endpoint: self.endpoint,
            auth: self.auth,
            user_agent: self.user_agent,
            codec: self.codec,
            transport,
            wire_logger: self.wire_logger,
        }
    }

    /// Perform one SOAP exchange
    ///
    /// `request` is wrapped in an envelope and posted to the endpoint, with
    /// a `SOAPAction` header when `action` is not empty. The outcome is:
    ///
    /// - empty response body: `Ok`, `response` untouched
    /// - payload: `Ok`, `response` replaced by the decoded payload
    /// - fault: [`SoapError::Fault`]; `response` is untouched but must not be relied on
    /// - anything unreadable: [`SoapError::Deserialization`]
    ///
    /// The HTTP status never changes this classification; the raw response
    /// is returned so callers can inspect status and headers.
    pub fn call<Req, Resp>(
        &self,
        action: &str,
        request: &Req,
        response: &mut Resp,
    ) -> Result<Response<Vec<u8>>>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let body = self.codec.marshal(&Envelope::new(request))?;
        let http_request = self.build_request(action, body)?;

        if let Some(logger) = &self.wire_logger {
            logger.on_request(&self.endpoint, action, http_request.body());
        }
        debug!(
            endpoint = self.endpoint.as_str(),
            action,
            bytes = http_request.body().len(),
            "Sending SOAP request"
        );

        let http_response = self.transport.execute(http_request).inspect_err(|err| {
            debug!(
                endpoint = self.endpoint.as_str(),
                action,
                error = %err,
                "SOAP transport failed"
            );
        })?;

        let status = http_response.status();
        if let Some(logger) = &self.wire_logger {
            logger.on_response(status, http_response.body());
        }

        if http_response.body().is_empty() {
            debug!(action, status = status.as_u16(), "Empty SOAP response");
            return Ok(http_response);
        }

        let envelope: Envelope<Resp> = self.codec.unmarshal(http_response.body())?;

        match envelope.into_result() {
            Err(fault) => {
                warn!(
                    endpoint = self.endpoint.as_str(),
                    action,
                    status = status.as_u16(),
                    fault_code = fault.fault_code.as_str(),
                    fault_string = fault.fault_string.as_str(),
                    "SOAP fault"
                );
                Err(SoapError::Fault {
                    fault,
                    response: Box::new(http_response),
                })
            }
            Ok(content) => {
                if let Some(content) = content {
                    *response = content;
                }
                debug!(
                    action,
                    status = status.as_u16(),
                    bytes = http_response.body().len(),
                    "SOAP response decoded"
                );
                Ok(http_response)
            }
        }
    }

    fn build_request(&self, action: &str, body: Vec<u8>) -> Result<Request<Vec<u8>>> {
        let mut builder = Request::post(self.endpoint.as_str())
            .header(CONTENT_TYPE, SOAP_CONTENT_TYPE)
            .header(USER_AGENT, self.user_agent.as_str())
            // one connection per call
            .header(CONNECTION, "close");

        if !action.is_empty() {
            builder = builder.header(SOAP_ACTION_HEADER, action);
        }
        if let Some(auth) = &self.auth {
            builder = builder.header(AUTHORIZATION, auth.header_value());
        }

        Ok(builder.body(body)?)
    }
}

impl<C, T> fmt::Debug for SoapClient<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoapClient")
            .field("endpoint", &self.endpoint)
            .field("auth", &self.auth)
            .field("user_agent", &self.user_agent)
            .field("wire_logger", &self.wire_logger.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`SoapClient`]
pub struct ClientBuilder {
    endpoint: String,
    auth: Option<BasicAuth>,
    dial_timeout: Duration,
    request_timeout: Option<Duration>,
    user_agent: String,
    max_response_bytes: u64,
    verbose: bool,
    wire_logger: Option<Arc<dyn WireLogger>>,
}

impl ClientBuilder {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            auth: None,
            dial_timeout: Duration::from_secs(DEFAULT_DIAL_TIMEOUT_SECS),
            request_timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            verbose: false,
            wire_logger: None,
        }
    }

    /// Take timeouts, user agent, body limit and verbosity from a config
    pub fn config(mut self, config: &ClientConfig) -> Self {
        self.dial_timeout = config.dial_timeout();
        self.request_timeout = config.request_timeout();
        self.user_agent = config.user_agent.clone();
        self.max_response_bytes = config.max_response_bytes;
        self.verbose = config.verbose;
        self
    }

    pub fn auth(mut self, auth: BasicAuth) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn basic_auth(self, login: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth(BasicAuth::new(login, password))
    }

    /// Connect timeout of the default transport
    pub fn dial_timeout(mut self, timeout: Duration) -> Self {
        self.dial_timeout = timeout;
        self
    }

    /// Whole-call timeout of the default transport
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn max_response_bytes(mut self, limit: u64) -> Self {
        self.max_response_bytes = limit;
        self
    }

    /// Log raw bodies through [`TracingWireLogger`] unless another logger is set
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn wire_logger(mut self, logger: impl WireLogger + 'static) -> Self {
        self.wire_logger = Some(Arc::new(logger));
        self
    }

    /// Build a client using the default `ureq` transport
    pub fn build(self) -> Result<SoapClient> {
        let transport = UreqTransport::with_timeouts(
            self.dial_timeout,
            self.request_timeout,
            self.max_response_bytes,
        );
        self.build_with(transport)
    }

    /// Build a client around a caller-supplied transport
    ///
    /// Timeouts and body limit only apply to the default transport and are
    /// ignored here.
    pub fn build_with<T: Transport>(self, transport: T) -> Result<SoapClient<QuickXmlCodec, T>> {
        validate_endpoint(&self.endpoint)?;

        let wire_logger = match (self.wire_logger, self.verbose) {
            (Some(logger), _) => Some(logger),
            (None, true) => Some(Arc::new(TracingWireLogger) as Arc<dyn WireLogger>),
            (None, false) => None,
        };

        Ok(SoapClient {
            endpoint: self.endpoint,
            auth: self.auth,
            user_agent: self.user_agent,
            codec: QuickXmlCodec::default(),
            transport,
            wire_logger,
        })
    }
}

fn validate_endpoint(endpoint: &str) -> Result<()> {
    let url = Url::parse(endpoint)
        .map_err(|e| SoapError::InvalidEndpoint(endpoint.to_string(), e.to_string()))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(SoapError::InvalidEndpoint(
            endpoint.to_string(),
            format!("unsupported scheme '{scheme}'"),
        )),
    }
}
