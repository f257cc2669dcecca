//! A [`paygap::Transport`] that performs real HTTP exchanges with `reqwest`.
//!
//! ## Features
//!
//! - JSON request bodies with `Content-Type: application/json` unless the call sets its own
//! - Query parameters and headers passed through from the [`ApiCall`] verbatim
//! - A per-request timeout reported as [`TransportError::Timeout`]
//! - Integrates with `tracing` if the `telemetry` feature is enabled
//!
//! The transport never interprets status codes: every completed exchange is
//! handed back as a [`TransportResponse`] and the dispatcher decides what it
//! means.

use std::sync::Arc;
use std::time::Duration;

use paygap::transport::BoxFuture;
use paygap::{ApiCall, Method, SharedTransport, Transport, TransportError, TransportResponse};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::constants::{CONTENT_TYPE_JSON, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, MAX_REDIRECTS};

/// Configuration for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Per-request timeout.
    pub timeout: Duration,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,

    /// Optional pre-configured reqwest client. If `None`, a new client is
    /// created with the configured timeout and user agent.
    pub http_client: Option<reqwest::Client>,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            http_client: None,
        }
    }
}

impl HttpTransportConfig {
    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the `User-Agent` header value.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets a pre-configured reqwest client.
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

/// Async HTTP transport backed by a shared [`reqwest::Client`].
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use paygap_http::{HttpTransport, HttpTransportConfig};
///
/// let transport = HttpTransport::new(
///     HttpTransportConfig::default().with_timeout(Duration::from_secs(10)),
/// )
/// .expect("tls backend available")
/// .shared();
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Creates a transport from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Request`] if the reqwest client cannot be built
    /// (for example when no TLS backend is available).
    pub fn new(config: HttpTransportConfig) -> Result<Self, TransportError> {
        let client = match config.http_client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .timeout(config.timeout)
                .user_agent(config.user_agent)
                .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
                .build()
                .map_err(|e| TransportError::Request(e.to_string()))?,
        };
        Ok(Self {
            client,
            timeout: config.timeout,
        })
    }

    /// Returns the configured per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Wraps the transport for sharing between adapters.
    #[must_use]
    pub fn shared(self) -> SharedTransport {
        Arc::new(self)
    }

    #[cfg_attr(
        feature = "telemetry",
        tracing::instrument(
            name = "paygap.http.send",
            skip_all,
            fields(method = %call.method, url = %call.url()),
            err
        )
    )]
    async fn execute(
        &self,
        call: &ApiCall,
        body: Option<Vec<u8>>,
    ) -> Result<TransportResponse, TransportError> {
        let url = build_url(call)?;
        let mut headers = build_headers(call)?;

        let method = match call.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };
        let mut request = self.client.request(method, url).timeout(self.timeout);
        if let Some(body) = body {
            if !headers.contains_key(CONTENT_TYPE) {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
            }
            request = request.body(body);
        }

        let response = request.headers(headers).send().await.map_err(map_send_error)?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(e.to_string())
            } else {
                TransportError::Body(e.to_string())
            }
        })?;

        #[cfg(feature = "telemetry")]
        tracing::debug!(status, bytes = bytes.len(), "gateway responded");

        Ok(TransportResponse::new(status, bytes))
    }
}

impl Transport for HttpTransport {
    fn send<'a>(
        &'a self,
        call: &'a ApiCall,
        body: Option<Vec<u8>>,
    ) -> BoxFuture<'a, Result<TransportResponse, TransportError>> {
        Box::pin(self.execute(call, body))
    }
}

fn build_url(call: &ApiCall) -> Result<Url, TransportError> {
    let raw = call.url();
    let mut url = Url::parse(&raw).map_err(|source| TransportError::InvalidUrl { url: raw, source })?;
    if !call.query.is_empty() {
        url.query_pairs_mut().extend_pairs(&call.query);
    }
    Ok(url)
}

fn build_headers(call: &ApiCall) -> Result<HeaderMap, TransportError> {
    let mut headers = HeaderMap::with_capacity(call.headers.len());
    for (name, value) in &call.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| TransportError::InvalidHeader(name.clone()))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| TransportError::InvalidHeader(name.to_string()))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

fn map_send_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(error.to_string())
    } else {
        TransportError::Request(error.to_string())
    }
}
