//! Transport contract consumed by the dispatcher.
//!
//! The core never opens sockets. Adapters describe each call as an [`ApiCall`]
//! and hand it, with an already-serialized JSON body, to a [`Transport`]. The
//! transport owns pooling, TLS and timeouts; it returns the raw status and
//! body and leaves interpretation to the dispatcher.
//!
//! Cancellation follows the usual async contract: dropping the future returned
//! by [`Transport::send`] aborts the in-flight exchange, so a caller deadline is
//! simply `tokio::time::timeout(limit, adapter.verify_payment(..))`.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;

pub mod stub;

/// A boxed, `Send` future returned by object-safe async traits in this crate.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A transport shared between adapters and tasks.
pub type SharedTransport = Arc<dyn Transport>;

/// HTTP method of an [`ApiCall`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`; no request body is sent.
    Get,
    /// `POST` with a JSON body.
    Post,
}

impl Method {
    /// Returns the method name as it appears on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Describes one outgoing call: where it goes and what rides along with it.
///
/// Built fresh for every operation from the adapter's configuration and
/// dropped once the call returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCall {
    /// Base host including scheme, e.g. `https://api.idpay.ir`.
    pub host: String,
    /// Endpoint path, e.g. `/v1.1/payment`.
    pub path: String,
    /// HTTP method.
    pub method: Method,
    /// Headers passed through verbatim.
    pub headers: BTreeMap<String, String>,
    /// Query parameters; empty means none are attached.
    pub query: BTreeMap<String, String>,
}

impl ApiCall {
    /// Creates a call with the given method and no headers or query.
    #[must_use]
    pub fn new(method: Method, host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            path: path.into(),
            method,
            headers: BTreeMap::new(),
            query: BTreeMap::new(),
        }
    }

    /// Creates a `POST` call.
    #[must_use]
    pub fn post(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(Method::Post, host, path)
    }

    /// Creates a `GET` call.
    #[must_use]
    pub fn get(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(Method::Get, host, path)
    }

    /// Adds a single header, replacing any previous value.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Adds every header from `headers`.
    #[must_use]
    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Replaces the query parameters.
    #[must_use]
    pub fn with_query(mut self, query: BTreeMap<String, String>) -> Self {
        self.query = query;
        self
    }

    /// Returns `host` and `path` joined with exactly one slash between them.
    #[must_use]
    pub fn url(&self) -> String {
        let host = self.host.trim_end_matches('/');
        let path = self.path.trim_start_matches('/');
        format!("{host}/{path}")
    }
}

/// Raw outcome of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    status: u16,
    body: Bytes,
}

impl TransportResponse {
    /// Wraps a status code and response body.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns the HTTP status code exactly as received.
    #[must_use]
    pub const fn raw_status(&self) -> u16 {
        self.status
    }

    /// Returns the raw response body.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Decodes the body as JSON into `T`.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Errors a transport reports when no usable response exists.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request could not be sent or the connection failed.
    #[error("request failed: {0}")]
    Request(String),
    /// The exchange did not complete within the configured time.
    #[error("request timed out: {0}")]
    Timeout(String),
    /// Host and path did not form a valid URL.
    #[error("invalid url {url}: {source}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },
    /// A header name or value could not be encoded.
    #[error("invalid header {0}")]
    InvalidHeader(String),
    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Performs HTTP exchanges on behalf of the dispatcher.
///
/// Implementations must be safe to share across tasks; adapters hold them
/// behind an [`Arc`]. `body` is `None` for `GET` calls.
pub trait Transport: Send + Sync {
    /// Sends `call` with the given JSON body and returns the raw response.
    fn send<'a>(
        &'a self,
        call: &'a ApiCall,
        body: Option<Vec<u8>>,
    ) -> BoxFuture<'a, Result<TransportResponse, TransportError>>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send<'a>(
        &'a self,
        call: &'a ApiCall,
        body: Option<Vec<u8>>,
    ) -> BoxFuture<'a, Result<TransportResponse, TransportError>> {
        (**self).send(call, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_with_single_slash() {
        let call = ApiCall::post("https://api.idpay.ir/", "/v1.1/payment");
        assert_eq!(call.url(), "https://api.idpay.ir/v1.1/payment");
        let call = ApiCall::get("https://api.idpay.ir", "v1.1/payment");
        assert_eq!(call.url(), "https://api.idpay.ir/v1.1/payment");
    }

    #[test]
    fn with_header_replaces_previous_value() {
        let call = ApiCall::post("https://h", "/p")
            .with_header("X-API-KEY", "a")
            .with_header("X-API-KEY", "b");
        assert_eq!(call.headers.get("X-API-KEY").map(String::as_str), Some("b"));
    }

    #[test]
    fn json_decodes_body() {
        let response = TransportResponse::new(200, r#"{"id":"abc"}"#);
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["id"], "abc");
        assert_eq!(response.raw_status(), 200);
    }
}
