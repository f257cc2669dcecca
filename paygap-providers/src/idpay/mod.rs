//! IDPay payment gateway (API v1.1).
//!
//! Every call carries the merchant's API key in `X-API-KEY`. There is no
//! separate sandbox host; test mode is the `X-SANDBOX: 1` header. After
//! payment IDPay calls the merchant back with a
//! [`PostCallback`](paygap::callback::PostCallback) or
//! [`GetCallback`](paygap::callback::GetCallback), after which the merchant
//! confirms the transaction with [`IdPay::verify_transaction`].

mod types;

pub use types::*;

use paygap::validate::{Validate, ValidationErrors, Validator};
use paygap::{ApiCall, SharedTransport, Status, dispatch};
use serde::{Deserialize, Serialize};

use crate::adapter::{Provider, check_config, check_request, require_transport};

/// API version this adapter speaks.
pub const API_VERSION: &str = "1.1";

/// Production host.
pub const HOST: &str = "https://api.idpay.ir";

/// Create payment endpoint.
pub const PAYMENT_ENDPOINT: &str = "/v1.1/payment";
/// Verify payment endpoint.
pub const VERIFY_ENDPOINT: &str = "/v1.1/payment/verify";
/// Transaction inquiry endpoint.
pub const INQUIRY_ENDPOINT: &str = "/v1.1/payment/inquiry";
/// Transaction list endpoint.
pub const TRANSACTIONS_ENDPOINT: &str = "/v1.1/payment/transactions";

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-API-KEY";
/// Header switching IDPay to test mode.
pub const SANDBOX_HEADER: &str = "X-SANDBOX";

/// Length of an IDPay API key.
pub const API_KEY_LEN: usize = 36;

/// Credentials for [`IdPay`].
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdPayConfig {
    /// API key from the IDPay panel.
    pub api_key: String,

    /// Send `X-SANDBOX: 1` with every call.
    #[serde(default)]
    pub sandbox: bool,

    /// Overrides [`HOST`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl std::fmt::Debug for IdPayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdPayConfig")
            .field("api_key", &"<redacted>")
            .field("sandbox", &self.sandbox)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Validate for IdPayConfig {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .exact_len("api_key", &self.api_key, API_KEY_LEN)
            .optional(self.base_url.as_deref(), |v, u| v.url("base_url", u))
            .finish()
    }
}

/// Builder for [`IdPay`].
#[derive(Default)]
#[must_use]
pub struct IdPayBuilder {
    transport: Option<SharedTransport>,
    config: IdPayConfig,
}

impl std::fmt::Debug for IdPayBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdPayBuilder")
            .field("has_transport", &self.transport.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl IdPayBuilder {
    /// Sets the transport.
    pub fn transport(mut self, transport: SharedTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: IdPayConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api_key = api_key.into();
        self
    }

    /// Enables test mode.
    pub const fn sandbox(mut self, sandbox: bool) -> Self {
        self.config.sandbox = sandbox;
        self
    }

    /// Sends calls to `base_url` instead of [`HOST`].
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = Some(base_url.into());
        self
    }

    /// Validates the configuration and creates the adapter.
    ///
    /// # Errors
    ///
    /// Returns a configuration [`Status`] if no transport was set or the API
    /// key is malformed.
    pub fn build(self) -> Result<IdPay, Status> {
        let transport = require_transport(self.transport)?;
        check_config(&self.config)?;
        Ok(IdPay {
            transport,
            base_url: self.config.base_url.unwrap_or_else(|| HOST.to_owned()),
            api_key: self.config.api_key,
            sandbox: self.config.sandbox,
        })
    }
}

/// IDPay adapter.
#[derive(Clone)]
pub struct IdPay {
    transport: SharedTransport,
    api_key: String,
    base_url: String,
    sandbox: bool,
}

impl std::fmt::Debug for IdPay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdPay")
            .field("base_url", &self.base_url)
            .field("sandbox", &self.sandbox)
            .finish_non_exhaustive()
    }
}

impl Provider for IdPay {
    fn name(&self) -> &'static str {
        "idpay"
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn is_sandbox(&self) -> bool {
        self.sandbox
    }
}

impl IdPay {
    /// Starts building an adapter.
    pub fn builder() -> IdPayBuilder {
        IdPayBuilder::default()
    }

    fn call(&self, endpoint: &str) -> ApiCall {
        let call = ApiCall::post(&self.base_url, endpoint)
            .with_header(API_KEY_HEADER, &self.api_key)
            .with_header("Content-Type", "application/json");
        if self.sandbox {
            call.with_header(SANDBOX_HEADER, "1")
        } else {
            call
        }
    }

    /// Creates a transaction and returns its id and payment link.
    ///
    /// # Errors
    ///
    /// Returns a validation [`Status`] for an invalid request, otherwise any
    /// error produced by [`dispatch()`].
    pub async fn create_transaction(&self, request: &PaymentRequest) -> Result<PaymentResponse, Status> {
        check_request(request)?;
        dispatch::<_, _, ErrorResponse>(&*self.transport, &self.call(PAYMENT_ENDPOINT), Some(request))
            .await
    }

    /// Confirms a paid transaction. Unverified payments are refunded by IDPay.
    ///
    /// # Errors
    ///
    /// Returns a validation [`Status`] for an invalid request, otherwise any
    /// error produced by [`dispatch()`].
    pub async fn verify_transaction(&self, request: &VerifyRequest) -> Result<VerifyResponse, Status> {
        check_request(request)?;
        dispatch::<_, _, ErrorResponse>(&*self.transport, &self.call(VERIFY_ENDPOINT), Some(request))
            .await
    }

    /// Looks up the current state of a transaction.
    ///
    /// # Errors
    ///
    /// Returns a validation [`Status`] for an invalid request, otherwise any
    /// error produced by [`dispatch()`].
    pub async fn transaction_status(
        &self,
        request: &TransactionStatusRequest,
    ) -> Result<TransactionStatusResponse, Status> {
        check_request(request)?;
        dispatch::<_, _, ErrorResponse>(&*self.transport, &self.call(INQUIRY_ENDPOINT), Some(request))
            .await
    }

    /// Lists transactions matching the request filters.
    ///
    /// # Errors
    ///
    /// Returns a validation [`Status`] for an invalid request, otherwise any
    /// error produced by [`dispatch()`].
    pub async fn transaction_list(
        &self,
        request: &TransactionListRequest,
    ) -> Result<TransactionListResponse, Status> {
        check_request(request)?;
        let call = self.call(TRANSACTIONS_ENDPOINT).with_query(request.query());
        dispatch::<_, _, ErrorResponse>(&*self.transport, &call, Some(request)).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use paygap::transport::stub::StubTransport;
    use paygap::{Code, ErrorKind};
    use serde_json::json;

    use super::*;

    const API_KEY: &str = "6a7f99eb-7c20-4412-a972-6dfb7cd253a4";

    fn adapter(stub: &Arc<StubTransport>, sandbox: bool) -> IdPay {
        IdPay::builder()
            .transport(stub.clone())
            .api_key(API_KEY)
            .sandbox(sandbox)
            .build()
            .unwrap()
    }

    fn payment() -> PaymentRequest {
        PaymentRequest {
            order_id: "101".into(),
            amount: 1000,
            callback: "https://shop.example/callback".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_transaction_decodes_created_response() {
        let stub = Arc::new(StubTransport::replying_json(
            201,
            &json!({"id": "abc", "link": "https://pay/abc"}),
        ));
        let response = adapter(&stub, false).create_transaction(&payment()).await.unwrap();
        assert_eq!(response.id, "abc");
        assert_eq!(response.link, "https://pay/abc");

        let sent = stub.last_call().unwrap();
        assert_eq!(sent.call.url(), "https://api.idpay.ir/v1.1/payment");
        assert_eq!(sent.call.headers.get(API_KEY_HEADER).map(String::as_str), Some(API_KEY));
        assert!(!sent.call.headers.contains_key(SANDBOX_HEADER));
        assert_eq!(sent.json_body()["amount"], 1000);
    }

    #[tokio::test]
    async fn sandbox_adds_header() {
        let stub = Arc::new(StubTransport::replying_json(201, &json!({"id": "a", "link": "b"})));
        adapter(&stub, true).create_transaction(&payment()).await.unwrap();
        let sent = stub.last_call().unwrap();
        assert_eq!(sent.call.headers.get(SANDBOX_HEADER).map(String::as_str), Some("1"));
    }

    #[tokio::test]
    async fn rejection_maps_error_code() {
        let stub = Arc::new(StubTransport::replying_json(
            405,
            &json!({"error_code": 53, "error_message": "تایید پرداخت امکان پذیر نیست."}),
        ));
        let err = adapter(&stub, false)
            .verify_transaction(&VerifyRequest::new("d2e353189823079e1e4181772cff5292", "101"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProviderRejection);
        assert_eq!(err.code(), 53);
        assert_eq!(err.rpc_code(), Code::Ok);
        assert_eq!(err.http_status().as_u16(), 424);
    }

    #[tokio::test]
    async fn invalid_request_is_not_sent() {
        let stub = Arc::new(StubTransport::replying(201, "{}"));
        let mut request = payment();
        request.amount = 999;
        let err = adapter(&stub, false).create_transaction(&request).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.http_status().as_u16(), 400);
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn transaction_status_posts_to_inquiry() {
        let stub = Arc::new(StubTransport::replying_json(
            200,
            &json!({
                "status": "10",
                "track_id": "10012",
                "id": "abc",
                "order_id": "101",
                "amount": "10000",
                "wage": {"by": "payee", "type": "amount", "amount": "0"},
                "date": "1546288200",
                "payer": {"name": "ali", "phone": "09123456789", "mail": "", "desc": ""}
            }),
        ));
        let response = adapter(&stub, false)
            .transaction_status(&TransactionStatusRequest::new("abc", "101"))
            .await
            .unwrap();
        assert_eq!(response.transaction_status(), Some(TransactionStatus::AwaitingVerification));
        assert_eq!(response.payer.name, "ali");
        assert_eq!(response.wage.kind, "amount");
        let sent = stub.last_call().unwrap();
        assert_eq!(sent.call.path, INQUIRY_ENDPOINT);
        assert_eq!(sent.json_body(), json!({"id": "abc", "order_id": "101"}));
    }

    #[tokio::test]
    async fn transaction_list_without_page_size_has_no_query() {
        let stub = Arc::new(StubTransport::replying_json(200, &json!({"attachment": {}, "records": []})));
        let idpay = adapter(&stub, false);

        let request = TransactionListRequest {
            page: 2,
            status: vec![100],
            ..Default::default()
        };
        let response = idpay.transaction_list(&request).await.unwrap();
        assert!(response.records.is_empty());
        let sent = stub.last_call().unwrap();
        assert!(sent.call.query.is_empty());
        assert_eq!(sent.json_body(), json!({"status": [100]}));
    }

    #[tokio::test]
    async fn transaction_list_with_page_size_sets_query() {
        let stub = Arc::new(StubTransport::replying_json(
            200,
            &json!({
                "attachment": {"timestamp": 1_546_288_200, "total_count": 1, "page_count": 1, "page": 0, "page_size": 25},
                "records": [{"status": 100, "track_id": 1, "id": "abc", "order_id": "101", "amount": 1000}]
            }),
        ));
        let request = TransactionListRequest {
            page: 0,
            page_size: 25,
            ..Default::default()
        };
        let response = adapter(&stub, false).transaction_list(&request).await.unwrap();
        assert_eq!(response.attachment.page_size, 25);
        assert_eq!(response.records[0].amount, 1000);

        let sent = stub.last_call().unwrap();
        assert_eq!(sent.call.query.get("page").map(String::as_str), Some("0"));
        assert_eq!(sent.call.query.get("page_size").map(String::as_str), Some("25"));
        assert_eq!(sent.json_body(), json!({}));
    }

    #[test]
    fn build_requires_transport_and_valid_key() {
        let err = IdPay::builder().api_key(API_KEY).build().unwrap_err();
        assert_eq!(err, Status::client_nil());

        let stub = Arc::new(StubTransport::replying(200, "{}"));
        let err = IdPay::builder().transport(stub).api_key("short").build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(!format!("{:?}", IdPayConfig { api_key: API_KEY.into(), ..Default::default() }).contains(API_KEY));
    }
}
