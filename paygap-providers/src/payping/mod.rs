//! PayPing payment gateway (API v2).
//!
//! Calls authenticate with a bearer token issued in the PayPing panel.
//! PayPing has no test environment. A payment returns a code, the payer is
//! sent to [`PayPing::payment_url`], and PayPing redirects back with a
//! `refId` that [`PayPing::verify_payment`] confirms.

mod types;

pub use types::*;

use paygap::validate::{Validate, ValidationErrors, Validator};
use paygap::{ApiCall, SharedTransport, Status, dispatch};
use serde::{Deserialize, Serialize};

use crate::adapter::{Provider, check_config, check_request, require_transport};

/// API version this adapter speaks.
pub const API_VERSION: &str = "2";

/// Production host.
pub const HOST: &str = "https://api.payping.ir";

/// Create payment endpoint.
pub const PAYMENT_ENDPOINT: &str = "/v2/pay";
/// Verify payment endpoint.
pub const VERIFY_ENDPOINT: &str = "/v2/pay/verify";
/// Multiple payee payment endpoint.
pub const MULTIPLE_PAYMENT_ENDPOINT: &str = "/v2/pay/multi";
/// Payer redirect path; the payment code is appended.
pub const GOTO_IPG_PATH: &str = "/v2/pay/gotoipg/";

/// Shortest token PayPing issues.
pub const MIN_TOKEN_LEN: usize = 10;

/// Credentials for [`PayPing`].
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayPingConfig {
    /// Bearer token.
    pub api_token: String,

    /// Overrides [`HOST`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl std::fmt::Debug for PayPingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayPingConfig")
            .field("api_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Validate for PayPingConfig {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .min_len("api_token", self.api_token.trim(), MIN_TOKEN_LEN)
            .optional(self.base_url.as_deref(), |v, u| v.url("base_url", u))
            .finish()
    }
}

/// Builder for [`PayPing`].
#[derive(Default)]
#[must_use]
pub struct PayPingBuilder {
    transport: Option<SharedTransport>,
    config: PayPingConfig,
}

impl std::fmt::Debug for PayPingBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayPingBuilder")
            .field("has_transport", &self.transport.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl PayPingBuilder {
    /// Sets the transport.
    pub fn transport(mut self, transport: SharedTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: PayPingConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the bearer token.
    pub fn api_token(mut self, api_token: impl Into<String>) -> Self {
        self.config.api_token = api_token.into();
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
    /// Returns a configuration [`Status`] if no transport was set or the
    /// token is shorter than [`MIN_TOKEN_LEN`].
    pub fn build(self) -> Result<PayPing, Status> {
        let transport = require_transport(self.transport)?;
        check_config(&self.config)?;
        Ok(PayPing {
            transport,
            authorization: format!("Bearer {}", self.config.api_token.trim()),
            base_url: self.config.base_url.unwrap_or_else(|| HOST.to_owned()),
        })
    }
}

/// PayPing adapter.
#[derive(Clone)]
pub struct PayPing {
    transport: SharedTransport,
    authorization: String,
    base_url: String,
}

impl std::fmt::Debug for PayPing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayPing")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Provider for PayPing {
    fn name(&self) -> &'static str {
        "payping"
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn is_sandbox(&self) -> bool {
        false
    }
}

impl PayPing {
    /// Starts building an adapter.
    pub fn builder() -> PayPingBuilder {
        PayPingBuilder::default()
    }

    /// Returns the URL the payer must be redirected to for `code`.
    #[must_use]
    pub fn payment_url(&self, code: &str) -> String {
        format!("{}{GOTO_IPG_PATH}{code}", self.base_url)
    }

    fn call(&self, endpoint: &str) -> ApiCall {
        ApiCall::post(&self.base_url, endpoint)
            .with_header("Authorization", &self.authorization)
            .with_header("Content-Type", "application/json")
    }

    /// Creates a payment and returns its code.
    ///
    /// # Errors
    ///
    /// Returns a validation [`Status`] for an invalid request, otherwise any
    /// error produced by [`dispatch()`].
    pub async fn request_payment(&self, request: &PaymentRequest) -> Result<PaymentResponse, Status> {
        check_request(request)?;
        dispatch::<_, _, ErrorResponse>(&*self.transport, &self.call(PAYMENT_ENDPOINT), Some(request))
            .await
    }

    /// Confirms a payment after the payer returns.
    ///
    /// # Errors
    ///
    /// Returns a validation [`Status`] for an invalid request, otherwise any
    /// error produced by [`dispatch()`].
    pub async fn verify_payment(&self, request: &VerifyRequest) -> Result<VerifyResponse, Status> {
        check_request(request)?;
        dispatch::<_, _, ErrorResponse>(&*self.transport, &self.call(VERIFY_ENDPOINT), Some(request))
            .await
    }

    /// Creates one payment whose amount is split between several PayPing users.
    ///
    /// # Errors
    ///
    /// Returns a validation [`Status`] for an invalid request, otherwise any
    /// error produced by [`dispatch()`].
    pub async fn multiple_payment(
        &self,
        request: &MultiplePaymentRequest,
    ) -> Result<PaymentResponse, Status> {
        check_request(request)?;
        dispatch::<_, _, ErrorResponse>(
            &*self.transport,
            &self.call(MULTIPLE_PAYMENT_ENDPOINT),
            Some(request),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use paygap::ErrorKind;
    use paygap::transport::stub::StubTransport;
    use serde_json::json;

    use super::*;

    const TOKEN: &str = "b2b7c1e6f0a94d5e8a3c";

    fn adapter(stub: &Arc<StubTransport>) -> PayPing {
        PayPing::builder().transport(stub.clone()).api_token(TOKEN).build().unwrap()
    }

    #[test]
    fn short_token_fails_at_build() {
        let stub = Arc::new(StubTransport::replying(200, "{}"));
        let err = PayPing::builder().transport(stub).api_token("abc").build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.message().contains("api_token"));

        let err = PayPing::builder().api_token(TOKEN).build().unwrap_err();
        assert_eq!(err, Status::client_nil());
    }

    #[tokio::test]
    async fn request_payment_sends_bearer_token() {
        let stub = Arc::new(StubTransport::replying_json(200, &json!({"code": "4f3c2a"})));
        let payping = adapter(&stub);
        let request = PaymentRequest {
            amount: 1000,
            return_url: "https://shop.example/back".into(),
            ..Default::default()
        };
        let response = payping.request_payment(&request).await.unwrap();
        assert_eq!(payping.payment_url(&response.code), "https://api.payping.ir/v2/pay/gotoipg/4f3c2a");

        let sent = stub.last_call().unwrap();
        assert_eq!(sent.call.url(), "https://api.payping.ir/v2/pay");
        assert_eq!(
            sent.call.headers.get("Authorization").map(String::as_str),
            Some("Bearer b2b7c1e6f0a94d5e8a3c")
        );
    }

    #[tokio::test]
    async fn verify_rejection_uses_numeric_key() {
        let stub = Arc::new(StubTransport::replying_json(400, &json!({"15": "تراکنش نامعتبر است"})));
        let err = adapter(&stub)
            .verify_payment(&VerifyRequest {
                ref_id: "123".into(),
                amount: 1000,
            })
            .await
            .unwrap_err();
        assert!(err.is_rejection());
        assert_eq!(err.code(), 15);
        assert_eq!(err.message(), "تراکنش نامعتبر است");
    }

    #[tokio::test]
    async fn verify_decodes_card_details() {
        let stub = Arc::new(StubTransport::replying_json(
            200,
            &json!({"amount": 1000, "cardNumber": "603799******7999", "cardHashPan": "A1B2"}),
        ));
        let response = adapter(&stub)
            .verify_payment(&VerifyRequest {
                ref_id: "123".into(),
                amount: 1000,
            })
            .await
            .unwrap();
        assert_eq!(response.card_number, "603799******7999");
        assert_eq!(stub.last_call().unwrap().json_body(), json!({"refId": "123", "amount": 1000}));
    }

    #[tokio::test]
    async fn multiple_payment_posts_pairs() {
        let stub = Arc::new(StubTransport::replying_json(200, &json!({"code": "m1"})));
        let request = MultiplePaymentRequest {
            pairs: vec![
                Pair {
                    name: "seller".into(),
                    amount: 700,
                    description: String::new(),
                },
                Pair {
                    name: "platform".into(),
                    amount: 300,
                    description: "fee".into(),
                },
            ],
            return_url: "https://shop.example/back".into(),
            ..Default::default()
        };
        let response = adapter(&stub).multiple_payment(&request).await.unwrap();
        assert_eq!(response.code, "m1");

        let sent = stub.last_call().unwrap();
        assert_eq!(sent.call.path, MULTIPLE_PAYMENT_ENDPOINT);
        assert_eq!(
            sent.json_body(),
            json!({
                "pairs": [
                    {"name": "seller", "amount": 700},
                    {"name": "platform", "amount": 300, "description": "fee"}
                ],
                "returnUrl": "https://shop.example/back"
            })
        );
    }

    #[tokio::test]
    async fn invalid_payment_is_not_sent() {
        let stub = Arc::new(StubTransport::replying_json(200, &json!({"code": "x"})));
        let request = PaymentRequest {
            amount: 0,
            return_url: "https://shop.example/back".into(),
            ..Default::default()
        };
        let err = adapter(&stub).request_payment(&request).await.unwrap_err();
        assert!(err.is_validation());
        assert!(err.message().contains("amount"));
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn overflowing_pair_amounts_are_rejected_locally() {
        let stub = Arc::new(StubTransport::replying_json(200, &json!({"code": "x"})));
        let request = MultiplePaymentRequest {
            pairs: [u64::MAX, 200]
                .into_iter()
                .map(|amount| Pair {
                    name: "seller".into(),
                    amount,
                    description: String::new(),
                })
                .collect(),
            return_url: "https://shop.example/back".into(),
            ..Default::default()
        };
        let err = adapter(&stub).multiple_payment(&request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.message().contains("amount must be at most"));
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn transport_failure_is_internal() {
        let stub = Arc::new(StubTransport::failing("dns error"));
        let err = adapter(&stub)
            .verify_payment(&VerifyRequest {
                ref_id: "123".into(),
                amount: 1000,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.http_status().as_u16(), 500);
    }
}
