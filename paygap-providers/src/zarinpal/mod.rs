//! Zarinpal payment gateway (API v4).
//!
//! Zarinpal authenticates with a merchant id sent in every request body and
//! exposes its test environment on a separate host. A payment is two calls:
//! [`Zarinpal::request_payment`] returns an authority, the payer is redirected
//! to [`Zarinpal::payment_url`], and after the callback the merchant confirms
//! with [`Zarinpal::verify_payment`].

mod types;

pub use types::*;

use paygap::validate::{Validate, ValidationErrors, Validator};
use paygap::{ApiCall, Metadata, SharedTransport, Status, dispatch};
use serde::{Deserialize, Serialize};

use crate::adapter::{Provider, check_config, check_request, require_transport};

/// API version this adapter speaks.
pub const API_VERSION: &str = "4";

/// Production host.
pub const HOST: &str = "https://api.zarinpal.com";
/// Sandbox host.
pub const SANDBOX_HOST: &str = "https://sandbox.zarinpal.com";

/// Payment request endpoint.
pub const REQUEST_ENDPOINT: &str = "/pg/v4/payment/request.json";
/// Payment verification endpoint.
pub const VERIFY_ENDPOINT: &str = "/pg/v4/payment/verify.json";
/// Unverified transactions endpoint.
pub const UNVERIFIED_ENDPOINT: &str = "/pg/v4/payment/unVerified.json";
/// Payer redirect path; the authority is appended.
pub const START_PAY_PATH: &str = "/pg/StartPay/";

/// Length of a Zarinpal merchant id.
pub const MERCHANT_ID_LEN: usize = 36;

/// Credentials and host selection for [`Zarinpal`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZarinpalConfig {
    /// Merchant id issued by Zarinpal.
    pub merchant_id: String,

    /// Use the sandbox host.
    #[serde(default)]
    pub sandbox: bool,

    /// Overrides the host selected by `sandbox`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ZarinpalConfig {
    /// Returns the host calls go to.
    #[must_use]
    pub fn host(&self) -> &str {
        match (&self.base_url, self.sandbox) {
            (Some(url), _) => url.as_str(),
            (None, true) => SANDBOX_HOST,
            (None, false) => HOST,
        }
    }
}

impl Validate for ZarinpalConfig {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .exact_len("merchant_id", &self.merchant_id, MERCHANT_ID_LEN)
            .optional(self.base_url.as_deref(), |v, u| v.url("base_url", u))
            .finish()
    }
}

/// Builder for [`Zarinpal`].
#[derive(Default)]
#[must_use]
pub struct ZarinpalBuilder {
    transport: Option<SharedTransport>,
    config: ZarinpalConfig,
}

impl std::fmt::Debug for ZarinpalBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZarinpalBuilder")
            .field("has_transport", &self.transport.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl ZarinpalBuilder {
    /// Sets the transport.
    pub fn transport(mut self, transport: SharedTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ZarinpalConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the merchant id.
    pub fn merchant_id(mut self, merchant_id: impl Into<String>) -> Self {
        self.config.merchant_id = merchant_id.into();
        self
    }

    /// Selects the sandbox host.
    pub const fn sandbox(mut self, sandbox: bool) -> Self {
        self.config.sandbox = sandbox;
        self
    }

    /// Sends calls to `base_url` instead of the Zarinpal hosts.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = Some(base_url.into());
        self
    }

    /// Validates the configuration and creates the adapter.
    ///
    /// # Errors
    ///
    /// Returns a configuration [`Status`] if no transport was set or the
    /// merchant id is malformed.
    pub fn build(self) -> Result<Zarinpal, Status> {
        let transport = require_transport(self.transport)?;
        check_config(&self.config)?;
        Ok(Zarinpal {
            transport,
            base_url: self.config.host().to_owned(),
            merchant_id: self.config.merchant_id,
            sandbox: self.config.sandbox,
        })
    }
}

/// Zarinpal adapter.
///
/// Immutable after construction; clone it or share it freely across tasks.
#[derive(Clone)]
pub struct Zarinpal {
    transport: SharedTransport,
    merchant_id: String,
    base_url: String,
    sandbox: bool,
}

impl std::fmt::Debug for Zarinpal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Zarinpal")
            .field("base_url", &self.base_url)
            .field("sandbox", &self.sandbox)
            .finish_non_exhaustive()
    }
}

impl Provider for Zarinpal {
    fn name(&self) -> &'static str {
        "zarinpal"
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn is_sandbox(&self) -> bool {
        self.sandbox
    }
}

impl Zarinpal {
    /// Starts building an adapter.
    pub fn builder() -> ZarinpalBuilder {
        ZarinpalBuilder::default()
    }

    /// Returns the URL the payer must be redirected to for `authority`.
    #[must_use]
    pub fn payment_url(&self, authority: &str) -> String {
        format!("{}{START_PAY_PATH}{authority}", self.base_url)
    }

    fn call(&self, endpoint: &str) -> ApiCall {
        ApiCall::post(&self.base_url, endpoint)
            .with_header("Content-Type", "application/json")
            .with_header("Accept", "application/json")
    }

    /// Creates a payment and returns its authority.
    ///
    /// `currency` may be empty to use the merchant default.
    ///
    /// # Errors
    ///
    /// Returns a validation [`Status`] for invalid arguments, otherwise any
    /// error produced by [`dispatch()`].
    pub async fn request_payment(
        &self,
        amount: u64,
        callback_url: &str,
        currency: &str,
        description: &str,
        metadata: Metadata,
    ) -> Result<PaymentResponse, Status> {
        let request = PaymentRequest {
            merchant_id: self.merchant_id.clone(),
            amount,
            currency: currency.to_owned(),
            callback_url: callback_url.to_owned(),
            description: description.to_owned(),
            metadata,
        };
        check_request(&request)?;
        dispatch::<_, _, ErrorResponse>(&*self.transport, &self.call(REQUEST_ENDPOINT), Some(&request))
            .await
    }

    /// Confirms a payment after the payer returns.
    ///
    /// # Errors
    ///
    /// Returns a validation [`Status`] for invalid arguments, otherwise any
    /// error produced by [`dispatch()`].
    pub async fn verify_payment(&self, amount: u64, authority: &str) -> Result<VerifyResponse, Status> {
        let request = self.verify_request(amount, authority);
        check_request(&request)?;
        dispatch::<_, _, ErrorResponse>(&*self.transport, &self.call(VERIFY_ENDPOINT), Some(&request))
            .await
    }

    /// Lists paid transactions that were never verified.
    ///
    /// # Errors
    ///
    /// Returns any error produced by [`dispatch()`].
    pub async fn unverified_transactions(&self) -> Result<UnverifiedTransactionsResponse, Status> {
        let request = UnverifiedTransactionsRequest {
            merchant_id: self.merchant_id.clone(),
        };
        check_request(&request)?;
        dispatch::<_, _, ErrorResponse>(
            &*self.transport,
            &self.call(UNVERIFIED_ENDPOINT),
            Some(&request),
        )
        .await
    }

    /// Creates a payment whose amount is split between several IBANs.
    ///
    /// See <https://docs.zarinpal.com/paymentGateway/setshare.html>.
    ///
    /// # Errors
    ///
    /// Returns a validation [`Status`] if there are no wages, more than
    /// [`MAX_WAGES`], or the shares exceed `amount`; otherwise any error
    /// produced by [`dispatch()`].
    pub async fn floating_share_settlement(
        &self,
        amount: u64,
        description: &str,
        callback_url: &str,
        wages: Vec<Wage>,
        metadata: Metadata,
    ) -> Result<FloatingShareSettlementResponse, Status> {
        let request = FloatingShareSettlementRequest {
            merchant_id: self.merchant_id.clone(),
            amount,
            callback_url: callback_url.to_owned(),
            description: description.to_owned(),
            metadata,
            wages,
        };
        check_request(&request)?;
        dispatch::<_, _, ErrorResponse>(&*self.transport, &self.call(REQUEST_ENDPOINT), Some(&request))
            .await
    }

    /// Confirms a floating share settlement payment.
    ///
    /// # Errors
    ///
    /// Returns a validation [`Status`] for invalid arguments, otherwise any
    /// error produced by [`dispatch()`].
    pub async fn verify_floating_share_settlement(
        &self,
        amount: u64,
        authority: &str,
    ) -> Result<VerifyFloatingShareSettlementResponse, Status> {
        let request = self.verify_request(amount, authority);
        check_request(&request)?;
        dispatch::<_, _, ErrorResponse>(&*self.transport, &self.call(VERIFY_ENDPOINT), Some(&request))
            .await
    }

    fn verify_request(&self, amount: u64, authority: &str) -> VerifyRequest {
        VerifyRequest {
            merchant_id: self.merchant_id.clone(),
            amount,
            authority: authority.to_owned(),
        }
    }
}
