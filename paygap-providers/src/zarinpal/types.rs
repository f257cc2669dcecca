//! Wire types for the Zarinpal v4 payment API.
//!
//! Successful bodies wrap the payload in `data`; failures carry an `errors`
//! object with the provider's code and message.

use paygap::validate::{Validate, ValidationErrors, Validator};
use paygap::{Metadata, Rejection};
use serde::{Deserialize, Serialize};

/// Currencies Zarinpal accepts. An empty currency means the merchant default.
pub const CURRENCIES: &[&str] = &["IRR", "IRT"];

/// Smallest amount Zarinpal accepts, in rials.
pub const MIN_AMOUNT: u64 = 1000;

/// Largest number of wage recipients in one floating share settlement.
pub const MAX_WAGES: usize = 5;

/// Checks the well-known metadata keys Zarinpal interprets.
fn check_metadata(v: Validator, metadata: &Metadata) -> Validator {
    let v = v.optional(metadata.get("mobile").and_then(|m| m.as_str()), |v, m| {
        v.mobile("metadata.mobile", m)
    });
    v.optional(metadata.get("email").and_then(|m| m.as_str()), |v, m| {
        v.email("metadata.email", m)
    })
}

/// Body of `POST /pg/v4/payment/request.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentRequest {
    /// Merchant identifier (36 characters).
    pub merchant_id: String,
    /// Amount in the selected currency.
    pub amount: u64,
    /// `IRR`, `IRT` or empty for the merchant default.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub currency: String,
    /// Where the payer returns after paying.
    pub callback_url: String,
    /// Shown to the payer.
    pub description: String,
    /// Extra fields such as `mobile`, `email` or `order_id`.
    #[serde(skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl Validate for PaymentRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let v = Validator::new()
            .required("merchant_id", &self.merchant_id)
            .min("amount", self.amount, MIN_AMOUNT)
            .url("callback_url", &self.callback_url)
            .required("description", &self.description)
            .optional(Some(self.currency.as_str()), |v, c| v.one_of("currency", c, CURRENCIES));
        check_metadata(v, &self.metadata).finish()
    }
}

/// Body shared by `verify.json` calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyRequest {
    /// Merchant identifier.
    pub merchant_id: String,
    /// The amount originally requested.
    pub amount: u64,
    /// Authority returned by the payment request.
    pub authority: String,
}

impl Validate for VerifyRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .required("merchant_id", &self.merchant_id)
            .min("amount", self.amount, MIN_AMOUNT)
            .required("authority", &self.authority)
            .finish()
    }
}

/// Body of `POST /pg/v4/payment/unVerified.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnverifiedTransactionsRequest {
    /// Merchant identifier.
    pub merchant_id: String,
}

impl Validate for UnverifiedTransactionsRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .required("merchant_id", &self.merchant_id)
            .finish()
    }
}

/// One recipient of a floating share settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wage {
    /// Recipient IBAN, `IR` followed by 24 digits.
    pub iban: String,
    /// Recipient's share.
    pub amount: u64,
    /// Note shown in the settlement report.
    #[serde(default)]
    pub description: String,
}

impl Validate for Wage {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .iban("wages.iban", &self.iban)
            .min("wages.amount", self.amount, 1)
            .required("wages.description", &self.description)
            .finish()
    }
}

/// Payment request that splits the amount between several IBANs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloatingShareSettlementRequest {
    /// Merchant identifier.
    pub merchant_id: String,
    /// Total amount paid by the payer.
    pub amount: u64,
    /// Where the payer returns after paying.
    pub callback_url: String,
    /// Shown to the payer.
    pub description: String,
    /// Extra fields such as `mobile` or `email`.
    #[serde(skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
    /// Recipients and their shares.
    pub wages: Vec<Wage>,
}

impl Validate for FloatingShareSettlementRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new()
            .required("merchant_id", &self.merchant_id)
            .min("amount", self.amount, MIN_AMOUNT)
            .url("callback_url", &self.callback_url)
            .required("description", &self.description)
            .range("wages", self.wages.len() as u64, 1, MAX_WAGES as u64)
            .sum_max("wages.amount", self.wages.iter().map(|w| w.amount), self.amount);
        for wage in &self.wages {
            v = v.nested(wage);
        }
        check_metadata(v, &self.metadata).finish()
    }
}

/// Payload of a successful payment request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentData {
    /// `100` on success.
    pub code: i64,
    /// Provider message.
    #[serde(default)]
    pub message: String,
    /// Token identifying the payment; the payer is sent to `StartPay/<authority>`.
    pub authority: String,
    /// Who pays the fee, `Merchant` or `Payer`.
    #[serde(default)]
    pub fee_type: String,
    /// Fee amount.
    #[serde(default)]
    pub fee: u64,
}

/// Response of the payment request endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentResponse {
    /// The payload.
    pub data: PaymentData,
}

/// Payload of a successful verification.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VerifyData {
    /// `100` when verified now, `101` when verified before.
    pub code: i64,
    /// Provider message.
    #[serde(default)]
    pub message: String,
    /// Hash of the payer's card number.
    #[serde(default)]
    pub card_hash: String,
    /// Masked card number.
    #[serde(default)]
    pub card_pan: String,
    /// Bank reference number.
    pub ref_id: u64,
    /// Who paid the fee.
    #[serde(default)]
    pub fee_type: String,
    /// Fee amount.
    #[serde(default)]
    pub fee: u64,
}

/// Response of the verify endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VerifyResponse {
    /// The payload.
    pub data: VerifyData,
}

/// A paid transaction still waiting for verification.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UnverifiedAuthority {
    /// Payment authority.
    pub authority: String,
    /// Paid amount.
    pub amount: u64,
    /// Callback the payment was created with.
    pub callback_url: String,
    /// Referring page, if any.
    #[serde(default)]
    pub referer: String,
    /// Payment time as reported by Zarinpal.
    pub date: String,
}

/// Payload of the unverified transactions listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UnverifiedData {
    /// `100` on success.
    pub code: i64,
    /// Provider message.
    #[serde(default)]
    pub message: String,
    /// Transactions awaiting verification.
    #[serde(default)]
    pub authorities: Vec<UnverifiedAuthority>,
}

/// Response of the unverified transactions endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UnverifiedTransactionsResponse {
    /// The payload.
    pub data: UnverifiedData,
}

/// Response of a floating share settlement request.
pub type FloatingShareSettlementResponse = PaymentResponse;

/// Payload of a floating share settlement verification.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VerifyFloatingShareSettlementData {
    /// The verification fields.
    #[serde(flatten)]
    pub verify: VerifyData,
    /// Settled shares.
    #[serde(default)]
    pub wages: Vec<Wage>,
}

/// Response of a floating share settlement verification.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VerifyFloatingShareSettlementResponse {
    /// The payload.
    pub data: VerifyFloatingShareSettlementData,
}

/// The `errors` object of a failed call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorBody {
    /// Negative Zarinpal error code, e.g. `-9` for invalid input.
    pub code: i64,
    /// Provider message.
    pub message: String,
    /// Per-field details Zarinpal attaches to `-9`.
    #[serde(default)]
    pub validations: serde_json::Value,
}

/// Body of a failed call.
///
/// Zarinpal wraps the error in `errors`; some proxies and older endpoints
/// return the bare object. Both decode.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ErrorResponse {
    /// `{"errors": {"code": .., "message": ..}}`
    Wrapped {
        /// The error.
        errors: ErrorBody,
    },
    /// `{"code": .., "message": ..}`
    Bare(ErrorBody),
}

impl ErrorResponse {
    /// Returns the error object regardless of wrapping.
    #[must_use]
    pub const fn body(&self) -> &ErrorBody {
        match self {
            Self::Wrapped { errors } | Self::Bare(errors) => errors,
        }
    }
}

impl Rejection for ErrorResponse {
    fn code(&self) -> i64 {
        self.body().code
    }

    fn message(&self) -> String {
        self.body().message.clone()
    }
}
