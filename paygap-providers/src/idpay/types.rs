//! Wire types for the IDPay v1.1 payment API.
//!
//! IDPay is loose about number encoding: the same field may arrive as a JSON
//! number or as a numeric string depending on the endpoint, so numeric
//! response fields accept both.

use paygap::Rejection;
use paygap::validate::{Validate, ValidationErrors, Validator};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};

/// Smallest amount IDPay accepts, in rials.
pub const MIN_AMOUNT: u64 = 1_000;
/// Largest amount IDPay accepts, in rials.
pub const MAX_AMOUNT: u64 = 500_000_000;
/// Longest merchant order id.
pub const MAX_ORDER_ID_LEN: usize = 50;
/// Longest free-text field.
pub const MAX_TEXT_LEN: usize = 255;

/// Body of `POST /v1.1/payment`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaymentRequest {
    /// Merchant order id, unique per payment.
    pub order_id: String,
    /// Amount in rials.
    pub amount: u64,
    /// Payer name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Payer mobile number, `09xxxxxxxxx`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Payer email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mail: Option<String>,
    /// Description shown to the payer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// Where the payer returns after paying.
    pub callback: String,
}

impl Validate for PaymentRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .required("order_id", &self.order_id)
            .max_len("order_id", &self.order_id, MAX_ORDER_ID_LEN)
            .range("amount", self.amount, MIN_AMOUNT, MAX_AMOUNT)
            .optional(self.name.as_deref(), |v, s| v.max_len("name", s, MAX_TEXT_LEN))
            .optional(self.phone.as_deref(), |v, s| v.mobile("phone", s))
            .optional(self.mail.as_deref(), |v, s| v.email("mail", s))
            .optional(self.desc.as_deref(), |v, s| v.max_len("desc", s, MAX_TEXT_LEN))
            .url("callback", &self.callback)
            .finish()
    }
}

/// Response of `POST /v1.1/payment`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentResponse {
    /// IDPay transaction id.
    pub id: String,
    /// Payment page the payer must be redirected to.
    pub link: String,
}

/// Identifies a transaction by IDPay id and merchant order id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransactionRef {
    /// IDPay transaction id.
    pub id: String,
    /// Merchant order id.
    pub order_id: String,
}

impl TransactionRef {
    /// Creates a reference.
    #[must_use]
    pub fn new(id: impl Into<String>, order_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            order_id: order_id.into(),
        }
    }
}

impl Validate for TransactionRef {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .required("id", &self.id)
            .required("order_id", &self.order_id)
            .max_len("order_id", &self.order_id, MAX_ORDER_ID_LEN)
            .finish()
    }
}

/// Body of `POST /v1.1/payment/verify`.
pub type VerifyRequest = TransactionRef;

/// Body of `POST /v1.1/payment/inquiry`.
pub type TransactionStatusRequest = TransactionRef;

/// Transaction states reported in `status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionStatus {
    /// `1`: created, not paid.
    NotPaid,
    /// `2`: payment failed.
    Failed,
    /// `3`: an error occurred.
    Error,
    /// `4`: blocked.
    Blocked,
    /// `5`: returned to payer.
    ReturnedToPayer,
    /// `6`: reversed by the system.
    Reversed,
    /// `7`: cancelled by the payer.
    Cancelled,
    /// `8`: redirected to the payment page.
    Redirected,
    /// `10`: paid, waiting for verification.
    AwaitingVerification,
    /// `100`: paid and verified.
    Verified,
    /// `101`: already verified.
    AlreadyVerified,
    /// `200`: settled to the merchant.
    Settled,
}

impl TransactionStatus {
    /// Maps a numeric status, returning `None` for codes IDPay does not document.
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            1 => Self::NotPaid,
            2 => Self::Failed,
            3 => Self::Error,
            4 => Self::Blocked,
            5 => Self::ReturnedToPayer,
            6 => Self::Reversed,
            7 => Self::Cancelled,
            8 => Self::Redirected,
            10 => Self::AwaitingVerification,
            100 => Self::Verified,
            101 => Self::AlreadyVerified,
            200 => Self::Settled,
            _ => return None,
        })
    }

    /// Returns `true` if the payer's money reached IDPay.
    #[must_use]
    pub const fn is_paid(self) -> bool {
        matches!(
            self,
            Self::AwaitingVerification | Self::Verified | Self::AlreadyVerified | Self::Settled
        )
    }
}

/// Card payment details of a transaction.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PaymentDetail {
    /// Bank tracking number.
    pub track_id: String,
    /// Paid amount.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub amount: u64,
    /// Masked card number.
    pub card_no: String,
    /// Hash of the card number.
    pub hashed_card_no: String,
    /// Unix timestamp of the payment.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub date: u64,
}

/// When a transaction was verified.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VerifyDetail {
    /// Unix timestamp of the verification.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub date: u64,
}

/// Response of `POST /v1.1/payment/verify`.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VerifyResponse {
    /// Transaction status code, see [`TransactionStatus`].
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub status: i64,
    /// IDPay tracking number.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub track_id: i64,
    /// IDPay transaction id.
    pub id: String,
    /// Merchant order id.
    pub order_id: String,
    /// Transaction amount.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub amount: u64,
    /// Unix timestamp of creation.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[serde(default)]
    pub date: u64,
    /// Card payment details.
    #[serde(default)]
    pub payment: PaymentDetail,
    /// Verification details.
    #[serde(default)]
    pub verify: VerifyDetail,
}

impl VerifyResponse {
    /// Returns the decoded transaction status.
    #[must_use]
    pub const fn transaction_status(&self) -> Option<TransactionStatus> {
        TransactionStatus::from_code(self.status)
    }
}

/// Fee charged on a transaction.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Wage {
    /// Who pays the fee, `payee` or `payer`.
    pub by: String,
    /// Fee type, e.g. `amount` or `percent`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Fee amount.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub amount: u64,
}

/// Payer details submitted with the payment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Payer {
    /// Payer name.
    pub name: String,
    /// Payer mobile number.
    pub phone: String,
    /// Payer email.
    pub mail: String,
    /// Description.
    pub desc: String,
}

/// Settlement of the transaction to the merchant.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settlement {
    /// Settlement tracking number.
    pub track_id: String,
    /// Settled amount.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub amount: u64,
    /// Unix timestamp of the settlement.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub date: u64,
}

/// Response of `POST /v1.1/payment/inquiry`, also used for list records.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransactionStatusResponse {
    /// Transaction status code, see [`TransactionStatus`].
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub status: i64,
    /// IDPay tracking number.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub track_id: i64,
    /// IDPay transaction id.
    pub id: String,
    /// Merchant order id.
    pub order_id: String,
    /// Transaction amount.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub amount: u64,
    /// Fee details.
    #[serde(default)]
    pub wage: Wage,
    /// Unix timestamp of creation.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[serde(default)]
    pub date: u64,
    /// Payer details.
    #[serde(default)]
    pub payer: Payer,
    /// Card payment details.
    #[serde(default)]
    pub payment: PaymentDetail,
    /// Verification details.
    #[serde(default)]
    pub verify: VerifyDetail,
    /// Settlement details.
    #[serde(default)]
    pub settlement: Settlement,
}

impl TransactionStatusResponse {
    /// Returns the decoded transaction status.
    #[must_use]
    pub const fn transaction_status(&self) -> Option<TransactionStatus> {
        TransactionStatus::from_code(self.status)
    }
}

/// Inclusive unix timestamp range used by list filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DateRange {
    /// Lower bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u64>,
    /// Upper bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u64>,
}

/// Filters and paging for `POST /v1.1/payment/transactions`.
///
/// `page` and `page_size` travel as query parameters, and only when
/// `page_size` is non-zero; the remaining fields form the body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransactionListRequest {
    /// Zero-based page number.
    #[serde(skip)]
    pub page: u32,
    /// Records per page; `0` leaves paging to IDPay.
    #[serde(skip)]
    pub page_size: u32,
    /// IDPay transaction id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Merchant order id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Exact amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
    /// Status codes to include.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub status: Vec<i64>,
    /// IDPay tracking number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_id: Option<String>,
    /// Masked card number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_card_no: Option<String>,
    /// Hash of the card number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_hashed_card_no: Option<String>,
    /// Payment time range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<DateRange>,
    /// Settlement time range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settlement_date: Option<DateRange>,
}

impl TransactionListRequest {
    /// Returns the query parameters for this page, empty when `page_size` is `0`.
    #[must_use]
    pub fn query(&self) -> std::collections::BTreeMap<String, String> {
        let mut query = std::collections::BTreeMap::new();
        if self.page_size != 0 {
            query.insert("page".to_owned(), self.page.to_string());
            query.insert("page_size".to_owned(), self.page_size.to_string());
        }
        query
    }
}

impl Validate for TransactionListRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .optional(self.order_id.as_deref(), |v, s| {
                v.max_len("order_id", s, MAX_ORDER_ID_LEN)
            })
            .finish()
    }
}

/// Paging information of a transaction list.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Attachment {
    /// Server time of the listing.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub timestamp: u64,
    /// Matching records across all pages.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub total_count: u64,
    /// Number of pages.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub page_count: u64,
    /// This page.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub page: u64,
    /// Records per page.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub page_size: u64,
}

/// Response of `POST /v1.1/payment/transactions`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransactionListResponse {
    /// Paging information.
    #[serde(default)]
    pub attachment: Attachment,
    /// Matching transactions.
    #[serde(default)]
    pub records: Vec<TransactionStatusResponse>,
}

/// Body of a failed call.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorResponse {
    /// IDPay error code, e.g. `32` for a missing order id.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub error_code: i64,
    /// Provider message.
    pub error_message: String,
}

impl Rejection for ErrorResponse {
    fn code(&self) -> i64 {
        self.error_code
    }

    fn message(&self) -> String {
        self.error_message.clone()
    }
}
