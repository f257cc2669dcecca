//! Wire types for the PayPing v2 payment API. Field names are camelCase.

use paygap::Rejection;
use paygap::validate::{Validate, ValidationErrors, Validator};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::{DisplayFromStr, PickFirst, serde_as};

/// Smallest amount PayPing accepts, in tomans.
pub const MIN_AMOUNT: u64 = 100;
/// Largest amount PayPing accepts, in tomans.
pub const MAX_AMOUNT: u64 = 50_000_000;

/// Body of `POST /v2/pay`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    /// Amount in tomans.
    pub amount: u64,
    /// Payer mobile number or email, shown on the payment page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer_identity: Option<String>,
    /// Payer name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer_name: Option<String>,
    /// Description shown to the payer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Where the payer returns after paying.
    pub return_url: String,
    /// Merchant reference echoed back in the callback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ref_id: Option<String>,
}

impl Validate for PaymentRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .range("amount", self.amount, MIN_AMOUNT, MAX_AMOUNT)
            .url("returnUrl", &self.return_url)
            .finish()
    }
}

/// Response of `POST /v2/pay` and `POST /v2/pay/multi`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentResponse {
    /// Payment code; the payer is sent to `gotoipg/<code>`.
    pub code: String,
}

/// Body of `POST /v2/pay/verify`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    /// Reference id PayPing sent to the return URL.
    pub ref_id: String,
    /// The amount originally requested.
    pub amount: u64,
}

impl Validate for VerifyRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .required("refId", &self.ref_id)
            .range("amount", self.amount, MIN_AMOUNT, MAX_AMOUNT)
            .finish()
    }
}

/// Response of `POST /v2/pay/verify`.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    /// Verified amount.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub amount: u64,
    /// Masked card number.
    #[serde(default)]
    pub card_number: String,
    /// Hash of the card number.
    #[serde(default)]
    pub card_hash_pan: String,
}

/// One payee of a multiple payment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Pair {
    /// PayPing username of the payee.
    pub name: String,
    /// Payee's share.
    pub amount: u64,
    /// Note for the payee.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl Validate for Pair {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .required("pairs.name", &self.name)
            .min("pairs.amount", self.amount, MIN_AMOUNT)
            .finish()
    }
}

/// Body of `POST /v2/pay/multi`: one payment split between several PayPing users.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiplePaymentRequest {
    /// Payees and their shares; the payer pays their sum.
    pub pairs: Vec<Pair>,
    /// Payer mobile number or email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer_identity: Option<String>,
    /// Payer name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer_name: Option<String>,
    /// Description shown to the payer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Where the payer returns after paying.
    pub return_url: String,
    /// Merchant reference echoed back in the callback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ref_id: Option<String>,
}

impl Validate for MultiplePaymentRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new()
            .min("pairs", self.pairs.len() as u64, 1)
            .sum_max("amount", self.pairs.iter().map(|p| p.amount), MAX_AMOUNT)
            .url("returnUrl", &self.return_url);
        for pair in &self.pairs {
            v = v.nested(pair);
        }
        v.finish()
    }
}

/// Body of a failed call.
///
/// PayPing reports errors as an object keyed by a numeric code
/// (`{"12": "message"}`), by field name (`{"amount": "message"}`), or as
/// `{"code", "message"}`. All of them decode; field-keyed errors get code `0`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct ErrorResponse {
    /// Error code, `0` when PayPing sent none.
    pub code: i64,
    /// Provider message.
    pub message: String,
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

impl From<Map<String, Value>> for ErrorResponse {
    fn from(body: Map<String, Value>) -> Self {
        if let Some(code) = body.get("code").and_then(number) {
            let message = body.get("message").map(text).unwrap_or_default();
            return Self { code, message };
        }
        if let Some((code, message)) = body
            .iter()
            .find_map(|(k, v)| k.parse::<i64>().ok().map(|code| (code, text(v))))
        {
            return Self { code, message };
        }
        let message = body
            .iter()
            .map(|(k, v)| format!("{k}: {}", text(v)))
            .collect::<Vec<_>>()
            .join("; ");
        Self { code: 0, message }
    }
}

impl Rejection for ErrorResponse {
    fn code(&self) -> i64 {
        self.code
    }

    fn message(&self) -> String {
        self.message.clone()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn error(body: Value) -> ErrorResponse {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn numeric_key_error_decodes() {
        let err = error(json!({"12": "مبلغ وارد شده صحیح نیست"}));
        assert_eq!(err.code, 12);
        assert_eq!(err.message, "مبلغ وارد شده صحیح نیست");
    }

    #[test]
    fn code_message_error_decodes() {
        let err = error(json!({"code": "15", "message": "invalid token"}));
        assert_eq!(err.code, 15);
        assert_eq!(err.message, "invalid token");
    }

    #[test]
    fn field_keyed_error_keeps_all_messages() {
        let err = error(json!({"amount": "too small", "returnUrl": "required"}));
        assert_eq!(err.code, 0);
        assert_eq!(err.message, "amount: too small; returnUrl: required");
    }

    #[test]
    fn non_object_error_is_rejected() {
        assert!(serde_json::from_value::<ErrorResponse>(json!("oops")).is_err());
    }

    #[test]
    fn request_fields_are_camel_case() {
        let request = PaymentRequest {
            amount: 1000,
            payer_identity: Some("09123456789".into()),
            return_url: "https://shop.example/back".into(),
            client_ref_id: Some("order-7".into()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "amount": 1000,
                "payerIdentity": "09123456789",
                "returnUrl": "https://shop.example/back",
                "clientRefId": "order-7"
            })
        );
    }

    #[test]
    fn multiple_payment_needs_payees() {
        let request = MultiplePaymentRequest {
            return_url: "https://shop.example/back".into(),
            ..Default::default()
        };
        assert!(request.validate().unwrap_err().has("pairs"));
    }
}
