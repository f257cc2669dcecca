//! Callback contracts for webhook-confirmed payments.
//!
//! Some providers (IDPay among them) redirect the payer back to the merchant
//! with the payment outcome, either as a form `POST` or as `GET` query
//! parameters. Receiving that request is the host web framework's job; this
//! module only fixes the shapes and the handler signatures.

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};

use crate::status::Status;
use crate::transport::BoxFuture;

/// Outcome delivered by a `POST` callback.
///
/// Numeric fields accept both JSON numbers and numeric strings, since form
/// encoded callbacks carry everything as text.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostCallback {
    /// Provider transaction status code.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub status: i64,
    /// Provider tracking number.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub track_id: i64,
    /// Provider transaction id.
    pub id: String,
    /// Merchant order id.
    pub order_id: String,
    /// Paid amount.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub amount: u64,
    /// Masked card number, e.g. `123456******1234`.
    pub card_no: String,
    /// Hash of the full card number.
    pub hashed_card_no: String,
    /// Unix timestamp of the payment.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub date: u64,
}

/// Outcome delivered by a `GET` callback.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetCallback {
    /// Provider transaction status code.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub status: i64,
    /// Provider tracking number.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub track_id: i64,
    /// Provider transaction id.
    pub id: String,
    /// Merchant order id.
    pub order_id: String,
}

/// Caller-supplied handler for `POST` callbacks.
pub trait PostCallbackHandler: Send + Sync {
    /// Handles one callback.
    fn handle(&self, callback: PostCallback) -> BoxFuture<'_, Result<(), Status>>;
}

/// Caller-supplied handler for `GET` callbacks.
pub trait GetCallbackHandler: Send + Sync {
    /// Handles one callback.
    fn handle(&self, callback: GetCallback) -> BoxFuture<'_, Result<(), Status>>;
}

impl<F> PostCallbackHandler for F
where
    F: Fn(PostCallback) -> BoxFuture<'static, Result<(), Status>> + Send + Sync,
{
    fn handle(&self, callback: PostCallback) -> BoxFuture<'_, Result<(), Status>> {
        self(callback)
    }
}

impl<F> GetCallbackHandler for F
where
    F: Fn(GetCallback) -> BoxFuture<'static, Result<(), Status>> + Send + Sync,
{
    fn handle(&self, callback: GetCallback) -> BoxFuture<'_, Result<(), Status>> {
        self(callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_callback_accepts_stringly_numbers() {
        let callback: PostCallback = serde_json::from_value(serde_json::json!({
            "status": "100",
            "track_id": 10012,
            "id": "d2e353189823079e1e4181772cff5292",
            "order_id": "101",
            "amount": "10000",
            "card_no": "123456******1234",
            "hashed_card_no": "E59FA6241C94B8836E3D03120DF33E80FD988888BBA0A122240C2E7D23B48295",
            "date": "1546288500"
        }))
        .unwrap();
        assert_eq!(callback.status, 100);
        assert_eq!(callback.track_id, 10012);
        assert_eq!(callback.amount, 10000);
        assert_eq!(callback.date, 1_546_288_500);
    }

    #[tokio::test]
    async fn closures_are_handlers() {
        let handler = |cb: GetCallback| -> BoxFuture<'static, Result<(), Status>> {
            Box::pin(async move {
                if cb.status == 10 {
                    Ok(())
                } else {
                    Err(Status::rejection(cb.status, "payment not completed"))
                }
            })
        };
        let ok = GetCallback {
            status: 10,
            track_id: 1,
            id: "x".into(),
            order_id: "o".into(),
        };
        assert!(GetCallbackHandler::handle(&handler, ok.clone()).await.is_ok());
        let failed = GetCallback { status: 7, ..ok };
        let err = GetCallbackHandler::handle(&handler, failed).await.unwrap_err();
        assert_eq!(err.code(), 7);
    }
}
