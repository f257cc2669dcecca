//! The generic request pipeline shared by every adapter.
//!
//! [`dispatch`] takes an already validated request and an [`ApiCall`], runs
//! the exchange through a [`Transport`] and turns the outcome into exactly
//! one of a decoded response or a [`Status`]:
//!
//! 1. serialize the request body (failure: `Decode`)
//! 2. send it (failure: `Transport`, no retry)
//! 3. status `200` or `201`: decode the body as `Resp` (failure: `Decode`)
//! 4. any other status: decode the body as the provider's rejection type
//!    `Rej` and return a `ProviderRejection` carrying its code and message
//!    (failure: `Decode`)
//!
//! Requests are not validated here; adapters validate right before calling in.

use std::fmt::Display;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::status::Status;
use crate::transport::{ApiCall, Transport};

#[cfg(feature = "telemetry")]
use tracing::Span;

/// A provider's failure body.
///
/// Providers name their error fields differently (`error_code`,
/// `errors.code`, ...); each adapter maps its own names with serde attributes
/// and exposes them through this trait.
pub trait Rejection: DeserializeOwned {
    /// The provider's error code.
    fn code(&self) -> i64;
    /// The provider's human-readable message.
    fn message(&self) -> String;
}

/// Returns `true` for the statuses treated as success: exactly `200` and `201`.
#[must_use]
pub const fn is_success(status: u16) -> bool {
    status == 200 || status == 201
}

/// Sends `request` as described by `call` and decodes the outcome.
///
/// `request` is serialized as the JSON body; pass `None` for body-less calls.
///
/// # Errors
///
/// Returns a [`Status`] of kind `Transport`, `ProviderRejection` or `Decode`
/// as described in the module docs.
#[cfg_attr(
    feature = "telemetry",
    tracing::instrument(
        name = "paygap.dispatch",
        skip_all,
        fields(
            method = %call.method,
            host = %call.host,
            path = %call.path,
            otel.status_code = tracing::field::Empty,
            error.message = tracing::field::Empty,
        )
    )
)]
pub async fn dispatch<Req, Resp, Rej>(
    transport: &dyn Transport,
    call: &ApiCall,
    request: Option<&Req>,
) -> Result<Resp, Status>
where
    Req: Serialize + Sync + ?Sized,
    Resp: DeserializeOwned,
    Rej: Rejection,
{
    let result = exchange::<Req, Resp, Rej>(transport, call, request).await;
    record_result_on_span(&result);
    result
}

async fn exchange<Req, Resp, Rej>(
    transport: &dyn Transport,
    call: &ApiCall,
    request: Option<&Req>,
) -> Result<Resp, Status>
where
    Req: Serialize + Sync + ?Sized,
    Resp: DeserializeOwned,
    Rej: Rejection,
{
    let body = request
        .map(serde_json::to_vec)
        .transpose()
        .map_err(|e| Status::decode(&e))?;

    let response = transport
        .send(call, body)
        .await
        .map_err(|e| Status::transport(&e))?;

    if !is_success(response.raw_status()) {
        let rejection = response.json::<Rej>().map_err(|e| Status::decode(&e))?;
        return Err(Status::rejection(rejection.code(), rejection.message()));
    }

    response.json::<Resp>().map_err(|e| Status::decode(&e))
}

/// Records the outcome of a dispatch on the current span.
#[cfg(feature = "telemetry")]
fn record_result_on_span<R, E: Display>(result: &Result<R, E>) {
    let span = Span::current();
    match result {
        Ok(_) => {
            span.record("otel.status_code", "OK");
            tracing::debug!("gateway call succeeded");
        }
        Err(err) => {
            span.record("otel.status_code", "ERROR");
            span.record("error.message", tracing::field::display(err));
            tracing::warn!(error = %err, "gateway call failed");
        }
    }
}

/// Records the outcome of a dispatch on the current span.
/// Noop if telemetry feature is off.
#[cfg(not(feature = "telemetry"))]
fn record_result_on_span<R, E: Display>(_result: &Result<R, E>) {}
