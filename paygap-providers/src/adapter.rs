//! Construction and per-call checks shared by every adapter.

use paygap::{SharedTransport, Status, Validate};

/// Identity of a configured gateway adapter.
pub trait Provider {
    /// Short provider name, e.g. `"idpay"`.
    fn name(&self) -> &'static str;

    /// Host every call of this adapter is sent to.
    fn base_url(&self) -> &str;

    /// Returns `true` if the adapter talks to the provider's test environment.
    fn is_sandbox(&self) -> bool;
}

/// Fails with [`Status::client_nil`] when no transport was supplied.
pub(crate) fn require_transport(
    transport: Option<SharedTransport>,
) -> Result<SharedTransport, Status> {
    transport.ok_or_else(Status::client_nil)
}

/// Checks assembled adapter configuration; violations are configuration errors.
pub(crate) fn check_config<C: Validate + ?Sized>(config: &C) -> Result<(), Status> {
    config
        .validate()
        .map_err(|e| Status::configuration(e.to_string()))
}

/// Checks a request right before dispatch; violations are validation errors.
pub(crate) fn check_request<R: Validate + ?Sized>(request: &R) -> Result<(), Status> {
    request.validate().map_err(|e| Status::validation(&e))
}
