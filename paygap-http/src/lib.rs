#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! HTTP transport for the paygap payment gateway client.
//!
//! Provides [`HttpTransport`], a [`paygap::Transport`] backed by `reqwest`.
//! Adapters in `paygap-providers` accept any transport; this is the one to
//! use outside tests.
//!
//! # Modules
//!
//! - [`constants`] - Header values, timeouts and other defaults
//! - [`transport`] - The `reqwest` transport and its configuration (feature: `client`)
//!
//! # Feature Flags
//!
//! - `client` (default) - Builds the `reqwest` transport
//! - `telemetry` - Enables tracing instrumentation of HTTP requests

pub mod constants;

#[cfg(feature = "client")]
pub mod transport;

#[cfg(feature = "client")]
pub use transport::{HttpTransport, HttpTransportConfig};
