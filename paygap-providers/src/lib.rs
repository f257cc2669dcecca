#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Payment gateway adapters built on the `paygap` dispatch core.
//!
//! Each adapter holds a provider's credentials, endpoint table and host, and
//! exposes the provider's business operations. Every operation builds a
//! typed request, validates it, and hands it to [`paygap::dispatch()`]; the
//! result is either the provider's typed response or a [`paygap::Status`].
//!
//! | Adapter                 | API   | Auth                    | Sandbox               |
//! |-------------------------|-------|-------------------------|-----------------------|
//! | [`zarinpal::Zarinpal`]  | v4    | `merchant_id` in body   | separate host         |
//! | [`idpay::IdPay`]        | v1.1  | `X-API-KEY` header      | `X-SANDBOX: 1` header |
//! | [`payping::PayPing`]    | v2    | bearer token            | none                  |
//!
//! # Example
//!
//! ```no_run
//! # async fn run() -> Result<(), paygap::Status> {
//! use paygap_http::{HttpTransport, HttpTransportConfig};
//! use paygap_providers::zarinpal::Zarinpal;
//!
//! let transport = HttpTransport::new(HttpTransportConfig::default())
//!     .map_err(|e| paygap::Status::transport(&e))?
//!     .shared();
//! let zarinpal = Zarinpal::builder()
//!     .transport(transport)
//!     .merchant_id("xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx")
//!     .sandbox(true)
//!     .build()?;
//!
//! let payment = zarinpal
//!     .request_payment(10_000, "https://shop.example/back", "IRT", "order #42", Default::default())
//!     .await?;
//! println!("redirect to {}", zarinpal.payment_url(&payment.data.authority));
//! # Ok(())
//! # }
//! ```
//!
//! # Feature Flags
//!
//! - `zarinpal`, `idpay`, `payping` (default) - The individual adapters
//! - `config` - TOML configuration loading ([`config`])
//! - `telemetry` - Enables tracing instrumentation

mod adapter;

pub use adapter::Provider;

#[cfg(feature = "config")]
pub mod config;
#[cfg(feature = "idpay")]
pub mod idpay;
#[cfg(feature = "payping")]
pub mod payping;
#[cfg(feature = "zarinpal")]
pub mod zarinpal;
