#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for the paygap payment gateway client.
//!
//! Payment gateways expose mutually incompatible REST APIs: different hosts,
//! field names, success codes and error payloads. This crate holds the part
//! they can share: a generic validate, send, decode and normalize pipeline.
//! Concrete gateways are thin adapters over it, provided by `paygap-providers`;
//! the production HTTP transport lives in `paygap-http`.
//!
//! # Modules
//!
//! - [`dispatch`] - The generic request pipeline and the provider rejection trait
//! - [`status`] - Normalized error taxonomy ([`Status`], [`ErrorKind`])
//! - [`transport`] - Transport contract, call descriptors and an in-memory stub
//! - [`validate`] - Field validation contract and rule helpers
//! - [`metadata`] - Schema-free request metadata
//! - [`callback`] - Callback payload shapes and handler contracts
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation of every dispatched call

pub mod callback;
pub mod dispatch;
pub mod metadata;
pub mod status;
pub mod transport;
pub mod validate;

pub use dispatch::{Rejection, dispatch};
pub use metadata::Metadata;
pub use status::{Code, ErrorKind, Status};
pub use transport::{ApiCall, Method, SharedTransport, Transport, TransportError, TransportResponse};
pub use validate::{Validate, ValidationErrors, Validator};
