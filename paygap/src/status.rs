//! Normalized error taxonomy for gateway calls.
//!
//! Every failure surfaced by an adapter is a [`Status`]. Providers disagree on
//! field names, HTTP codes and error payloads; the dispatcher folds all of that
//! into five mutually exclusive [`ErrorKind`]s so callers can tell "the gateway
//! declined this payment" apart from "we never reached the gateway".
//!
//! | kind                 | code          | HTTP status | rpc code          |
//! |----------------------|---------------|-------------|-------------------|
//! | `Configuration`      | 0             | 400         | `InvalidArgument` |
//! | `Validation`         | 0             | 400         | `InvalidArgument` |
//! | `Transport`          | 0             | 500         | `Internal`        |
//! | `ProviderRejection`  | provider code | 424         | `Ok`              |
//! | `Decode`             | 0             | 500         | `Internal`        |

use std::fmt;

use http::StatusCode;

use crate::transport::TransportError;
use crate::validate::ValidationErrors;

/// Which stage of a call produced the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The adapter could not be constructed (missing transport, malformed credentials).
    Configuration,
    /// The request failed local field constraints and was never sent.
    Validation,
    /// The HTTP exchange itself failed (connect, timeout, body read).
    Transport,
    /// The provider answered, but rejected the call with its own code and message.
    ProviderRejection,
    /// A JSON body could not be encoded or decoded.
    Decode,
}

impl ErrorKind {
    /// Returns the `snake_case` name of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Validation => "validation",
            Self::Transport => "transport",
            Self::ProviderRejection => "provider_rejection",
            Self::Decode => "decode",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// RPC-style protocol status attached to every [`Status`].
///
/// Mirrors the subset of gRPC codes gateway calls can produce. A provider
/// rejection carries [`Code::Ok`]: the call worked mechanically, only the
/// business outcome failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Code {
    /// The exchange completed.
    Ok,
    /// The caller supplied something unusable.
    InvalidArgument,
    /// Something broke on our side of the wire.
    Internal,
}

impl Code {
    /// Returns the canonical upper-snake name of the code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized gateway error.
///
/// Carries the domain code reported by the provider (zero when the error did
/// not come from the provider), an HTTP-like status, an RPC-like status and a
/// human-readable message. Low-level error text is preserved in the message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("[{rpc_code}] {}", with_code(.code, .message))]
pub struct Status {
    kind: ErrorKind,
    code: i64,
    http_status: StatusCode,
    rpc_code: Code,
    message: String,
}

impl Status {
    /// The message used when an adapter is built without a transport.
    pub const CLIENT_NIL_MESSAGE: &'static str = "transport client is nil";

    /// Creates a status from raw parts.
    #[must_use]
    pub fn new(
        kind: ErrorKind,
        code: i64,
        http_status: StatusCode,
        rpc_code: Code,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            code,
            http_status,
            rpc_code,
            message: message.into(),
        }
    }

    /// Adapter configuration is malformed.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::Configuration,
            0,
            StatusCode::BAD_REQUEST,
            Code::InvalidArgument,
            message,
        )
    }

    /// Adapter was built without a transport.
    #[must_use]
    pub fn client_nil() -> Self {
        Self::configuration(Self::CLIENT_NIL_MESSAGE)
    }

    /// A request failed local validation.
    #[must_use]
    pub fn validation(errors: &ValidationErrors) -> Self {
        Self::new(
            ErrorKind::Validation,
            0,
            StatusCode::BAD_REQUEST,
            Code::InvalidArgument,
            errors.to_string(),
        )
    }

    /// The transport failed before a response was available.
    #[must_use]
    pub fn transport(error: &TransportError) -> Self {
        Self::new(
            ErrorKind::Transport,
            0,
            StatusCode::INTERNAL_SERVER_ERROR,
            Code::Internal,
            error.to_string(),
        )
    }

    /// The provider rejected the call with its own code and message.
    #[must_use]
    pub fn rejection(code: i64, message: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::ProviderRejection,
            code,
            StatusCode::FAILED_DEPENDENCY,
            Code::Ok,
            message,
        )
    }

    /// A JSON body could not be encoded or decoded.
    #[must_use]
    pub fn decode(error: &serde_json::Error) -> Self {
        Self::new(
            ErrorKind::Decode,
            0,
            StatusCode::INTERNAL_SERVER_ERROR,
            Code::Internal,
            error.to_string(),
        )
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the domain code (the provider's own code for rejections, otherwise 0).
    #[must_use]
    pub const fn code(&self) -> i64 {
        self.code
    }

    /// Returns the HTTP-like status.
    #[must_use]
    pub const fn http_status(&self) -> StatusCode {
        self.http_status
    }

    /// Returns the RPC-like protocol status.
    #[must_use]
    pub const fn rpc_code(&self) -> Code {
        self.rpc_code
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns `true` if the provider declined the call.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        self.kind == ErrorKind::ProviderRejection
    }

    /// Returns `true` if the request never left the process because it was invalid.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        self.kind == ErrorKind::Validation
    }
}

/// Prefixes `message` with the domain code unless it is zero.
#[allow(clippy::trivially_copy_pass_by_ref)]
fn with_code(code: &i64, message: &str) -> String {
    if *code == 0 {
        message.to_owned()
    } else {
        format!("{code}: {message}")
    }
}
