//! HTTP-specific constants for gateway calls.

/// Content type of every request body.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default `User-Agent` header value.
pub const DEFAULT_USER_AGENT: &str = concat!("paygap/", env!("CARGO_PKG_VERSION"));

/// Maximum number of redirects followed before giving up.
pub const MAX_REDIRECTS: usize = 10;
