//! Schema-free metadata attached to payment requests.
//!
//! Every provider accepts a different bag of extra fields (mobile, email,
//! order id, card pan, ...). [`Metadata`] is a JSON object whose values are any
//! JSON type, serialized as-is into the request body.

use serde_json::Value;

/// Free-form key/value metadata.
pub type Metadata = serde_json::Map<String, Value>;

/// Builds a [`Metadata`] map from key/value pairs.
///
/// ```rust
/// use paygap::metadata::metadata;
///
/// let meta = metadata([("mobile", "09123456789".into()), ("order_id", 42.into())]);
/// assert_eq!(meta["order_id"], 42);
/// ```
#[must_use]
pub fn metadata<I, K>(entries: I) -> Metadata
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    entries.into_iter().map(|(k, v)| (k.into(), v)).collect()
}
