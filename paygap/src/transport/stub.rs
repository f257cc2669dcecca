//! In-memory [`Transport`] test double.
//!
//! [`StubTransport`] replays a scripted reply for every call and records what
//! it was asked to send, so adapter behavior can be checked without a network.

use std::sync::{Mutex, PoisonError};

use bytes::Bytes;

use super::{ApiCall, BoxFuture, Transport, TransportError, TransportResponse};

/// A call observed by [`StubTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// The descriptor the dispatcher built.
    pub call: ApiCall,
    /// The serialized request body, if any.
    pub body: Option<Vec<u8>>,
}

impl RecordedCall {
    /// Decodes the recorded body as JSON.
    ///
    /// Returns `Value::Null` when no body was sent or it was not JSON.
    #[must_use]
    pub fn json_body(&self) -> serde_json::Value {
        self.body
            .as_deref()
            .and_then(|b| serde_json::from_slice(b).ok())
            .unwrap_or(serde_json::Value::Null)
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Respond { status: u16, body: Bytes },
    Fail(String),
}

/// Transport that answers every call with the same scripted reply.
#[derive(Debug)]
pub struct StubTransport {
    reply: Reply,
    calls: Mutex<Vec<RecordedCall>>,
}

impl StubTransport {
    /// Answers every call with `status` and `body`.
    #[must_use]
    pub fn replying(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            reply: Reply::Respond {
                status,
                body: body.into(),
            },
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answers every call with `status` and `body` serialized as JSON.
    #[must_use]
    pub fn replying_json(status: u16, body: &serde_json::Value) -> Self {
        Self::replying(status, body.to_string())
    }

    /// Fails every call with [`TransportError::Request`].
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Reply::Fail(message.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Returns every call observed so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of calls observed so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns the most recent call, if any.
    #[must_use]
    pub fn last_call(&self) -> Option<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl Transport for StubTransport {
    fn send<'a>(
        &'a self,
        call: &'a ApiCall,
        body: Option<Vec<u8>>,
    ) -> BoxFuture<'a, Result<TransportResponse, TransportError>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                call: call.clone(),
                body,
            });
        let reply = self.reply.clone();
        Box::pin(async move {
            match reply {
                Reply::Respond { status, body } => Ok(TransportResponse::new(status, body)),
                Reply::Fail(message) => Err(TransportError::Request(message)),
            }
        })
    }
}
