//! Fire-and-forget delivery of action results.
//!
//! Reproduces the behavior of the browser helper this workspace grew out of:
//! the continuation runs only when the call succeeded, and every failure
//! (transport, status, parse, `success` not true) is dropped without a trace.

use serde_json::Value;

use crate::error::ApiError;

/// Run `continuation` with the result on success, do nothing otherwise.
///
/// Returns whatever the continuation returned so async callers can hand back
/// a future and await the next link of a chain.
pub fn deliver<F, R>(outcome: Result<Value, ApiError>, continuation: F) -> Option<R>
where
    F: FnOnce(Value) -> R,
{
    match outcome {
        Ok(result) => Some(continuation(result)),
        Err(_) => None,
    }
}
