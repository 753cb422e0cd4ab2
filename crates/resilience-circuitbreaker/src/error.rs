use std::time::Instant;
use thiserror::Error;

/// Errors returned by [`crate::registry::CircuitBreakerRegistry::execute`].
#[derive(Debug, Error)]
pub enum CircuitBreakerError<E> {
    /// The circuit is open; the call was never invoked.
    #[error("circuit open, next attempt at {next_attempt_at:?}")]
    Open { next_attempt_at: Instant },

    /// The call exceeded its deadline; recorded as a failure.
    #[error("call timed out")]
    Timeout,

    /// The call was cancelled before completion; not recorded as either a
    /// success or a failure.
    #[error("call cancelled")]
    Cancelled,

    /// The wrapped function returned an error; recorded as a failure.
    #[error("inner error: {0}")]
    Inner(E),
}

impl<E> CircuitBreakerError<E> {
    pub fn is_open(&self) -> bool {
        matches!(self, CircuitBreakerError::Open { .. })
    }

    pub fn into_inner(self) -> Option<E> {
        match self {
            CircuitBreakerError::Inner(e) => Some(e),
            _ => None,
        }
    }
}
