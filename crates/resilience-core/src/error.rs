//! The shared error taxonomy for the resilience core, and its HTTP mapping.
//!
//! Every component crate defines its own narrow error enum (`CircuitOpen`,
//! `RateLimitExceeded`, ...); the facade composes them into
//! [`ResilienceCoreError`], which is what callers of
//! `resilience-manager::ResilienceManager::execute_request` see.

use std::time::{Duration, Instant};
use thiserror::Error;

/// A single source's failure while attempting `execute_request`, collected into
/// [`ResilienceCoreError::AllSourcesFailed`].
#[derive(Debug, Clone)]
pub struct PerSourceError {
    pub source_id: String,
    pub kind: String,
}

/// Error envelope returned by the resilience facade. Non-overlapping kinds per
/// the error handling design: per-source errors are absorbed by the failover
/// orchestrator and only escape as `AllSourcesFailed`.
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum ResilienceCoreError {
    /// Request shape or parameters failed validation. Never retried.
    #[error("validation error: {reason}")]
    ValidationError { reason: String },

    /// The request named a source id that was never registered.
    #[error("unknown source: {source_id}")]
    UnknownSource { source_id: String },

    /// Rate limit exhausted at the facade boundary (not a per-source skip).
    #[error("rate limit exceeded, retry after {retry_after:?}")]
    RateLimitExceeded { retry_after: Duration },

    /// Circuit breaker is open for the (sole) requested source.
    #[error("circuit open, next attempt at {next_attempt_at:?}")]
    CircuitOpen { next_attempt_at: Instant },

    /// A suspension point exceeded the request deadline.
    #[error("operation timed out")]
    Timeout,

    /// The request's cancellation signal fired before completion.
    #[error("request cancelled")]
    Cancelled,

    /// A source adapter returned an error (or failed to parse/validate its
    /// response).
    #[error("adapter error from {source_id}: {message}")]
    AdapterError { source_id: String, message: String },

    /// Every candidate source failed; see `per_source` for individual reasons.
    #[error("all {} candidate sources failed", per_source.len())]
    AllSourcesFailed { per_source: Vec<PerSourceError> },

    /// A source, or all eligible sources, failed compliance checks.
    #[error("compliance violation: {}", reasons.join(", "))]
    ComplianceViolation { reasons: Vec<String> },

    /// Fusion could not produce a valid combined result.
    #[error("fusion infeasible: {reason}")]
    FusionInfeasible { reason: String },
}

impl ResilienceCoreError {
    /// HTTP status mapping per the error envelope design: 400/404/422/429/503/504/500.
    pub fn http_status(&self) -> u16 {
        match self {
            ResilienceCoreError::ValidationError { .. } => 400,
            ResilienceCoreError::UnknownSource { .. } => 404,
            ResilienceCoreError::ComplianceViolation { .. } => 422,
            ResilienceCoreError::RateLimitExceeded { .. } => 429,
            ResilienceCoreError::AllSourcesFailed { .. } => 503,
            ResilienceCoreError::Timeout => 504,
            ResilienceCoreError::Cancelled => 499,
            ResilienceCoreError::CircuitOpen { .. }
            | ResilienceCoreError::AdapterError { .. }
            | ResilienceCoreError::FusionInfeasible { .. } => 500,
        }
    }

    /// Per the propagation policy: validation and compliance errors are
    /// terminal and must never be retried by an orchestrator.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ResilienceCoreError::ValidationError { .. }
                | ResilienceCoreError::ComplianceViolation { .. }
                | ResilienceCoreError::UnknownSource { .. }
        )
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ResilienceCoreError::RateLimitExceeded { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_matches_spec() {
        assert_eq!(
            ResilienceCoreError::ValidationError {
                reason: "x".into()
            }
            .http_status(),
            400
        );
        assert_eq!(
            ResilienceCoreError::UnknownSource {
                source_id: "x".into()
            }
            .http_status(),
            404
        );
        assert_eq!(
            ResilienceCoreError::ComplianceViolation { reasons: vec![] }.http_status(),
            422
        );
        assert_eq!(
            ResilienceCoreError::RateLimitExceeded {
                retry_after: Duration::from_secs(1)
            }
            .http_status(),
            429
        );
        assert_eq!(
            ResilienceCoreError::AllSourcesFailed { per_source: vec![] }.http_status(),
            503
        );
        assert_eq!(ResilienceCoreError::Timeout.http_status(), 504);
    }

    #[test]
    fn terminal_errors_are_not_retried() {
        assert!(
            ResilienceCoreError::ValidationError {
                reason: "x".into()
            }
            .is_terminal()
        );
        assert!(
            ResilienceCoreError::ComplianceViolation { reasons: vec![] }.is_terminal()
        );
        assert!(!ResilienceCoreError::Timeout.is_terminal());
    }
}
