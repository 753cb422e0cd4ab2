use resilience_core::PerSourceError;
use thiserror::Error;

/// Errors the orchestrator itself raises, as distinct from a single source's
/// [`PerSourceError`] (which is only ever collected, never bubbled directly).
#[derive(Debug, Error, Clone)]
pub enum FailoverError {
    /// `maxAttempts == 0`, or no candidate sources survived filtering.
    #[error("validation error: {reason}")]
    ValidationError { reason: String },

    /// Every attempted (or attemptable) source failed.
    #[error("all {} candidate sources failed", per_source.len())]
    AllSourcesFailed { per_source: Vec<PerSourceError> },
}
