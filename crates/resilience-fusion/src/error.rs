use thiserror::Error;

/// Mirrors `ResilienceCoreError::FusionInfeasible` at the facade.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FusionError {
    #[error("fusion infeasible: {reason}")]
    Infeasible { reason: String },

    #[error("no successful contributions to fuse")]
    NoContributions,
}
