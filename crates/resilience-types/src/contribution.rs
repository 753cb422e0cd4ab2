//! `SourceContribution`: one source's result participating in a fusion
//! computation, per `spec.md` §3.

use std::time::Duration;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContributionStatus {
    Success,
    Error,
    Timeout,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SourceContribution<T> {
    pub source_id: String,
    pub status: ContributionStatus,
    pub data: Option<T>,
    pub latency: Duration,
    /// `[0,1]`.
    pub confidence: f64,
    /// `[0.1,1.0]`, per the fusion weight formula's clamp bounds.
    pub weight: f64,
}

impl<T> SourceContribution<T> {
    pub fn is_success(&self) -> bool {
        matches!(self.status, ContributionStatus::Success) && self.data.is_some()
    }
}
