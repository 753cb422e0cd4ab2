use thiserror::Error;

/// Mirrors `ResilienceCoreError::ComplianceViolation` at the facade.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("compliance violation: {}", reasons.join(", "))]
pub struct ComplianceViolation {
    pub reasons: Vec<String>,
}
