//! `SourceMetrics`, `PerformancePoint`, and `Incident`, per `spec.md` §3.
//! Owned and mutated by the reliability tracker; everything here is a plain
//! value so it can be handed out by-value through read-only accessors.

use chrono::{DateTime, Utc};
use std::time::Duration;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncidentType {
    Outage,
    Degradation,
    DataQuality,
    RateLimit,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Incident {
    pub id: String,
    pub source_id: String,
    pub created_at: DateTime<Utc>,
    pub kind: IncidentType,
    pub severity: Severity,
    pub description: String,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Incident {
    pub fn is_resolved(&self) -> bool {
        self.resolved_at.is_some()
    }

    /// Once `resolved_at` is set, the incident is immutable: resolving an
    /// already-resolved incident is a no-op, matching the data model
    /// invariant in `spec.md` §3.
    pub fn resolve(&mut self, at: DateTime<Utc>) {
        if self.resolved_at.is_none() {
            self.resolved_at = Some(at);
        }
    }
}

/// A single latency/outcome sample fed to the reliability tracker.
#[derive(Debug, Clone, Copy)]
pub struct PerformancePoint {
    pub timestamp: DateTime<Utc>,
    pub latency: Duration,
    pub success: bool,
}

/// A `[0,1]` quality assessment attached to a sample (optional, per
/// `spec.md` §4.3's ingest contract).
#[derive(Debug, Clone, Copy)]
pub struct QualityAssessment {
    pub accuracy: f64,
    pub completeness: f64,
    pub consistency: f64,
    pub timeliness: f64,
    pub validity: f64,
    pub uniqueness: f64,
}

impl QualityAssessment {
    /// `overall = 0.25*accuracy + 0.20*completeness + 0.15*consistency +
    /// 0.15*timeliness + 0.15*validity + 0.10*uniqueness`.
    pub fn overall(&self) -> f64 {
        0.25 * self.accuracy
            + 0.20 * self.completeness
            + 0.15 * self.consistency
            + 0.15 * self.timeliness
            + 0.15 * self.validity
            + 0.10 * self.uniqueness
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceMetrics {
    pub uptime_pct: f64,
    pub avg_response_time_ms: f64,
    pub success_rate_pct: f64,
    pub data_quality_score: f64,
    pub consistency_score: f64,
    pub freshness_score: f64,
    pub user_satisfaction: f64,
}

impl Default for SourceMetrics {
    fn default() -> Self {
        Self {
            uptime_pct: 100.0,
            avg_response_time_ms: 0.0,
            success_rate_pct: 100.0,
            data_quality_score: 1.0,
            consistency_score: 1.0,
            freshness_score: 1.0,
            user_satisfaction: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolving_twice_keeps_first_timestamp() {
        let first = Utc::now();
        let mut incident = Incident {
            id: "i1".into(),
            source_id: "A".into(),
            created_at: first,
            kind: IncidentType::Outage,
            severity: Severity::High,
            description: "3 failures in 5 minutes".into(),
            resolved_at: None,
        };
        incident.resolve(first);
        let later = first + chrono::Duration::seconds(60);
        incident.resolve(later);
        assert_eq!(incident.resolved_at, Some(first));
    }

    #[test]
    fn quality_assessment_weights_match_spec() {
        let assessment = QualityAssessment {
            accuracy: 1.0,
            completeness: 1.0,
            consistency: 1.0,
            timeliness: 1.0,
            validity: 1.0,
            uniqueness: 1.0,
        };
        assert!((assessment.overall() - 1.0).abs() < 1e-9);
    }
}
