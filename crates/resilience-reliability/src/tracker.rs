use chrono::{DateTime, Utc};
use std::collections::VecDeque;

use resilience_types::{Incident, IncidentType, PerformancePoint, QualityAssessment, Severity, SourceMetrics};

use crate::config::ReliabilityConfig;

/// A threshold breach surfaced by [`SourceTracker::record`], per the alert
/// thresholds in `spec.md` §4.3.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alert {
    pub metric: &'static str,
    pub value: f64,
    pub severity: Severity,
}

/// One source's rolling window of samples, incidents, and derived metrics.
/// Owned by [`crate::registry::ReliabilityRegistry`] behind a per-source
/// mutex; nothing here is shared across sources.
pub struct SourceTracker {
    samples: VecDeque<PerformancePoint>,
    quality_history: VecDeque<QualityAssessment>,
    incidents: Vec<Incident>,
    metrics: SourceMetrics,
    active_outage: bool,
    next_incident_seq: u64,
}

impl SourceTracker {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::new(),
            quality_history: VecDeque::new(),
            incidents: Vec::new(),
            metrics: SourceMetrics::default(),
            active_outage: false,
            next_incident_seq: 0,
        }
    }

    fn prune(&mut self, now: DateTime<Utc>, config: &ReliabilityConfig) {
        let window = chrono::Duration::from_std(config.sample_window).unwrap_or(chrono::Duration::zero());
        while let Some(front) = self.samples.front() {
            if now - front.timestamp < window {
                break;
            }
            self.samples.pop_front();
        }
    }

    /// Ingests one sample (and optional quality assessment), recomputes the
    /// rolling metrics, evaluates the incident-creation rule, and returns
    /// any alerts raised by this sample.
    pub fn record(
        &mut self,
        source_id: &str,
        sample: PerformancePoint,
        quality: Option<QualityAssessment>,
        config: &ReliabilityConfig,
    ) -> (Vec<Alert>, Option<Incident>) {
        let now = sample.timestamp;
        self.samples.push_back(sample);
        self.prune(now, config);

        if let Some(q) = quality {
            self.quality_history.push_back(q);
            while self.quality_history.len() > config.quality_history {
                self.quality_history.pop_front();
            }
        }

        self.recompute(config);

        let new_incident = if !sample.success {
            self.check_incident(source_id, now, config)
        } else {
            None
        };

        let alerts = self.evaluate_alerts(config);
        (alerts, new_incident)
    }

    fn recompute(&mut self, config: &ReliabilityConfig) {
        let total = self.samples.len();
        let successes: Vec<&PerformancePoint> = self.samples.iter().filter(|p| p.success).collect();
        let success_count = successes.len();

        let uptime_pct = if total == 0 {
            100.0
        } else {
            success_count as f64 / total as f64 * 100.0
        };
        // "successRate (same numerator policy as uptime)".
        let success_rate_pct = uptime_pct;

        let latencies_ms: Vec<f64> = successes.iter().map(|p| p.latency.as_secs_f64() * 1000.0).collect();
        let avg_response_time_ms = if latencies_ms.is_empty() {
            0.0
        } else {
            latencies_ms.iter().sum::<f64>() / latencies_ms.len() as f64
        };

        let consistency_score = if latencies_ms.len() < 2 || avg_response_time_ms == 0.0 {
            1.0
        } else {
            let mean = avg_response_time_ms;
            let variance = latencies_ms.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / latencies_ms.len() as f64;
            let stddev = variance.sqrt();
            (1.0 - stddev / mean).clamp(0.0, 1.0)
        };

        let (data_quality_score, freshness_score) = if self.quality_history.is_empty() {
            (1.0, 1.0)
        } else {
            let n = self.quality_history.len() as f64;
            let quality = self.quality_history.iter().map(|q| q.overall()).sum::<f64>() / n;
            let freshness = self.quality_history.iter().map(|q| q.timeliness).sum::<f64>() / n;
            (quality, freshness)
        };

        let user_satisfaction = 0.30 * (uptime_pct / 100.0)
            + 0.20 * (1.0 - (avg_response_time_ms / 3000.0).min(1.0))
            + 0.30 * data_quality_score
            + 0.20 * consistency_score;

        self.metrics = SourceMetrics {
            uptime_pct,
            avg_response_time_ms,
            success_rate_pct,
            data_quality_score,
            consistency_score,
            freshness_score,
            user_satisfaction,
        };
        let _ = config;
    }

    /// "Three or more failures within the last 5 minutes create an outage
    /// incident with severity critical if >=5 failures else high." Opens at
    /// most one incident per breach, but an already-open incident is
    /// upgraded to `Critical` in place if later failures in the same breach
    /// push the window count past `incident_critical_failures` — otherwise
    /// a breach that starts at the `high` threshold and worsens would be
    /// stuck reporting `high` forever.
    fn check_incident(&mut self, source_id: &str, now: DateTime<Utc>, config: &ReliabilityConfig) -> Option<Incident> {
        let window = chrono::Duration::from_std(config.incident_window).unwrap_or(chrono::Duration::zero());
        let failures_in_window = self
            .samples
            .iter()
            .filter(|p| !p.success && now - p.timestamp < window)
            .count();

        if failures_in_window >= config.incident_min_failures {
            let severity = if failures_in_window >= config.incident_critical_failures {
                Severity::Critical
            } else {
                Severity::High
            };

            if self.active_outage {
                let open_incident = self.incidents.iter_mut().rev().find(|i| i.source_id == source_id && i.resolved_at.is_none());
                return match open_incident {
                    Some(incident) if incident.severity != severity && severity == Severity::Critical => {
                        incident.severity = severity;
                        incident.description = format!("{failures_in_window} failures within the last {:?}", config.incident_window);
                        Some(incident.clone())
                    }
                    _ => None,
                };
            }

            self.active_outage = true;
            self.next_incident_seq += 1;
            let incident = Incident {
                id: format!("{source_id}-outage-{}", self.next_incident_seq),
                source_id: source_id.to_string(),
                created_at: now,
                kind: IncidentType::Outage,
                severity,
                description: format!("{failures_in_window} failures within the last {:?}", config.incident_window),
                resolved_at: None,
            };
            self.incidents.push(incident.clone());
            Some(incident)
        } else {
            self.active_outage = false;
            None
        }
    }

    fn evaluate_alerts(&self, config: &ReliabilityConfig) -> Vec<Alert> {
        let m = &self.metrics;
        let mut alerts = Vec::new();

        if m.uptime_pct < config.uptime_critical {
            alerts.push(Alert { metric: "uptime", value: m.uptime_pct, severity: Severity::Critical });
        } else if m.uptime_pct < config.uptime_warn {
            alerts.push(Alert { metric: "uptime", value: m.uptime_pct, severity: Severity::Medium });
        }

        if m.avg_response_time_ms > config.response_time_critical_ms {
            alerts.push(Alert { metric: "avg_response_time_ms", value: m.avg_response_time_ms, severity: Severity::Critical });
        } else if m.avg_response_time_ms > config.response_time_warn_ms {
            alerts.push(Alert { metric: "avg_response_time_ms", value: m.avg_response_time_ms, severity: Severity::Medium });
        }

        if m.success_rate_pct < config.success_rate_critical {
            alerts.push(Alert { metric: "success_rate", value: m.success_rate_pct, severity: Severity::Critical });
        } else if m.success_rate_pct < config.success_rate_warn {
            alerts.push(Alert { metric: "success_rate", value: m.success_rate_pct, severity: Severity::Medium });
        }

        if m.data_quality_score < config.quality_critical {
            alerts.push(Alert { metric: "data_quality_score", value: m.data_quality_score, severity: Severity::Critical });
        } else if m.data_quality_score < config.quality_warn {
            alerts.push(Alert { metric: "data_quality_score", value: m.data_quality_score, severity: Severity::Medium });
        }

        alerts
    }

    pub fn metrics(&self) -> SourceMetrics {
        self.metrics
    }

    pub fn incidents(&self) -> &[Incident] {
        &self.incidents
    }

    pub fn resolve_incident(&mut self, incident_id: &str, at: DateTime<Utc>) -> bool {
        if let Some(incident) = self.incidents.iter_mut().find(|i| i.id == incident_id) {
            incident.resolve(at);
            true
        } else {
            false
        }
    }

    /// Maintenance: drop samples beyond retention (normally already bounded
    /// by the 24h window, but `maintenance()` lets the facade apply a
    /// shorter override) and resolved incidents past their own retention.
    pub fn trim_samples(&mut self, now: DateTime<Utc>, retention: std::time::Duration) {
        let window = chrono::Duration::from_std(retention).unwrap_or(chrono::Duration::zero());
        while let Some(front) = self.samples.front() {
            if now - front.timestamp < window {
                break;
            }
            self.samples.pop_front();
        }
    }

    pub fn drop_alerts_older_than(&mut self, now: DateTime<Utc>, retention: std::time::Duration) {
        let window = chrono::Duration::from_std(retention).unwrap_or(chrono::Duration::zero());
        self.incidents.retain(|i| now - i.created_at < window || !i.is_resolved());
    }
}

impl Default for SourceTracker {
    fn default() -> Self {
        Self::new()
    }
}
