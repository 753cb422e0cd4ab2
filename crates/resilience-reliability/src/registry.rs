use chrono::Utc;
use dashmap::DashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use resilience_core::EventListeners;
use resilience_types::{Incident, PerformancePoint, QualityAssessment, SourceMetrics};

use crate::config::ReliabilityConfig;
use crate::events::ReliabilityEvent;
use crate::tracker::{Alert, SourceTracker};

/// Owns one [`SourceTracker`] per source id.
pub struct ReliabilityRegistry {
    config: ReliabilityConfig,
    trackers: DashMap<String, Mutex<SourceTracker>>,
    listeners: EventListeners<ReliabilityEvent>,
}

impl ReliabilityRegistry {
    pub fn new(config: ReliabilityConfig) -> Self {
        Self {
            config,
            trackers: DashMap::new(),
            listeners: EventListeners::new(),
        }
    }

    pub fn with_listeners(mut self, listeners: EventListeners<ReliabilityEvent>) -> Self {
        self.listeners = listeners;
        self
    }

    pub fn register(&self, source_id: &str) {
        self.trackers
            .entry(source_id.to_string())
            .or_insert_with(|| Mutex::new(SourceTracker::new()));
    }

    pub fn deregister(&self, source_id: &str) {
        self.trackers.remove(source_id);
    }

    /// Ingests `{sourceId, latencyMs, success, qualityAssessment?}`, per
    /// `spec.md` §4.3, emitting events for the sample, any alerts, and any
    /// newly opened incident.
    pub fn record(
        &self,
        source_id: &str,
        sample: PerformancePoint,
        quality: Option<QualityAssessment>,
    ) -> Vec<Alert> {
        let Some(entry) = self.trackers.get(source_id) else {
            return Vec::new();
        };
        let mut tracker = entry.lock().expect("tracker mutex poisoned");
        let (alerts, incident) = tracker.record(source_id, sample, quality, &self.config);

        self.listeners.emit(&ReliabilityEvent::SampleRecorded {
            source_id: source_id.to_string(),
            timestamp: Instant::now(),
            success: sample.success,
        });
        for alert in &alerts {
            self.listeners.emit(&ReliabilityEvent::AlertRaised {
                source_id: source_id.to_string(),
                timestamp: Instant::now(),
                metric: alert.metric,
                severity: alert.severity,
                value: alert.value,
            });
        }
        if let Some(incident) = incident {
            self.listeners.emit(&ReliabilityEvent::IncidentOpened {
                source_id: source_id.to_string(),
                timestamp: Instant::now(),
                incident_id: incident.id,
                severity: incident.severity,
            });
        }

        alerts
    }

    pub fn metrics(&self, source_id: &str) -> Option<SourceMetrics> {
        self.trackers
            .get(source_id)
            .map(|e| e.lock().expect("tracker mutex poisoned").metrics())
    }

    pub fn incidents(&self, source_id: &str) -> Vec<Incident> {
        self.trackers
            .get(source_id)
            .map(|e| e.lock().expect("tracker mutex poisoned").incidents().to_vec())
            .unwrap_or_default()
    }

    pub fn resolve_incident(&self, source_id: &str, incident_id: &str) -> bool {
        self.trackers
            .get(source_id)
            .map(|e| {
                e.lock()
                    .expect("tracker mutex poisoned")
                    .resolve_incident(incident_id, Utc::now())
            })
            .unwrap_or(false)
    }

    pub fn source_ids(&self) -> Vec<String> {
        self.trackers.iter().map(|e| e.key().clone()).collect()
    }

    /// Maintenance sweep: trims samples beyond `retention` and drops
    /// resolved alerts/incidents older than `alert_retention`.
    pub fn maintenance(&self, retention: Duration, alert_retention: Duration) {
        let now = Utc::now();
        for entry in self.trackers.iter() {
            let mut tracker = entry.lock().expect("tracker mutex poisoned");
            tracker.trim_samples(now, retention);
            tracker.drop_alerts_older_than(now, alert_retention);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    #[test]
    fn per_source_isolation() {
        let registry = ReliabilityRegistry::new(ReliabilityConfig::standard());
        registry.register("A");
        registry.register("B");

        let now = Utc::now();
        registry.record(
            "A",
            PerformancePoint { timestamp: now, latency: StdDuration::from_millis(50), success: false },
            None,
        );

        assert!(registry.metrics("A").unwrap().uptime_pct < 100.0);
        assert_eq!(registry.metrics("B").unwrap().uptime_pct, 100.0);
    }

    #[test]
    fn unregistered_source_is_ignored() {
        let registry = ReliabilityRegistry::new(ReliabilityConfig::standard());
        let alerts = registry.record(
            "unknown",
            PerformancePoint { timestamp: Utc::now(), latency: StdDuration::from_millis(50), success: true },
            None,
        );
        assert!(alerts.is_empty());
        assert!(registry.metrics("unknown").is_none());
    }
}
