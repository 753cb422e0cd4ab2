use resilience_core::ResilienceEvent;
use resilience_types::Severity;
use std::time::Instant;

#[derive(Debug, Clone)]
pub enum ReliabilityEvent {
    SampleRecorded {
        source_id: String,
        timestamp: Instant,
        success: bool,
    },
    IncidentOpened {
        source_id: String,
        timestamp: Instant,
        incident_id: String,
        severity: Severity,
    },
    AlertRaised {
        source_id: String,
        timestamp: Instant,
        metric: &'static str,
        severity: Severity,
        value: f64,
    },
}

impl ResilienceEvent for ReliabilityEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ReliabilityEvent::SampleRecorded { .. } => "sample_recorded",
            ReliabilityEvent::IncidentOpened { .. } => "incident_opened",
            ReliabilityEvent::AlertRaised { .. } => "alert_raised",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            ReliabilityEvent::SampleRecorded { timestamp, .. }
            | ReliabilityEvent::IncidentOpened { timestamp, .. }
            | ReliabilityEvent::AlertRaised { timestamp, .. } => *timestamp,
        }
    }

    fn subject(&self) -> &str {
        match self {
            ReliabilityEvent::SampleRecorded { source_id, .. }
            | ReliabilityEvent::IncidentOpened { source_id, .. }
            | ReliabilityEvent::AlertRaised { source_id, .. } => source_id,
        }
    }
}
