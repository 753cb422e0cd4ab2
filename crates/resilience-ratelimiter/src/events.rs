use resilience_core::ResilienceEvent;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub enum RateLimiterEvent {
    PermitAcquired {
        source_id: String,
        timestamp: Instant,
    },
    PermitRejected {
        source_id: String,
        timestamp: Instant,
        retry_after: Duration,
    },
}

impl ResilienceEvent for RateLimiterEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RateLimiterEvent::PermitAcquired { .. } => "permit_acquired",
            RateLimiterEvent::PermitRejected { .. } => "permit_rejected",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            RateLimiterEvent::PermitAcquired { timestamp, .. }
            | RateLimiterEvent::PermitRejected { timestamp, .. } => *timestamp,
        }
    }

    fn subject(&self) -> &str {
        match self {
            RateLimiterEvent::PermitAcquired { source_id, .. }
            | RateLimiterEvent::PermitRejected { source_id, .. } => source_id,
        }
    }
}
