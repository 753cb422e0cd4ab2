use resilience_core::ResilienceEvent;
use std::time::Instant;

use crate::state::CircuitState;

/// Events emitted by a source's circuit breaker.
#[derive(Debug, Clone)]
pub enum CircuitBreakerEvent {
    StateTransition {
        source_id: String,
        timestamp: Instant,
        from: CircuitState,
        to: CircuitState,
    },
    CallPermitted {
        source_id: String,
        timestamp: Instant,
        state: CircuitState,
    },
    CallRejected {
        source_id: String,
        timestamp: Instant,
        next_attempt_at: Instant,
    },
    FailureRecorded {
        source_id: String,
        timestamp: Instant,
    },
    SuccessRecorded {
        source_id: String,
        timestamp: Instant,
    },
}

impl ResilienceEvent for CircuitBreakerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CircuitBreakerEvent::StateTransition { .. } => "state_transition",
            CircuitBreakerEvent::CallPermitted { .. } => "call_permitted",
            CircuitBreakerEvent::CallRejected { .. } => "call_rejected",
            CircuitBreakerEvent::FailureRecorded { .. } => "failure_recorded",
            CircuitBreakerEvent::SuccessRecorded { .. } => "success_recorded",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            CircuitBreakerEvent::StateTransition { timestamp, .. }
            | CircuitBreakerEvent::CallPermitted { timestamp, .. }
            | CircuitBreakerEvent::CallRejected { timestamp, .. }
            | CircuitBreakerEvent::FailureRecorded { timestamp, .. }
            | CircuitBreakerEvent::SuccessRecorded { timestamp, .. } => *timestamp,
        }
    }

    fn subject(&self) -> &str {
        match self {
            CircuitBreakerEvent::StateTransition { source_id, .. }
            | CircuitBreakerEvent::CallPermitted { source_id, .. }
            | CircuitBreakerEvent::CallRejected { source_id, .. }
            | CircuitBreakerEvent::FailureRecorded { source_id, .. }
            | CircuitBreakerEvent::SuccessRecorded { source_id, .. } => source_id,
        }
    }
}
