use std::collections::VecDeque;
use std::time::Instant;

/// The three states a per-source circuit breaker can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CircuitState {
    Closed = 0,
    Open = 1,
    HalfOpen = 2,
}

impl CircuitState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => CircuitState::Closed,
            1 => CircuitState::Open,
            _ => CircuitState::HalfOpen,
        }
    }
}

/// A read-only snapshot of a source's circuit breaker state, matching the
/// `CircuitBreakerState` data model: in `CLOSED`, `failure_timestamps.len() <
/// failure_threshold`; in `OPEN`, `next_attempt_at` is set; in `HALF_OPEN`,
/// `success_count <= success_threshold`.
#[derive(Debug, Clone)]
pub struct CircuitBreakerState {
    pub state: CircuitState,
    pub failure_timestamps: VecDeque<Instant>,
    pub success_count: usize,
    pub next_attempt_at: Option<Instant>,
    pub last_failure_at: Option<Instant>,
}

impl CircuitBreakerState {
    pub(crate) fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            failure_timestamps: VecDeque::new(),
            success_count: 0,
            next_attempt_at: None,
            last_failure_at: None,
        }
    }
}
