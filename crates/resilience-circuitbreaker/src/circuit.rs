use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;

use resilience_core::EventListeners;

use crate::config::CircuitBreakerConfig;
use crate::events::CircuitBreakerEvent;
use crate::state::{CircuitBreakerState, CircuitState};

/// The mutable, per-source state machine. One instance lives behind a mutex
/// per source id in [`crate::registry::CircuitBreakerRegistry`]; all mutation
/// for a given source is serialized by that mutex.
pub(crate) struct Circuit {
    inner: CircuitBreakerState,
    /// Mirrors `inner.state` for lock-free reads from status/health endpoints.
    state_atomic: Arc<AtomicU8>,
}

impl Circuit {
    pub(crate) fn new(state_atomic: Arc<AtomicU8>) -> Self {
        Self {
            inner: CircuitBreakerState::new(),
            state_atomic,
        }
    }

    pub(crate) fn snapshot(&self) -> CircuitBreakerState {
        self.inner.clone()
    }

    pub(crate) fn state(&self) -> CircuitState {
        self.inner.state
    }

    /// Drops failure timestamps older than the monitoring window. A failure
    /// exactly `monitoring_window` old is excluded (strict `<` comparison).
    fn prune_failures(&mut self, now: Instant, config: &CircuitBreakerConfig) {
        while let Some(&front) = self.inner.failure_timestamps.front() {
            if now.duration_since(front) < config.monitoring_window {
                break;
            }
            self.inner.failure_timestamps.pop_front();
        }
    }

    /// Attempts to permit a call. Performs the `OPEN -> HALF_OPEN` transition
    /// inline when `now >= next_attempt_at` (the boundary call itself
    /// proceeds; no timer thread is needed).
    pub(crate) fn try_acquire(
        &mut self,
        source_id: &str,
        config: &CircuitBreakerConfig,
        listeners: &EventListeners<CircuitBreakerEvent>,
    ) -> Result<(), Instant> {
        let now = Instant::now();
        match self.inner.state {
            CircuitState::Closed => {
                listeners.emit(&CircuitBreakerEvent::CallPermitted {
                    source_id: source_id.to_string(),
                    timestamp: now,
                    state: self.inner.state,
                });
                Ok(())
            }
            CircuitState::Open => {
                let next_attempt_at = self
                    .inner
                    .next_attempt_at
                    .expect("OPEN state always carries next_attempt_at");
                if now >= next_attempt_at {
                    self.transition_to(CircuitState::HalfOpen, source_id, config, listeners);
                    listeners.emit(&CircuitBreakerEvent::CallPermitted {
                        source_id: source_id.to_string(),
                        timestamp: now,
                        state: CircuitState::HalfOpen,
                    });
                    Ok(())
                } else {
                    listeners.emit(&CircuitBreakerEvent::CallRejected {
                        source_id: source_id.to_string(),
                        timestamp: now,
                        next_attempt_at,
                    });
                    Err(next_attempt_at)
                }
            }
            CircuitState::HalfOpen => {
                // Only one probe in flight is allowed at a time; further
                // calls queue behind the outcome of the current probe by
                // being rejected until it resolves. We model "in flight"
                // conservatively: if we've already recorded a result this
                // half-open period we continue to permit calls up to the
                // success threshold.
                listeners.emit(&CircuitBreakerEvent::CallPermitted {
                    source_id: source_id.to_string(),
                    timestamp: now,
                    state: self.inner.state,
                });
                Ok(())
            }
        }
    }

    pub(crate) fn record_success(
        &mut self,
        source_id: &str,
        config: &CircuitBreakerConfig,
        listeners: &EventListeners<CircuitBreakerEvent>,
    ) {
        let now = Instant::now();
        listeners.emit(&CircuitBreakerEvent::SuccessRecorded {
            source_id: source_id.to_string(),
            timestamp: now,
        });

        match self.inner.state {
            CircuitState::Closed => {
                // "CLOSED success resets the failure window."
                self.inner.failure_timestamps.clear();
            }
            CircuitState::HalfOpen => {
                self.inner.success_count += 1;
                if self.inner.success_count >= config.success_threshold {
                    self.transition_to(CircuitState::Closed, source_id, config, listeners);
                }
            }
            CircuitState::Open => {
                // A success can only be recorded after `try_acquire`
                // transitioned us out of OPEN; nothing to do here.
            }
        }
    }

    pub(crate) fn record_failure(
        &mut self,
        source_id: &str,
        config: &CircuitBreakerConfig,
        listeners: &EventListeners<CircuitBreakerEvent>,
    ) {
        let now = Instant::now();
        self.inner.last_failure_at = Some(now);
        listeners.emit(&CircuitBreakerEvent::FailureRecorded {
            source_id: source_id.to_string(),
            timestamp: now,
        });

        match self.inner.state {
            CircuitState::Closed => {
                self.prune_failures(now, config);
                self.inner.failure_timestamps.push_back(now);
                if self.inner.failure_timestamps.len() >= config.failure_threshold {
                    self.transition_to(CircuitState::Open, source_id, config, listeners);
                }
            }
            CircuitState::HalfOpen => {
                self.transition_to(CircuitState::Open, source_id, config, listeners);
            }
            CircuitState::Open => {}
        }
    }

    fn transition_to(
        &mut self,
        to: CircuitState,
        source_id: &str,
        config: &CircuitBreakerConfig,
        listeners: &EventListeners<CircuitBreakerEvent>,
    ) {
        let from = self.inner.state;
        if from == to {
            return;
        }

        #[cfg(feature = "tracing")]
        tracing::info!(source_id, ?from, ?to, "circuit breaker state transition");

        listeners.emit(&CircuitBreakerEvent::StateTransition {
            source_id: source_id.to_string(),
            timestamp: Instant::now(),
            from,
            to,
        });

        #[cfg(feature = "metrics")]
        {
            metrics::counter!(
                "resilience_circuitbreaker_transitions_total",
                "source_id" => source_id.to_string(),
            )
            .increment(1);
        }

        self.inner.state = to;
        self.state_atomic.store(to as u8, Ordering::Release);
        self.inner.failure_timestamps.clear();
        self.inner.success_count = 0;

        self.inner.next_attempt_at = match to {
            CircuitState::Open => Some(Instant::now() + config.open_timeout),
            _ => None,
        };
    }

    /// Used by maintenance sweeps: resets a circuit stuck `OPEN` for more
    /// than `grace` past its `next_attempt_at` straight back to `CLOSED`.
    pub(crate) fn force_reset_if_stuck(
        &mut self,
        source_id: &str,
        grace: std::time::Duration,
        config: &CircuitBreakerConfig,
        listeners: &EventListeners<CircuitBreakerEvent>,
    ) -> bool {
        if self.inner.state != CircuitState::Open {
            return false;
        }
        let Some(next_attempt_at) = self.inner.next_attempt_at else {
            return false;
        };
        if Instant::now() >= next_attempt_at + grace {
            self.transition_to(CircuitState::Closed, source_id, config, listeners);
            true
        } else {
            false
        }
    }
}
