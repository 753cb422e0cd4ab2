use dashmap::DashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use resilience_core::{CancelToken, Deadline, EventListeners, RunOutcome};

use crate::circuit::Circuit;
use crate::config::CircuitBreakerConfig;
use crate::error::CircuitBreakerError;
use crate::events::CircuitBreakerEvent;
use crate::state::{CircuitBreakerState, CircuitState};

struct Entry {
    circuit: Mutex<Circuit>,
    config: CircuitBreakerConfig,
    state_atomic: Arc<AtomicU8>,
}

/// Owns one circuit breaker per source id. Thread-safe: mutation for a given
/// source is serialized by that source's mutex; reads of `state()` are
/// lock-free via an atomic mirror.
pub struct CircuitBreakerRegistry {
    default_config: CircuitBreakerConfig,
    entries: DashMap<String, Entry>,
    listeners: EventListeners<CircuitBreakerEvent>,
}

impl CircuitBreakerRegistry {
    pub fn new(default_config: CircuitBreakerConfig) -> Self {
        Self {
            default_config,
            entries: DashMap::new(),
            listeners: EventListeners::new(),
        }
    }

    pub fn with_listeners(mut self, listeners: EventListeners<CircuitBreakerEvent>) -> Self {
        self.listeners = listeners;
        self
    }

    /// Idempotent: registering the same source id twice leaves its existing
    /// state untouched and only updates the config for future transitions.
    pub fn register(&self, source_id: &str, config: Option<CircuitBreakerConfig>) {
        self.entries.entry(source_id.to_string()).or_insert_with(|| {
            let state_atomic = Arc::new(AtomicU8::new(CircuitState::Closed as u8));
            Entry {
                circuit: Mutex::new(Circuit::new(Arc::clone(&state_atomic))),
                config: config.unwrap_or(self.default_config),
                state_atomic,
            }
        });
    }

    pub fn deregister(&self, source_id: &str) {
        self.entries.remove(source_id);
    }

    /// Lock-free read of a source's current state, for status/health
    /// endpoints that must not contend with in-flight calls.
    pub fn state(&self, source_id: &str) -> Option<CircuitState> {
        self.entries
            .get(source_id)
            .map(|e| CircuitState::from_u8(e.state_atomic.load(Ordering::Acquire)))
    }

    pub fn snapshot(&self, source_id: &str) -> Option<CircuitBreakerState> {
        self.entries
            .get(source_id)
            .map(|e| e.circuit.lock().expect("circuit mutex poisoned").snapshot())
    }

    pub fn is_open(&self, source_id: &str) -> bool {
        matches!(self.state(source_id), Some(CircuitState::Open))
    }

    pub fn open_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| CircuitState::from_u8(e.value().state_atomic.load(Ordering::Acquire)) == CircuitState::Open)
            .count()
    }

    pub fn source_ids(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.key().clone()).collect()
    }

    fn try_acquire(&self, source_id: &str) -> Result<(), Instant> {
        let entry = self
            .entries
            .get(source_id)
            .expect("source must be registered before use");
        let mut circuit = entry.circuit.lock().expect("circuit mutex poisoned");
        circuit.try_acquire(source_id, &entry.config, &self.listeners)
    }

    fn record_success(&self, source_id: &str) {
        if let Some(entry) = self.entries.get(source_id) {
            let mut circuit = entry.circuit.lock().expect("circuit mutex poisoned");
            circuit.record_success(source_id, &entry.config, &self.listeners);
        }
    }

    fn record_failure(&self, source_id: &str) {
        if let Some(entry) = self.entries.get(source_id) {
            let mut circuit = entry.circuit.lock().expect("circuit mutex poisoned");
            circuit.record_failure(source_id, &entry.config, &self.listeners);
        }
    }

    /// Executes `fut_factory`'s future under circuit breaker + deadline +
    /// cancellation guards. Timeouts are recorded as failures; cancellations
    /// record nothing, per the propagation policy.
    pub async fn execute<F, Fut, T, E>(
        &self,
        source_id: &str,
        deadline: Deadline,
        cancel: &mut CancelToken,
        fut_factory: F,
    ) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.try_acquire(source_id)
            .map_err(|next_attempt_at| CircuitBreakerError::Open { next_attempt_at })?;

        match resilience_core::deadline::run_with_deadline(fut_factory(), deadline, cancel).await {
            RunOutcome::Completed(Ok(value)) => {
                self.record_success(source_id);
                Ok(value)
            }
            RunOutcome::Completed(Err(err)) => {
                self.record_failure(source_id);
                Err(CircuitBreakerError::Inner(err))
            }
            RunOutcome::TimedOut => {
                self.record_failure(source_id);
                Err(CircuitBreakerError::Timeout)
            }
            RunOutcome::Cancelled => Err(CircuitBreakerError::Cancelled),
        }
    }

    /// Maintenance sweep: resets circuits stuck `OPEN` more than `grace`
    /// past their `next_attempt_at`.
    pub fn reset_stuck_open(&self, grace: Duration) -> usize {
        let mut reset = 0;
        for entry in self.entries.iter() {
            let mut circuit = entry.circuit.lock().expect("circuit mutex poisoned");
            if circuit.force_reset_if_stuck(entry.key(), grace, &entry.config, &self.listeners) {
                entry
                    .state_atomic
                    .store(circuit.state() as u8, Ordering::Release);
                reset += 1;
            }
        }
        reset
    }
}
