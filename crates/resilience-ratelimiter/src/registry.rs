use chrono::Utc;
use dashmap::DashMap;
use std::sync::Mutex;
use std::time::Instant;

use resilience_core::EventListeners;

use crate::config::RateLimitConfig;
use crate::error::RateLimitExceeded;
use crate::events::RateLimiterEvent;
use crate::limiter::{RemainingPermits, SourceWindows};

/// Owns the second/hour/day counters for every registered source.
pub struct RateLimiterRegistry {
    entries: DashMap<String, Mutex<SourceWindows>>,
    listeners: EventListeners<RateLimiterEvent>,
}

impl RateLimiterRegistry {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            listeners: EventListeners::new(),
        }
    }

    pub fn with_listeners(mut self, listeners: EventListeners<RateLimiterEvent>) -> Self {
        self.listeners = listeners;
        self
    }

    /// Idempotent: re-registering an existing source id is a no-op so that
    /// in-flight counters survive a duplicate `registerSource` call.
    pub fn register(&self, source_id: &str, config: RateLimitConfig) {
        self.entries
            .entry(source_id.to_string())
            .or_insert_with(|| Mutex::new(SourceWindows::new(config, Utc::now())));
    }

    pub fn deregister(&self, source_id: &str) {
        self.entries.remove(source_id);
    }

    /// Atomically checks and (on success) consumes one permit from all three
    /// windows for `source_id`.
    pub fn acquire(&self, source_id: &str) -> Result<(), RateLimitExceeded> {
        let entry = self
            .entries
            .get(source_id)
            .expect("source must be registered before use");
        let mut windows = entry.lock().expect("rate limiter mutex poisoned");
        let now = Utc::now();

        match windows.try_acquire(now) {
            Ok(()) => {
                self.listeners.emit(&RateLimiterEvent::PermitAcquired {
                    source_id: source_id.to_string(),
                    timestamp: Instant::now(),
                });
                Ok(())
            }
            Err(retry_after) => {
                self.listeners.emit(&RateLimiterEvent::PermitRejected {
                    source_id: source_id.to_string(),
                    timestamp: Instant::now(),
                    retry_after,
                });
                Err(RateLimitExceeded { retry_after })
            }
        }
    }

    pub fn remaining(&self, source_id: &str) -> Option<RemainingPermits> {
        let entry = self.entries.get(source_id)?;
        let mut windows = entry.lock().expect("rate limiter mutex poisoned");
        Some(windows.remaining(Utc::now()))
    }
}

impl Default for RateLimiterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_source_isolation() {
        let registry = RateLimiterRegistry::new();
        registry.register("A", RateLimitConfig::builder().per_second(1).build());
        registry.register("B", RateLimitConfig::builder().per_second(1).build());

        assert!(registry.acquire("A").is_ok());
        assert!(registry.acquire("A").is_err());
        // B's window is independent of A's.
        assert!(registry.acquire("B").is_ok());
    }

    #[test]
    fn register_is_idempotent() {
        let registry = RateLimiterRegistry::new();
        registry.register("A", RateLimitConfig::builder().per_second(1).build());
        assert!(registry.acquire("A").is_ok());

        // Re-registering must not reset the already-consumed permit.
        registry.register("A", RateLimitConfig::builder().per_second(1).build());
        assert!(registry.acquire("A").is_err());
    }
}
