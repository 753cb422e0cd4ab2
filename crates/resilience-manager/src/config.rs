//! Tunables for [`crate::ResilienceManager`] that are not already owned by
//! one of the component registries.

use std::time::Duration;

/// Default alert retention used by `maintenance()`, per `spec.md` §4.9.
pub const DEFAULT_ALERT_RETENTION: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Grace period past `nextAttemptAt` before a stuck-`OPEN` circuit is reset
/// by `maintenance()`, per `spec.md` §4.9.
pub const STUCK_OPEN_GRACE: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Copy)]
pub struct ResilienceManagerConfig {
    pub circuit_breaker: resilience_circuitbreaker::CircuitBreakerConfig,
    pub reliability: resilience_reliability::ReliabilityConfig,
    pub default_max_attempts: u32,
    pub default_max_sources: usize,
    pub sample_retention: Duration,
    pub alert_retention: Duration,
}

impl Default for ResilienceManagerConfig {
    fn default() -> Self {
        Self {
            circuit_breaker: resilience_circuitbreaker::CircuitBreakerConfig::standard(),
            reliability: resilience_reliability::ReliabilityConfig::default(),
            default_max_attempts: 3,
            default_max_sources: 3,
            sample_retention: Duration::from_secs(24 * 60 * 60),
            alert_retention: DEFAULT_ALERT_RETENTION,
        }
    }
}

pub struct ResilienceManagerConfigBuilder {
    config: ResilienceManagerConfig,
}

impl ResilienceManagerConfig {
    pub fn builder() -> ResilienceManagerConfigBuilder {
        ResilienceManagerConfigBuilder { config: ResilienceManagerConfig::default() }
    }
}

impl ResilienceManagerConfigBuilder {
    pub fn circuit_breaker(mut self, config: resilience_circuitbreaker::CircuitBreakerConfig) -> Self {
        self.config.circuit_breaker = config;
        self
    }

    pub fn reliability(mut self, config: resilience_reliability::ReliabilityConfig) -> Self {
        self.config.reliability = config;
        self
    }

    pub fn default_max_attempts(mut self, value: u32) -> Self {
        self.config.default_max_attempts = value;
        self
    }

    pub fn default_max_sources(mut self, value: usize) -> Self {
        self.config.default_max_sources = value;
        self
    }

    pub fn alert_retention(mut self, value: Duration) -> Self {
        self.config.alert_retention = value;
        self
    }

    pub fn build(self) -> ResilienceManagerConfig {
        self.config
    }
}
