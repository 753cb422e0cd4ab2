use std::time::Duration;

/// Tunables for a circuit breaker, matching the defaults in the design
/// (`failureThreshold=5`, `successThreshold=3`, `openTimeoutMs=60000`,
/// `monitoringWindowMs=300000`).
#[derive(Debug, Clone, Copy)]
pub struct CircuitBreakerConfig {
    pub(crate) failure_threshold: usize,
    pub(crate) success_threshold: usize,
    pub(crate) open_timeout: Duration,
    pub(crate) monitoring_window: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl CircuitBreakerConfig {
    pub fn builder() -> CircuitBreakerConfigBuilder {
        CircuitBreakerConfigBuilder::new()
    }

    /// The spec's default thresholds.
    pub fn standard() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 3,
            open_timeout: Duration::from_millis(60_000),
            monitoring_window: Duration::from_millis(300_000),
        }
    }

    /// Trips faster and recovers faster; useful for low-traffic, expensive
    /// commercial broker sources where five failures can mean real money.
    pub fn fast_fail() -> Self {
        Self {
            failure_threshold: 2,
            success_threshold: 2,
            open_timeout: Duration::from_millis(15_000),
            monitoring_window: Duration::from_millis(60_000),
        }
    }

    /// Tolerates flaky sources (scraped sites, best-effort feeds) with a
    /// higher threshold and a longer cool-down.
    pub fn lenient() -> Self {
        Self {
            failure_threshold: 10,
            success_threshold: 3,
            open_timeout: Duration::from_millis(120_000),
            monitoring_window: Duration::from_millis(600_000),
        }
    }

    pub fn failure_threshold(&self) -> usize {
        self.failure_threshold
    }

    pub fn open_timeout(&self) -> Duration {
        self.open_timeout
    }
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfigBuilder {
    failure_threshold: usize,
    success_threshold: usize,
    open_timeout: Duration,
    monitoring_window: Duration,
}

impl CircuitBreakerConfigBuilder {
    pub fn new() -> Self {
        let defaults = CircuitBreakerConfig::standard();
        Self {
            failure_threshold: defaults.failure_threshold,
            success_threshold: defaults.success_threshold,
            open_timeout: defaults.open_timeout,
            monitoring_window: defaults.monitoring_window,
        }
    }

    pub fn failure_threshold(mut self, n: usize) -> Self {
        self.failure_threshold = n;
        self
    }

    pub fn success_threshold(mut self, n: usize) -> Self {
        self.success_threshold = n;
        self
    }

    pub fn open_timeout(mut self, d: Duration) -> Self {
        self.open_timeout = d;
        self
    }

    pub fn monitoring_window(mut self, d: Duration) -> Self {
        self.monitoring_window = d;
        self
    }

    pub fn build(self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: self.failure_threshold,
            success_threshold: self.success_threshold,
            open_timeout: self.open_timeout,
            monitoring_window: self.monitoring_window,
        }
    }
}

impl Default for CircuitBreakerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
