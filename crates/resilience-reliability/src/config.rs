use std::time::Duration;

/// Tunables for the reliability tracker, matching the defaults in
/// `spec.md` §4.3. All thresholds are overridable per the spec's
/// "(defaults, overridable)" note.
#[derive(Debug, Clone, Copy)]
pub struct ReliabilityConfig {
    pub(crate) sample_window: Duration,
    pub(crate) incident_window: Duration,
    pub(crate) incident_min_failures: usize,
    pub(crate) incident_critical_failures: usize,
    pub(crate) quality_history: usize,
    pub(crate) uptime_warn: f64,
    pub(crate) uptime_critical: f64,
    pub(crate) response_time_warn_ms: f64,
    pub(crate) response_time_critical_ms: f64,
    pub(crate) success_rate_warn: f64,
    pub(crate) success_rate_critical: f64,
    pub(crate) quality_warn: f64,
    pub(crate) quality_critical: f64,
}

impl Default for ReliabilityConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl ReliabilityConfig {
    pub fn builder() -> ReliabilityConfigBuilder {
        ReliabilityConfigBuilder::new()
    }

    pub fn standard() -> Self {
        Self {
            sample_window: Duration::from_secs(24 * 60 * 60),
            incident_window: Duration::from_secs(5 * 60),
            incident_min_failures: 3,
            incident_critical_failures: 5,
            quality_history: 10,
            uptime_warn: 95.0,
            uptime_critical: 90.0,
            response_time_warn_ms: 2_000.0,
            response_time_critical_ms: 5_000.0,
            success_rate_warn: 98.0,
            success_rate_critical: 95.0,
            quality_warn: 0.8,
            quality_critical: 0.6,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReliabilityConfigBuilder {
    inner: ReliabilityConfig,
}

impl ReliabilityConfigBuilder {
    pub fn new() -> Self {
        Self {
            inner: ReliabilityConfig::standard(),
        }
    }

    pub fn sample_window(mut self, d: Duration) -> Self {
        self.inner.sample_window = d;
        self
    }

    pub fn incident_window(mut self, d: Duration) -> Self {
        self.inner.incident_window = d;
        self
    }

    pub fn incident_min_failures(mut self, n: usize) -> Self {
        self.inner.incident_min_failures = n;
        self
    }

    pub fn incident_critical_failures(mut self, n: usize) -> Self {
        self.inner.incident_critical_failures = n;
        self
    }

    pub fn uptime_thresholds(mut self, warn: f64, critical: f64) -> Self {
        self.inner.uptime_warn = warn;
        self.inner.uptime_critical = critical;
        self
    }

    pub fn response_time_thresholds_ms(mut self, warn: f64, critical: f64) -> Self {
        self.inner.response_time_warn_ms = warn;
        self.inner.response_time_critical_ms = critical;
        self
    }

    pub fn success_rate_thresholds(mut self, warn: f64, critical: f64) -> Self {
        self.inner.success_rate_warn = warn;
        self.inner.success_rate_critical = critical;
        self
    }

    pub fn quality_thresholds(mut self, warn: f64, critical: f64) -> Self {
        self.inner.quality_warn = warn;
        self.inner.quality_critical = critical;
        self
    }

    pub fn build(self) -> ReliabilityConfig {
        self.inner
    }
}

impl Default for ReliabilityConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
