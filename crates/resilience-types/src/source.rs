//! `SourceConfig`: the immutable-after-registration description of one
//! upstream data provider, per `spec.md` §3.

use resilience_ratelimiter::RateLimitConfig;
use std::time::Duration;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Authentication {
    None,
    ApiKey { header: String },
    Basic,
    OAuth,
}

/// Retry tunables attached to a source, consumed by the failover
/// orchestrator (`maxAttempts`, base backoff, exponential flag).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_backoff: Duration,
    pub exponential: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(200),
            exponential: true,
        }
    }
}

/// Baseline quality figures a source is expected to deliver, all in `[0,1]`.
/// Used by the fusion engine's weight formula and the reliability tracker's
/// `userSatisfaction` calculation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityBaseline {
    pub accuracy: f64,
    pub completeness: f64,
    pub timeliness: f64,
    pub reliability: f64,
}

impl Default for QualityBaseline {
    fn default() -> Self {
        Self {
            accuracy: 0.9,
            completeness: 0.9,
            timeliness: 0.9,
            reliability: 0.9,
        }
    }
}

/// Licensing/compliance facts the compliance gate checks before a source is
/// eligible for a request.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComplianceProfile {
    pub requires_attribution: bool,
    pub usage_restrictions: Vec<String>,
    pub license_terms: Option<String>,
    /// Non-zero means a documented retention policy is in place.
    pub retention_days: u32,
    /// Whether this source is a commercial broker (triggers the pricing
    /// transparency check).
    pub commercial: bool,
    pub pricing_transparent: bool,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SourceConfig {
    pub id: String,
    pub name: String,
    /// 1 = highest priority.
    pub priority: u32,
    pub base_url: String,
    pub authentication: Authentication,
    pub rate_limit: RateLimitConfig,
    pub retry: RetryPolicy,
    pub timeout: Duration,
    pub fallback_source_ids: Vec<String>,
    pub quality: QualityBaseline,
    pub compliance: ComplianceProfile,
}

impl SourceConfig {
    pub fn builder(id: impl Into<String>, base_url: impl Into<String>) -> SourceConfigBuilder {
        SourceConfigBuilder::new(id.into(), base_url.into())
    }
}

/// Builder enforcing the required/optional split `spec.md` §3 describes:
/// `id`, `priority`, `baseUrl` required; everything else defaulted sanely.
pub struct SourceConfigBuilder {
    id: String,
    base_url: String,
    name: Option<String>,
    priority: u32,
    authentication: Authentication,
    rate_limit: RateLimitConfig,
    retry: RetryPolicy,
    timeout: Duration,
    fallback_source_ids: Vec<String>,
    quality: QualityBaseline,
    compliance: ComplianceProfile,
}

impl SourceConfigBuilder {
    fn new(id: String, base_url: String) -> Self {
        Self {
            id,
            base_url,
            name: None,
            priority: 100,
            authentication: Authentication::None,
            rate_limit: RateLimitConfig::default(),
            retry: RetryPolicy::default(),
            timeout: Duration::from_millis(5_000),
            fallback_source_ids: Vec::new(),
            quality: QualityBaseline::default(),
            compliance: ComplianceProfile::default(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn authentication(mut self, authentication: Authentication) -> Self {
        self.authentication = authentication;
        self
    }

    pub fn rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn fallback_source_ids(mut self, ids: Vec<String>) -> Self {
        self.fallback_source_ids = ids;
        self
    }

    pub fn quality(mut self, quality: QualityBaseline) -> Self {
        self.quality = quality;
        self
    }

    pub fn compliance(mut self, compliance: ComplianceProfile) -> Self {
        self.compliance = compliance;
        self
    }

    pub fn build(self) -> SourceConfig {
        let name = self.name.unwrap_or_else(|| self.id.clone());
        SourceConfig {
            id: self.id,
            name,
            priority: self.priority,
            base_url: self.base_url,
            authentication: self.authentication,
            rate_limit: self.rate_limit,
            retry: self.retry,
            timeout: self.timeout,
            fallback_source_ids: self.fallback_source_ids,
            quality: self.quality,
            compliance: self.compliance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_name_to_id() {
        let config = SourceConfig::builder("world-bank", "https://api.worldbank.org").build();
        assert_eq!(config.name, "world-bank");
        assert_eq!(config.priority, 100);
    }

    #[test]
    fn builder_applies_overrides() {
        let config = SourceConfig::builder("nasa-power", "https://power.larc.nasa.gov")
            .name("NASA POWER")
            .priority(1)
            .build();
        assert_eq!(config.name, "NASA POWER");
        assert_eq!(config.priority, 1);
    }
}
