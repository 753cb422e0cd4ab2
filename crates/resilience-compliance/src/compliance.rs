//! Pre-request compliance checks, per `spec.md` §4.5(a): data licensing,
//! usage restrictions, retention policy, attribution, and (for commercial
//! sources) pricing transparency.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use dashmap::DashMap;

use resilience_types::SourceConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComplianceCheck {
    pub source_id: String,
    pub status: CheckStatus,
    pub reasons: Vec<String>,
    pub checked_at: DateTime<Utc>,
}

impl ComplianceCheck {
    pub const TTL_DAYS: i64 = 30;

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.checked_at >= ChronoDuration::days(Self::TTL_DAYS)
    }

    pub fn is_eligible(&self) -> bool {
        self.status != CheckStatus::Fail
    }
}

/// Runs the rule set against a source's declared compliance profile.
pub fn evaluate(config: &SourceConfig) -> ComplianceCheck {
    let mut reasons = Vec::new();
    let mut status = CheckStatus::Pass;

    if config.compliance.license_terms.is_none() {
        reasons.push("data licensing not documented".to_string());
        status = CheckStatus::Fail;
    }

    if config.compliance.usage_restrictions.is_empty() {
        reasons.push("usage restrictions not documented".to_string());
        if status == CheckStatus::Pass {
            status = CheckStatus::Warn;
        }
    }

    if config.compliance.retention_days == 0 {
        reasons.push("retention policy is zero".to_string());
        if status == CheckStatus::Pass {
            status = CheckStatus::Warn;
        }
    }

    if config.compliance.requires_attribution && config.compliance.license_terms.is_none() {
        reasons.push("attribution required but no license terms to attribute".to_string());
        status = CheckStatus::Fail;
    }

    if config.compliance.commercial && !config.compliance.pricing_transparent {
        reasons.push("pricing not transparent".to_string());
        status = CheckStatus::Fail;
    }

    ComplianceCheck {
        source_id: config.id.clone(),
        status,
        reasons,
        checked_at: Utc::now(),
    }
}

/// Per-source cache with a 30-day TTL, checked lazily on read.
pub struct ComplianceCache {
    entries: DashMap<String, ComplianceCheck>,
}

impl ComplianceCache {
    pub fn new() -> Self {
        Self { entries: DashMap::new() }
    }

    /// Returns the cached check if present and unexpired, otherwise
    /// evaluates, caches, and returns a fresh one.
    pub fn check(&self, config: &SourceConfig) -> ComplianceCheck {
        let now = Utc::now();
        if let Some(existing) = self.entries.get(&config.id) {
            if !existing.is_expired(now) {
                return existing.clone();
            }
        }
        let fresh = evaluate(config);
        self.entries.insert(config.id.clone(), fresh.clone());
        fresh
    }

    pub fn invalidate(&self, source_id: &str) {
        self.entries.remove(source_id);
    }
}

impl Default for ComplianceCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resilience_types::ComplianceProfile;

    fn config_with(compliance: ComplianceProfile) -> SourceConfig {
        SourceConfig::builder("C", "https://example.com")
            .compliance(compliance)
            .build()
    }

    #[test]
    fn commercial_source_without_transparent_pricing_fails() {
        let config = config_with(ComplianceProfile {
            license_terms: Some("CC-BY".into()),
            usage_restrictions: vec!["non-commercial".into()],
            retention_days: 30,
            commercial: true,
            pricing_transparent: false,
            requires_attribution: false,
        });
        let check = evaluate(&config);
        assert_eq!(check.status, CheckStatus::Fail);
        assert!(check.reasons.iter().any(|r| r.contains("pricing")));
    }

    #[test]
    fn fully_documented_noncommercial_source_passes() {
        let config = config_with(ComplianceProfile {
            license_terms: Some("CC-BY".into()),
            usage_restrictions: vec!["attribution required".into()],
            retention_days: 30,
            commercial: false,
            pricing_transparent: false,
            requires_attribution: true,
        });
        let check = evaluate(&config);
        assert_eq!(check.status, CheckStatus::Pass);
    }

    #[test]
    fn missing_retention_policy_is_a_warning_not_a_failure() {
        let config = config_with(ComplianceProfile {
            license_terms: Some("CC-BY".into()),
            usage_restrictions: vec!["attribution required".into()],
            retention_days: 0,
            commercial: false,
            pricing_transparent: false,
            requires_attribution: false,
        });
        let check = evaluate(&config);
        assert_eq!(check.status, CheckStatus::Warn);
    }

    #[test]
    fn cache_reuses_unexpired_check() {
        let cache = ComplianceCache::new();
        let config = config_with(ComplianceProfile {
            license_terms: Some("CC-BY".into()),
            usage_restrictions: vec!["attribution required".into()],
            retention_days: 30,
            commercial: false,
            pricing_transparent: false,
            requires_attribution: false,
        });
        let first = cache.check(&config);
        let second = cache.check(&config);
        assert_eq!(first.checked_at, second.checked_at);
    }
}
