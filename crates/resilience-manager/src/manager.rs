//! `ResilienceManager`: the public facade, per `spec.md` §4.9. Composes the
//! circuit breaker, rate limiter, reliability tracker, compliance gate, and
//! failover orchestrator around a registry of sources, plus the feed poller
//! and scraper registries for the two streaming ingestion paths.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use resilience_circuitbreaker::{CircuitBreakerRegistry, CircuitState};
use resilience_compliance::{CheckStatus, ComplianceCache};
use resilience_core::ResilienceCoreError;
use resilience_failover::{AdapterMap, FailoverOrchestrator};
use resilience_feedpoller::FeedPollerRegistry;
use resilience_ratelimiter::RateLimiterRegistry;
use resilience_reliability::ReliabilityRegistry;
use resilience_scraper::ScraperRegistry;
use resilience_types::{DataRequest, DataResponse, ResponseCompliance, ResponseMetadata, ResponseQuality, SourceAdapter, SourceConfig, Strategy};

use crate::config::{ResilienceManagerConfig, STUCK_OPEN_GRACE};
use crate::status::{overall_health, ComponentHealth, HealthCheck, ManagerStatus};

pub struct ResilienceManager {
    config: ResilienceManagerConfig,
    sources: DashMap<String, SourceConfig>,
    adapters: DashMap<String, Arc<dyn SourceAdapter>>,
    breaker: Arc<CircuitBreakerRegistry>,
    limiter: Arc<RateLimiterRegistry>,
    reliability: Arc<ReliabilityRegistry>,
    compliance: Arc<ComplianceCache>,
    orchestrator: FailoverOrchestrator,
    feed_poller: Arc<FeedPollerRegistry>,
    scraper: Arc<ScraperRegistry>,
}

impl ResilienceManager {
    pub fn new(config: ResilienceManagerConfig, feed_poller: Arc<FeedPollerRegistry>, scraper: Arc<ScraperRegistry>) -> Self {
        let breaker = Arc::new(CircuitBreakerRegistry::new(config.circuit_breaker));
        let limiter = Arc::new(RateLimiterRegistry::new());
        let reliability = Arc::new(ReliabilityRegistry::new(config.reliability));
        let compliance = Arc::new(ComplianceCache::new());
        let orchestrator = FailoverOrchestrator::new(Arc::clone(&breaker), Arc::clone(&limiter), Arc::clone(&reliability));

        Self {
            config,
            sources: DashMap::new(),
            adapters: DashMap::new(),
            breaker,
            limiter,
            reliability,
            compliance,
            orchestrator,
            feed_poller,
            scraper,
        }
    }

    /// Installs `config`'s state in the breaker, rate limiter, and
    /// reliability tracker, runs its compliance check, and stores `adapter`
    /// for dispatch. Per `spec.md` §4.9, the compliance check is meant to
    /// run in the background; since registration is synchronous here, it
    /// runs eagerly instead and its result is cached for the configured TTL.
    pub fn register_source(&self, config: SourceConfig, adapter: Arc<dyn SourceAdapter>) {
        self.breaker.register(&config.id, None);
        self.limiter.register(&config.id, config.rate_limit);
        self.reliability.register(&config.id);
        self.compliance.check(&config);
        self.adapters.insert(config.id.clone(), adapter);
        self.sources.insert(config.id.clone(), config);
    }

    pub fn source_ids(&self) -> Vec<String> {
        self.sources.iter().map(|e| e.key().clone()).collect()
    }

    /// Orchestrates the full pipeline: a compliance veto, then strategy
    /// dispatch to the failover orchestrator (`PrimaryOnly`/`Failover`) or
    /// a fan-out through the fusion engine (`Fusion`).
    pub async fn execute_request(&self, request: &DataRequest) -> Result<DataResponse<serde_json::Value>, ResilienceCoreError> {
        let sources: Vec<SourceConfig> = self.sources.iter().map(|e| e.value().clone()).collect();
        if sources.is_empty() {
            return Err(ResilienceCoreError::AllSourcesFailed { per_source: Vec::new() });
        }

        for required in &request.sources.required {
            if !self.sources.contains_key(required) {
                return Err(ResilienceCoreError::UnknownSource { source_id: required.clone() });
            }
        }

        let candidates: Vec<SourceConfig> = sources
            .into_iter()
            .filter(|s| request.sources.required.is_empty() || request.sources.required.contains(&s.id))
            .filter(|s| !request.sources.excluded.contains(&s.id))
            .collect();

        let checks: Vec<_> = candidates.iter().map(|s| self.compliance.check(s)).collect();
        let eligible: Vec<SourceConfig> = candidates
            .into_iter()
            .zip(checks.iter())
            .filter(|(_, check)| check.status != CheckStatus::Fail)
            .map(|(s, _)| s)
            .collect();

        if eligible.is_empty() {
            let reasons = checks.into_iter().flat_map(|c| c.reasons).collect();
            return Err(ResilienceCoreError::ComplianceViolation { reasons });
        }

        let adapters: AdapterMap = self
            .adapters
            .iter()
            .filter(|e| eligible.iter().any(|s| &s.id == e.key()))
            .map(|e| (e.key().clone(), Arc::clone(e.value())))
            .collect();

        match request.strategy {
            Strategy::PrimaryOnly => {
                let outcome = self
                    .orchestrator
                    .primary_only(&eligible, &adapters, request)
                    .await
                    .map_err(to_core_error)?;
                Ok(DataResponse {
                    data: outcome.data,
                    metadata: ResponseMetadata {
                        strategy: request.strategy,
                        sources_used: vec![outcome.source_id.clone()],
                        confidence: self.reliability.metrics(&outcome.source_id).map(|m| m.data_quality_score).unwrap_or(1.0),
                        latency: outcome.latency,
                        warnings: Vec::new(),
                        failover_occurred: outcome.failover_occurred,
                    },
                    quality: self.response_quality(&outcome.source_id),
                    compliance: self.response_compliance(&eligible),
                })
            }
            Strategy::Failover => {
                let outcome = self
                    .orchestrator
                    .failover(&eligible, &adapters, request, self.config.default_max_attempts)
                    .await
                    .map_err(to_core_error)?;
                let mut warnings = Vec::new();
                if outcome.failover_occurred {
                    warnings.push("failover occurred".to_string());
                }
                Ok(DataResponse {
                    data: outcome.data,
                    metadata: ResponseMetadata {
                        strategy: request.strategy,
                        sources_used: outcome.attempted_sources.clone(),
                        confidence: self.reliability.metrics(&outcome.source_id).map(|m| m.data_quality_score).unwrap_or(1.0),
                        latency: outcome.latency,
                        warnings,
                        failover_occurred: outcome.failover_occurred,
                    },
                    quality: self.response_quality(&outcome.source_id),
                    compliance: self.response_compliance(&eligible),
                })
            }
            Strategy::Fusion => {
                let outcome = self
                    .orchestrator
                    .fusion(&eligible, &adapters, request, self.config.default_max_sources)
                    .await
                    .map_err(to_core_error)?;
                let mut warnings = outcome.outcome.warnings.clone();
                if outcome.outcome.confidence < request.quality.min_confidence {
                    warnings.push("confidence below threshold".to_string());
                }
                let data = fusion_output_to_json(&outcome.outcome.output);
                Ok(DataResponse {
                    data,
                    metadata: ResponseMetadata {
                        strategy: request.strategy,
                        sources_used: outcome.outcome.sources_used.clone(),
                        confidence: outcome.outcome.confidence,
                        latency: outcome.latency,
                        warnings,
                        failover_occurred: false,
                    },
                    quality: self.fusion_response_quality(&outcome.outcome.sources_used),
                    compliance: self.response_compliance(&eligible),
                })
            }
        }
    }

    fn response_quality(&self, source_id: &str) -> ResponseQuality {
        let metrics = self.reliability.metrics(source_id).unwrap_or_default();
        ResponseQuality {
            accuracy: metrics.data_quality_score,
            completeness: metrics.data_quality_score,
            freshness: metrics.freshness_score,
            reliability: metrics.uptime_pct / 100.0,
        }
    }

    fn fusion_response_quality(&self, sources_used: &[String]) -> ResponseQuality {
        if sources_used.is_empty() {
            return ResponseQuality { accuracy: 0.0, completeness: 0.0, freshness: 0.0, reliability: 0.0 };
        }
        let n = sources_used.len() as f64;
        let totals = sources_used.iter().fold((0.0, 0.0, 0.0), |(acc, fresh, uptime), id| {
            let metrics = self.reliability.metrics(id).unwrap_or_default();
            (acc + metrics.data_quality_score, fresh + metrics.freshness_score, uptime + metrics.uptime_pct / 100.0)
        });
        ResponseQuality { accuracy: totals.0 / n, completeness: totals.0 / n, freshness: totals.1 / n, reliability: totals.2 / n }
    }

    fn response_compliance(&self, sources: &[SourceConfig]) -> ResponseCompliance {
        let attribution_required = sources.iter().any(|s| s.compliance.requires_attribution);
        let usage_restrictions = sources.iter().flat_map(|s| s.compliance.usage_restrictions.clone()).collect();
        let license_compliant = sources.iter().all(|s| self.compliance.check(s).status != CheckStatus::Fail);
        ResponseCompliance { license_compliant, attribution_required, usage_restrictions }
    }

    /// `status()`, per `spec.md` §4.9.
    pub fn status(&self) -> ManagerStatus {
        let total = self.sources.len();
        let open_breakers = self.breaker.open_count();
        let compliance_issues = self
            .sources
            .iter()
            .filter(|e| self.compliance.check(e.value()).status == CheckStatus::Fail)
            .count();
        let healthy = self
            .sources
            .iter()
            .filter(|e| self.breaker.state(e.key()) != Some(CircuitState::Open))
            .count();

        ManagerStatus {
            total_sources: total,
            healthy_sources: healthy,
            circuit_breakers_open: open_breakers,
            active_failovers: self
                .sources
                .iter()
                .filter(|e| self.reliability.incidents(e.key()).iter().any(|i| i.resolved_at.is_none()))
                .count(),
            real_time_streams: self.feed_poller.stream_ids().len(),
            scraping_jobs: self.scraper.job_ids().len(),
            compliance_issues,
            overall_health: overall_health(total, healthy, open_breakers, compliance_issues),
        }
    }

    /// `healthCheck()`, per `spec.md` §4.9: buckets each source into
    /// healthy/degraded/unhealthy and attaches a remediation recommendation
    /// for anything not healthy.
    pub fn health_check(&self) -> HealthCheck {
        let mut check = HealthCheck::default();
        for entry in self.sources.iter() {
            let id = entry.key();
            let state = self.breaker.state(id);
            let compliance_fail = self.compliance.check(entry.value()).status == CheckStatus::Fail;
            let health = classify(state, compliance_fail);
            match health {
                ComponentHealth::Healthy => check.healthy.push(id.clone()),
                ComponentHealth::Degraded => {
                    check.degraded.push(id.clone());
                    check.recommendations.push(format!("{id}: circuit half-open, monitor before relying on it"));
                }
                ComponentHealth::Unhealthy => {
                    check.unhealthy.push(id.clone());
                    if compliance_fail {
                        check.recommendations.push(format!("{id}: resolve compliance failure before further use"));
                    } else {
                        check.recommendations.push(format!("{id}: circuit open, investigate upstream before forcing traffic back"));
                    }
                }
            }
        }
        check
    }

    /// `maintenance()`, per `spec.md` §4.9: trims reliability samples and
    /// alerts beyond retention, and resets circuits stuck `OPEN` long past
    /// their `nextAttemptAt`. Feed dedupe caches self-trim on insert and
    /// need no separate sweep.
    pub fn maintenance(&self) -> usize {
        self.reliability.maintenance(self.config.sample_retention, self.config.alert_retention);
        self.breaker.reset_stuck_open(STUCK_OPEN_GRACE)
    }
}

fn classify(state: Option<CircuitState>, compliance_fail: bool) -> ComponentHealth {
    if compliance_fail || state == Some(CircuitState::Open) {
        ComponentHealth::Unhealthy
    } else if state == Some(CircuitState::HalfOpen) {
        ComponentHealth::Degraded
    } else {
        ComponentHealth::Healthy
    }
}

fn to_core_error(err: resilience_failover::FailoverError) -> ResilienceCoreError {
    match err {
        resilience_failover::FailoverError::ValidationError { reason } => ResilienceCoreError::ValidationError { reason },
        resilience_failover::FailoverError::AllSourcesFailed { per_source } => {
            ResilienceCoreError::AllSourcesFailed { per_source }
        }
    }
}

fn fusion_output_to_json(output: &resilience_fusion::FusionOutput) -> serde_json::Value {
    match output {
        resilience_fusion::FusionOutput::Scalar(value) => fusion_value_to_json(value),
        resilience_fusion::FusionOutput::Temporal(contributions) => {
            let points: Vec<serde_json::Value> = contributions
                .iter()
                .map(|c| {
                    serde_json::json!({
                        "sourceId": c.source_id,
                        "weight": c.weight,
                        "timestamp": c.point.timestamp.to_rfc3339(),
                        "value": c.point.value,
                    })
                })
                .collect();
            serde_json::Value::Array(points)
        }
    }
}

fn fusion_value_to_json(value: &resilience_fusion::FusionValue) -> serde_json::Value {
    match value {
        resilience_fusion::FusionValue::Number(n) => serde_json::json!(n),
        resilience_fusion::FusionValue::Category(c) => serde_json::json!(c),
        resilience_fusion::FusionValue::Series(points) => {
            let points: Vec<serde_json::Value> = points
                .iter()
                .map(|p| serde_json::json!({ "timestamp": p.timestamp.to_rfc3339(), "value": p.value }))
                .collect();
            serde_json::Value::Array(points)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use resilience_compliance::RobotsCache;
    use resilience_types::{AdapterFailure, AdapterSuccess, DataRequest, Strategy};
    use std::time::Duration as StdDuration;

    struct OkAdapter {
        config: SourceConfig,
    }

    #[async_trait]
    impl SourceAdapter for OkAdapter {
        fn config(&self) -> &SourceConfig {
            &self.config
        }

        async fn fetch(&self, _params: &HashMap<String, String>) -> Result<AdapterSuccess, AdapterFailure> {
            Ok(AdapterSuccess {
                data: serde_json::json!(10.0),
                timestamp: chrono::Utc::now(),
                request_id: "r1".to_string(),
                rate_limit_remaining: None,
            })
        }
    }

    fn manager() -> ResilienceManager {
        let fetcher = Arc::new(resilience_feedpoller::ReqwestFeedFetcher::new());
        ResilienceManager::new(
            ResilienceManagerConfig::default(),
            Arc::new(FeedPollerRegistry::new(fetcher)),
            Arc::new(ScraperRegistry::new(Arc::new(RobotsCache::new()))),
        )
    }

    #[tokio::test]
    async fn primary_only_executes_against_a_registered_source() {
        let manager = manager();
        let config = SourceConfig::builder("A", "https://example.com").build();
        manager.register_source(config.clone(), Arc::new(OkAdapter { config }));

        let request = DataRequest::new("numerical", Strategy::PrimaryOnly);
        let response = manager.execute_request(&request).await.unwrap();
        assert_eq!(response.metadata.sources_used, vec!["A".to_string()]);
    }

    #[tokio::test]
    async fn unregistered_required_source_is_unknown_source_error() {
        let manager = manager();
        let request = DataRequest::new("numerical", Strategy::PrimaryOnly).with_required(vec!["missing".to_string()]);
        let result = manager.execute_request(&request).await;
        assert!(matches!(result, Err(ResilienceCoreError::UnknownSource { .. })));
    }

    #[tokio::test]
    async fn status_reports_registered_sources() {
        let manager = manager();
        let config = SourceConfig::builder("A", "https://example.com").build();
        manager.register_source(config.clone(), Arc::new(OkAdapter { config }));
        let status = manager.status();
        assert_eq!(status.total_sources, 1);
        assert_eq!(status.healthy_sources, 1);
        assert_eq!(status.overall_health, 1.0);
    }

    #[tokio::test]
    async fn maintenance_runs_without_panicking() {
        let manager = manager();
        let config = SourceConfig::builder("A", "https://example.com").build();
        manager.register_source(config.clone(), Arc::new(OkAdapter { config }));
        manager.maintenance();
        tokio::time::sleep(StdDuration::from_millis(1)).await;
    }
}
