//! `FailoverOrchestrator`: composes the rate limiter, circuit breaker, and
//! reliability tracker around a [`SourceAdapter`] call, per `spec.md` §4.6.
//! The same layering idiom the teacher's composition guide uses to chain
//! `RateLimiter -> Bulkhead -> TimeLimiter -> Handler`, specialized to this
//! domain's three concrete strategies.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use resilience_circuitbreaker::CircuitBreakerRegistry;
use resilience_core::{cancel_pair, Deadline, PerSourceError};
use resilience_fusion::{compute_weight, fuse, FusionOutcome, WeightInputs};
use resilience_ratelimiter::RateLimiterRegistry;
use resilience_reliability::ReliabilityRegistry;
use resilience_types::{
    ContributionStatus, DataRequest, PerformancePoint, SourceAdapter, SourceConfig,
    SourceContribution,
};

use crate::candidate::candidates;
use crate::convert::to_fusion_value;
use crate::error::FailoverError;

/// `source id -> adapter`. Adapters are registered once at startup and
/// looked up by source id for the lifetime of the process.
pub type AdapterMap = HashMap<String, Arc<dyn SourceAdapter>>;

/// The result of a successful `failover` or `primary_only` call.
#[derive(Debug, Clone)]
pub struct FailoverOutcome {
    pub source_id: String,
    pub data: serde_json::Value,
    pub attempted_sources: Vec<String>,
    pub failover_occurred: bool,
    pub latency: std::time::Duration,
}

/// The result of a successful `fusion` call.
#[derive(Debug, Clone)]
pub struct FusionRunOutcome {
    pub outcome: FusionOutcome,
    pub attempted_sources: Vec<String>,
    pub latency: std::time::Duration,
}

pub struct FailoverOrchestrator {
    breaker: Arc<CircuitBreakerRegistry>,
    limiter: Arc<RateLimiterRegistry>,
    reliability: Arc<ReliabilityRegistry>,
}

impl FailoverOrchestrator {
    pub fn new(
        breaker: Arc<CircuitBreakerRegistry>,
        limiter: Arc<RateLimiterRegistry>,
        reliability: Arc<ReliabilityRegistry>,
    ) -> Self {
        Self { breaker, limiter, reliability }
    }

    /// Tries ranked candidates in order, up to `max_attempts`, returning on
    /// the first success. A rate-limit skip does not count toward the
    /// attempt budget or as a source failure, per `spec.md` §4.6.
    pub async fn failover(
        &self,
        sources: &[SourceConfig],
        adapters: &AdapterMap,
        request: &DataRequest,
        max_attempts: u32,
    ) -> Result<FailoverOutcome, FailoverError> {
        if max_attempts == 0 {
            return Err(FailoverError::ValidationError { reason: "maxAttempts must be >= 1".to_string() });
        }

        let ranked = candidates(sources, &request.sources, &self.breaker, &self.reliability);
        let overall_deadline = Deadline::after(request.quality.max_latency);

        let mut attempted = Vec::new();
        let mut per_source = Vec::new();

        for config in ranked.iter() {
            if attempted.len() >= max_attempts as usize {
                break;
            }
            let Some(adapter) = adapters.get(&config.id) else {
                continue;
            };
            if self.breaker.is_open(&config.id) {
                per_source.push(PerSourceError { source_id: config.id.clone(), kind: "circuit_open".to_string() });
                continue;
            }
            if self.limiter.acquire(&config.id).is_err() {
                continue;
            }

            attempted.push(config.id.clone());
            let deadline = overall_deadline.earliest(Deadline::after(config.timeout));
            let (_handle, mut cancel) = cancel_pair();
            let start = Instant::now();
            let result = self
                .breaker
                .execute(&config.id, deadline, &mut cancel, || adapter.fetch(&request.parameters))
                .await;
            let latency = start.elapsed();

            match result {
                Ok(success) => {
                    self.reliability.record(
                        &config.id,
                        PerformancePoint { timestamp: Utc::now(), latency, success: true },
                        None,
                    );
                    return Ok(FailoverOutcome {
                        source_id: config.id.clone(),
                        data: success.data,
                        attempted_sources: attempted.clone(),
                        failover_occurred: attempted.len() > 1,
                        latency,
                    });
                }
                Err(err) => {
                    self.reliability.record(
                        &config.id,
                        PerformancePoint { timestamp: Utc::now(), latency, success: false },
                        None,
                    );
                    per_source.push(PerSourceError { source_id: config.id.clone(), kind: err.to_string() });
                }
            }
        }

        Err(FailoverError::AllSourcesFailed { per_source })
    }

    /// Picks the single highest-ranked eligible source and tries it once,
    /// with no retry on failure.
    pub async fn primary_only(
        &self,
        sources: &[SourceConfig],
        adapters: &AdapterMap,
        request: &DataRequest,
    ) -> Result<FailoverOutcome, FailoverError> {
        self.failover(sources, adapters, request, 1).await
    }

    /// Fans a request out to up to `max_sources` ranked eligible sources
    /// concurrently, gathers the successful contributions, and hands them to
    /// the fusion engine. Requires at least one success.
    pub async fn fusion(
        &self,
        sources: &[SourceConfig],
        adapters: &AdapterMap,
        request: &DataRequest,
        max_sources: usize,
    ) -> Result<FusionRunOutcome, FailoverError> {
        let ranked = candidates(sources, &request.sources, &self.breaker, &self.reliability);
        let selected: Vec<SourceConfig> = ranked
            .into_iter()
            .filter(|c| adapters.contains_key(&c.id) && !self.breaker.is_open(&c.id))
            .take(max_sources.max(1))
            .collect();

        if selected.is_empty() {
            return Err(FailoverError::AllSourcesFailed { per_source: Vec::new() });
        }

        let overall_deadline = Deadline::after(request.quality.max_latency);
        let start = Instant::now();

        let calls = selected.iter().map(|config| {
            let adapter = Arc::clone(adapters.get(&config.id).expect("filtered above"));
            let config = config.clone();
            let params = request.parameters.clone();
            let breaker = Arc::clone(&self.breaker);
            let reliability = Arc::clone(&self.reliability);
            let source_deadline = overall_deadline.earliest(Deadline::after(config.timeout));
            let data_type = request.data_type.clone();

            async move {
                let (_handle, mut cancel) = cancel_pair();
                let call_start = Instant::now();
                let result = breaker
                    .execute(&config.id, source_deadline, &mut cancel, || adapter.fetch(&params))
                    .await;
                let latency = call_start.elapsed();

                let (status, fusion_value, kind) = match &result {
                    Ok(success) => {
                        let value = to_fusion_value(&data_type, &success.data);
                        match value {
                            Some(v) => (ContributionStatus::Success, Some(v), None),
                            None => (ContributionStatus::Error, None, Some("unparseable payload for data type".to_string())),
                        }
                    }
                    Err(err) if err.to_string().contains("timed out") => {
                        (ContributionStatus::Timeout, None, Some(err.to_string()))
                    }
                    Err(err) => (ContributionStatus::Error, None, Some(err.to_string())),
                };

                reliability.record(
                    &config.id,
                    PerformancePoint { timestamp: Utc::now(), latency, success: matches!(status, ContributionStatus::Success) },
                    None,
                );

                let confidence = reliability.metrics(&config.id).map(|m| m.data_quality_score).unwrap_or(config.quality.accuracy);
                let weight = compute_weight(WeightInputs {
                    reliability: config.quality.reliability,
                    latency_ms: latency.as_secs_f64() * 1000.0,
                    timeliness: config.quality.timeliness,
                    priority: config.priority,
                });

                (config.id.clone(), status, fusion_value, confidence, weight, kind)
            }
        });

        let results = futures::future::join_all(calls).await;
        let latency = start.elapsed();

        let attempted_sources: Vec<String> = results.iter().map(|r| r.0.clone()).collect();
        let contributions: Vec<SourceContribution<resilience_fusion::FusionValue>> = results
            .into_iter()
            .map(|(source_id, status, data, confidence, weight, _kind)| SourceContribution {
                source_id,
                status,
                data,
                latency,
                confidence,
                weight,
            })
            .collect();

        match fuse(&request.data_type, &contributions, request.quality.min_confidence) {
            Ok(outcome) => Ok(FusionRunOutcome { outcome, attempted_sources, latency }),
            Err(err) => {
                let per_source = contributions
                    .iter()
                    .filter(|c| !c.is_success())
                    .map(|c| PerSourceError { source_id: c.source_id.clone(), kind: err.to_string() })
                    .collect();
                Err(FailoverError::AllSourcesFailed { per_source })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use resilience_circuitbreaker::CircuitBreakerConfig;
    use resilience_ratelimiter::RateLimitConfig;
    use resilience_types::{AdapterFailure, AdapterSuccess, DataRequest, Strategy};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FlakyAdapter {
        config: SourceConfig,
        fail_times: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SourceAdapter for FlakyAdapter {
        fn config(&self) -> &SourceConfig {
            &self.config
        }

        async fn fetch(&self, _params: &HashMap<String, String>) -> Result<AdapterSuccess, AdapterFailure> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_times {
                Err(AdapterFailure { message: "boom".to_string() })
            } else {
                Ok(AdapterSuccess {
                    data: serde_json::json!(42.0),
                    timestamp: Utc::now(),
                    request_id: "req-1".to_string(),
                    rate_limit_remaining: None,
                })
            }
        }
    }

    fn orchestrator() -> FailoverOrchestrator {
        FailoverOrchestrator::new(
            Arc::new(CircuitBreakerRegistry::new(CircuitBreakerConfig::standard())),
            Arc::new(RateLimiterRegistry::new()),
            Arc::new(ReliabilityRegistry::new(Default::default())),
        )
    }

    fn setup(orch: &FailoverOrchestrator, config: &SourceConfig) {
        orch.breaker.register(&config.id, None);
        orch.limiter.register(&config.id, RateLimitConfig::default());
        orch.reliability.register(&config.id);
    }

    #[tokio::test]
    async fn primary_succeeds_without_failover() {
        let orch = orchestrator();
        let config = SourceConfig::builder("A", "https://example.com").build();
        setup(&orch, &config);
        let adapter: Arc<dyn SourceAdapter> = Arc::new(FlakyAdapter { config: config.clone(), fail_times: 0, calls: AtomicUsize::new(0) });
        let mut adapters: AdapterMap = HashMap::new();
        adapters.insert("A".to_string(), adapter);

        let request = DataRequest::new("numerical", Strategy::PrimaryOnly);
        let outcome = orch.failover(&[config], &adapters, &request, 3).await.unwrap();
        assert_eq!(outcome.source_id, "A");
        assert!(!outcome.failover_occurred);
    }

    #[tokio::test]
    async fn secondary_used_when_primary_fails() {
        let orch = orchestrator();
        let primary = SourceConfig::builder("A", "https://a.example.com").priority(1).build();
        let secondary = SourceConfig::builder("B", "https://b.example.com").priority(2).build();
        setup(&orch, &primary);
        setup(&orch, &secondary);

        let mut adapters: AdapterMap = HashMap::new();
        adapters.insert(
            "A".to_string(),
            Arc::new(FlakyAdapter { config: primary.clone(), fail_times: 99, calls: AtomicUsize::new(0) }),
        );
        adapters.insert(
            "B".to_string(),
            Arc::new(FlakyAdapter { config: secondary.clone(), fail_times: 0, calls: AtomicUsize::new(0) }),
        );

        let request = DataRequest::new("numerical", Strategy::Failover);
        let outcome = orch.failover(&[primary, secondary], &adapters, &request, 3).await.unwrap();
        assert_eq!(outcome.source_id, "B");
        assert!(outcome.failover_occurred);
        assert_eq!(outcome.attempted_sources, vec!["A".to_string(), "B".to_string()]);
    }

    #[tokio::test]
    async fn zero_max_attempts_is_a_validation_error() {
        let orch = orchestrator();
        let config = SourceConfig::builder("A", "https://example.com").build();
        setup(&orch, &config);
        let mut adapters: AdapterMap = HashMap::new();
        adapters.insert(
            "A".to_string(),
            Arc::new(FlakyAdapter { config: config.clone(), fail_times: 0, calls: AtomicUsize::new(0) }),
        );
        let request = DataRequest::new("numerical", Strategy::PrimaryOnly);
        let result = orch.failover(&[config], &adapters, &request, 0).await;
        assert!(matches!(result, Err(FailoverError::ValidationError { .. })));
    }

    #[tokio::test]
    async fn fusion_combines_two_numeric_sources() {
        let orch = orchestrator();
        let a = SourceConfig::builder("A", "https://a.example.com").priority(1).build();
        let b = SourceConfig::builder("B", "https://b.example.com").priority(2).build();
        setup(&orch, &a);
        setup(&orch, &b);

        let mut adapters: AdapterMap = HashMap::new();
        adapters.insert("A".to_string(), Arc::new(FlakyAdapter { config: a.clone(), fail_times: 0, calls: AtomicUsize::new(0) }));
        adapters.insert("B".to_string(), Arc::new(FlakyAdapter { config: b.clone(), fail_times: 0, calls: AtomicUsize::new(0) }));

        let request = DataRequest::new("numerical", Strategy::Fusion);
        let outcome = orch.fusion(&[a, b], &adapters, &request, 3).await.unwrap();
        assert_eq!(outcome.attempted_sources.len(), 2);
        assert!(matches!(outcome.outcome.output, resilience_fusion::FusionOutput::Scalar(resilience_fusion::FusionValue::Number(_))));
    }
}
