//! End-to-end scenarios for the resilience facade, per `spec.md` §8. Each
//! test drives `ResilienceManager::execute_request` (or, for scraping, the
//! scraper registry directly) the way a caller at the edge of the system
//! would, rather than exercising any one component in isolation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use resilience_circuitbreaker::CircuitBreakerConfig;
use resilience_compliance::RobotsCache;
use resilience_core::ResilienceCoreError;
use resilience_feedpoller::{FeedPollerRegistry, ReqwestFeedFetcher};
use resilience_manager::{ResilienceManager, ResilienceManagerConfig};
use resilience_scraper::{ScrapeJob, ScraperRegistry};
use resilience_types::{
    AdapterFailure, AdapterSuccess, ComplianceProfile, DataRequest, QualityBaseline, SourceAdapter,
    SourceConfig, Strategy,
};

fn manager(config: ResilienceManagerConfig) -> ResilienceManager {
    let fetcher = Arc::new(ReqwestFeedFetcher::new());
    ResilienceManager::new(
        config,
        Arc::new(FeedPollerRegistry::new(fetcher)),
        Arc::new(ScraperRegistry::new(Arc::new(RobotsCache::new()))),
    )
}

/// Always succeeds with a fixed numeric value after an artificial delay.
struct ValueAdapter {
    config: SourceConfig,
    value: f64,
    delay: Duration,
}

#[async_trait]
impl SourceAdapter for ValueAdapter {
    fn config(&self) -> &SourceConfig {
        &self.config
    }

    async fn fetch(&self, _params: &HashMap<String, String>) -> Result<AdapterSuccess, AdapterFailure> {
        tokio::time::sleep(self.delay).await;
        Ok(AdapterSuccess {
            data: serde_json::json!(self.value),
            timestamp: chrono::Utc::now(),
            request_id: "req".to_string(),
            rate_limit_remaining: None,
        })
    }
}

/// Always fails, counting how many times it was called.
struct FailingAdapter {
    config: SourceConfig,
    calls: Arc<AtomicU32>,
}

#[async_trait]
impl SourceAdapter for FailingAdapter {
    fn config(&self) -> &SourceConfig {
        &self.config
    }

    async fn fetch(&self, _params: &HashMap<String, String>) -> Result<AdapterSuccess, AdapterFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(AdapterFailure { message: "upstream unavailable".to_string() })
    }
}

/// Scenario 1 (`spec.md` §8): happy failover. A single healthy, higher
/// priority source answers and no failover is reported.
#[tokio::test]
async fn happy_failover_uses_primary_source_only() {
    let manager = manager(ResilienceManagerConfig::default());

    let a = SourceConfig::builder("A", "https://a.example.com").priority(1).build();
    let b = SourceConfig::builder("B", "https://b.example.com").priority(2).build();
    manager.register_source(a.clone(), Arc::new(ValueAdapter { config: a, value: 42.0, delay: Duration::from_millis(5) }));
    manager.register_source(b.clone(), Arc::new(ValueAdapter { config: b, value: 7.0, delay: Duration::from_millis(5) }));

    let request = DataRequest::new("value", Strategy::Failover);
    let response = manager.execute_request(&request).await.expect("request should succeed");

    assert_eq!(response.metadata.sources_used, vec!["A".to_string()]);
    assert!(!response.metadata.failover_occurred);
    assert!(response.metadata.warnings.is_empty());
    assert_eq!(response.data, serde_json::json!(42.0));
}

/// Scenario 2: the primary fails, the secondary answers, and the response
/// surfaces a failover warning while the primary's failure count increments.
#[tokio::test]
async fn primary_failure_falls_over_to_secondary_with_warning() {
    let manager = manager(ResilienceManagerConfig::default());

    let a = SourceConfig::builder("A", "https://a.example.com").priority(1).build();
    let b = SourceConfig::builder("B", "https://b.example.com").priority(2).build();
    let a_calls = Arc::new(AtomicU32::new(0));
    manager.register_source(a.clone(), Arc::new(FailingAdapter { config: a, calls: Arc::clone(&a_calls) }));
    manager.register_source(b.clone(), Arc::new(ValueAdapter { config: b, value: 7.0, delay: Duration::from_millis(5) }));

    let request = DataRequest::new("value", Strategy::Failover);
    let response = manager.execute_request(&request).await.expect("failover should still succeed");

    assert_eq!(response.metadata.sources_used, vec!["A".to_string(), "B".to_string()]);
    assert!(response.metadata.failover_occurred);
    assert!(response.metadata.warnings.iter().any(|w| w.contains("failover occurred")));
    assert_eq!(a_calls.load(Ordering::SeqCst), 1);
    assert_eq!(response.data, serde_json::json!(7.0));
}

/// Scenario 3: enough consecutive failures trip the breaker, after which
/// the failing source is skipped entirely rather than retried.
#[tokio::test]
async fn repeated_failures_trip_the_circuit_and_future_calls_skip_it() {
    let config = ResilienceManagerConfig::builder()
        .circuit_breaker(
            CircuitBreakerConfig::builder()
                .failure_threshold(2)
                .success_threshold(2)
                .open_timeout(Duration::from_millis(50))
                .monitoring_window(Duration::from_secs(300))
                .build(),
        )
        .build();
    let manager = manager(config);

    let a = SourceConfig::builder("A", "https://a.example.com").priority(1).build();
    let b = SourceConfig::builder("B", "https://b.example.com").priority(2).build();
    let a_calls = Arc::new(AtomicU32::new(0));
    manager.register_source(a.clone(), Arc::new(FailingAdapter { config: a, calls: Arc::clone(&a_calls) }));
    manager.register_source(b.clone(), Arc::new(ValueAdapter { config: b, value: 7.0, delay: Duration::from_millis(5) }));

    let request = DataRequest::new("value", Strategy::Failover);

    // Two requests, each causing A to fail once and B to answer; the
    // second failure trips A's breaker (failure_threshold = 2).
    for _ in 0..2 {
        let response = manager.execute_request(&request).await.expect("B should answer");
        assert!(response.metadata.sources_used.contains(&"B".to_string()));
    }
    assert_eq!(a_calls.load(Ordering::SeqCst), 2);
    assert_eq!(manager.status().circuit_breakers_open, 1);

    // A third request must not attempt A at all: its circuit is open.
    let response = manager.execute_request(&request).await.expect("B should still answer");
    assert_eq!(response.metadata.sources_used, vec!["B".to_string()]);
    assert_eq!(a_calls.load(Ordering::SeqCst), 2, "open breaker must skip A without invoking it");
}

/// Scenario 4: fusion of two numeric sources with comparable quality and
/// priority yields a value between the two inputs and healthy confidence.
#[tokio::test]
async fn fusion_combines_two_numeric_sources() {
    let manager = manager(ResilienceManagerConfig::default());

    let quality = QualityBaseline { accuracy: 0.9, completeness: 0.9, timeliness: 0.9, reliability: 0.9 };
    let a = SourceConfig::builder("A", "https://a.example.com").priority(1).quality(quality).build();
    let b = SourceConfig::builder("B", "https://b.example.com").priority(2).quality(quality).build();
    manager.register_source(a.clone(), Arc::new(ValueAdapter { config: a, value: 10.0, delay: Duration::from_millis(100) }));
    manager.register_source(b.clone(), Arc::new(ValueAdapter { config: b, value: 12.0, delay: Duration::from_millis(200) }));

    let request = DataRequest::new("numerical", Strategy::Fusion).with_min_confidence(0.5);
    let response = manager.execute_request(&request).await.expect("fusion should succeed");

    let fused = response.data.as_f64().expect("numeric fusion result");
    assert!((10.0..=12.0).contains(&fused), "fused value {fused} should sit between the two inputs");
    assert!(response.metadata.confidence >= 0.7, "confidence {} below expected floor", response.metadata.confidence);
    assert!(!response.metadata.warnings.iter().any(|w| w.contains("below threshold")));
    assert_eq!(response.metadata.sources_used.len(), 2);
}

/// Scenario 5: a commercial source with an undisclosed price fails its
/// compliance check, and a request that requires it is rejected before any
/// adapter is ever called.
#[tokio::test]
async fn compliance_violation_blocks_a_required_source() {
    let manager = manager(ResilienceManagerConfig::default());

    let compliance = ComplianceProfile {
        requires_attribution: false,
        usage_restrictions: vec!["non-commercial".to_string()],
        license_terms: Some("CC-BY-4.0".to_string()),
        retention_days: 30,
        commercial: true,
        pricing_transparent: false,
    };
    let c = SourceConfig::builder("C", "https://broker.example.com").priority(1).compliance(compliance).build();
    let calls = Arc::new(AtomicU32::new(0));
    manager.register_source(c.clone(), Arc::new(FailingAdapter { config: c, calls: Arc::clone(&calls) }));

    let request = DataRequest::new("value", Strategy::Failover).with_required(vec!["C".to_string()]);
    let result = manager.execute_request(&request).await;

    match result {
        Err(ResilienceCoreError::ComplianceViolation { reasons }) => {
            assert!(reasons.iter().any(|r| r.contains("pricing")));
        }
        other => panic!("expected ComplianceViolation, got {other:?}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0, "no adapter call should be made once compliance vetoes the source");
}

/// Scenario 6: a scraping job targeting a path disallowed by the origin's
/// `robots.txt` fails with a robots violation and never reaches the target
/// URL (the cache is pre-seeded so the test performs no network I/O).
#[tokio::test]
async fn robots_disallow_blocks_scraping_before_any_fetch() {
    let robots_cache = Arc::new(RobotsCache::new());
    robots_cache
        .get_or_fetch("https://example.org", || async {
            Some("User-agent: *\nDisallow: /private/\n".to_string())
        })
        .await;

    let registry = ScraperRegistry::new(Arc::clone(&robots_cache));
    let job = ScrapeJob::builder("j1", "private listing", "https://example.org/private/list")
        .selector("title", ".title")
        .build();
    registry.register(job).expect("job should validate");

    let result = registry.run("j1").await;
    assert!(result.is_err(), "disallowed path must fail, not fetch");
    assert_eq!(registry.robots_violations("j1"), 1);
}
