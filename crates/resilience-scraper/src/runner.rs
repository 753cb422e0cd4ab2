//! Scraping job registry and execution pipeline, per `spec.md` §4.8.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use reqwest::Client;
use resilience_compliance::RobotsCache;
use scraper::Html;

use crate::error::ScraperError;
use crate::job::ScrapeJob;
use crate::origin::OriginLimiter;
use crate::rules::{RuleSeverity, RuleViolation};
use crate::selector::extract;

/// Result of one run of a scraping job.
#[derive(Debug, Clone)]
pub struct ScrapingResult {
    pub job_id: String,
    pub fields: HashMap<String, Option<String>>,
    pub warnings: Vec<String>,
    pub violations: Vec<RuleViolation>,
    pub completeness: f64,
    pub accuracy: f64,
    pub freshness: f64,
}

#[derive(Default)]
struct JobCounters {
    robots_violations: u64,
}

pub struct ScraperRegistry {
    client: Client,
    origin_limiter: OriginLimiter,
    robots_cache: Arc<RobotsCache>,
    jobs: DashMap<String, ScrapeJob>,
    counters: DashMap<String, JobCounters>,
}

impl ScraperRegistry {
    pub fn new(robots_cache: Arc<RobotsCache>) -> Self {
        Self {
            client: Client::new(),
            origin_limiter: OriginLimiter::new(),
            robots_cache,
            jobs: DashMap::new(),
            counters: DashMap::new(),
        }
    }

    /// Validates `job` per spec §4.8 step 1 and registers it if valid.
    pub fn register(&self, job: ScrapeJob) -> Result<(), ScraperError> {
        validate_job(&job)?;
        self.counters.entry(job.id.clone()).or_default();
        self.jobs.insert(job.id.clone(), job);
        Ok(())
    }

    pub fn robots_violations(&self, job_id: &str) -> u64 {
        self.counters.get(job_id).map(|c| c.robots_violations).unwrap_or(0)
    }

    pub fn job_ids(&self) -> Vec<String> {
        self.jobs.iter().map(|e| e.key().clone()).collect()
    }

    /// Runs the full fetch/extract/validate pipeline for `job_id`.
    pub async fn run(&self, job_id: &str) -> Result<ScrapingResult, ScraperError> {
        let job = self
            .jobs
            .get(job_id)
            .map(|e| e.value().clone())
            .ok_or_else(|| ScraperError::UnknownJob(job_id.to_string()))?;

        let origin = origin_of(&job.target_url)?;

        if job.respect_robots_txt {
            let path = path_of(&job.target_url);
            let client = self.client.clone();
            let fetch_origin = origin.clone();
            let rules = self
                .robots_cache
                .get_or_fetch(&origin, || async move {
                    let url = format!("{fetch_origin}/robots.txt");
                    client.get(url).send().await.ok()?.text().await.ok()
                })
                .await;

            if !resilience_compliance::is_allowed(&rules, &job.user_agent, &path) {
                self.counters.entry(job_id.to_string()).or_default().robots_violations += 1;
                return Err(ScraperError::RobotsDisallowed { user_agent: job.user_agent.clone(), path });
            }
        }

        let _permit = self
            .origin_limiter
            .acquire(&origin, job.rate_limit.delay_ms, job.rate_limit.concurrent)
            .await;

        let mut request = self.client.get(&job.target_url).header("User-Agent", job.user_agent.as_str());
        for (key, value) in &job.headers {
            request = request.header(key.as_str(), value.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| ScraperError::FetchFailed(e.to_string()))?;
        let body = response.text().await.map_err(|e| ScraperError::FetchFailed(e.to_string()))?;

        let document = Html::parse_document(&body);
        let mut fields = HashMap::new();
        let mut warnings = Vec::new();
        for (field, selector) in &job.selectors {
            let outcome = extract(&document, field, selector);
            if let Some(warning) = outcome.warning {
                warnings.push(warning);
            }
            fields.insert(field.clone(), outcome.value);
        }

        let mut violations = Vec::new();
        for rule in &job.data_validation {
            if let Some(violation) = rule.evaluate(fields.get(rule.field()).and_then(|v| v.as_deref())) {
                violations.push(violation);
            }
        }

        let total = fields.len().max(1) as f64;
        let non_null = fields.values().filter(|v| v.is_some()).count() as f64;
        let errors = violations.iter().filter(|v| v.severity == RuleSeverity::Error).count() as f64;

        Ok(ScrapingResult {
            job_id: job.id.clone(),
            completeness: non_null / total,
            accuracy: (1.0 - errors / total).max(0.0),
            freshness: 0.9,
            fields,
            warnings,
            violations,
        })
    }
}

/// Rejects jobs that do not meet spec §4.8 step 1's registration invariants.
fn validate_job(job: &ScrapeJob) -> Result<(), ScraperError> {
    let reason = if reqwest::Url::parse(&job.target_url).is_err() {
        Some("targetUrl is not a valid URL".to_string())
    } else if job.selectors.is_empty() {
        Some("at least one selector is required".to_string())
    } else if job.rate_limit.delay_ms == 0 && job.rate_limit.concurrent == 0 {
        Some("rate limit must be configured".to_string())
    } else if !job.user_agent.to_ascii_lowercase().contains("bot") {
        Some("user agent must identify as a bot".to_string())
    } else if !contains_http_contact(&job.user_agent) {
        Some("user agent must include an http(s) contact URL".to_string())
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ScraperError::InvalidJob { id: job.id.clone(), reason }),
        None => Ok(()),
    }
}

fn contains_http_contact(user_agent: &str) -> bool {
    user_agent.contains("http://") || user_agent.contains("https://")
}

fn origin_of(target_url: &str) -> Result<String, ScraperError> {
    let url = reqwest::Url::parse(target_url).map_err(|e| ScraperError::FetchFailed(e.to_string()))?;
    Ok(format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default()))
}

fn path_of(target_url: &str) -> String {
    reqwest::Url::parse(target_url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| "/".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::ValidationRule;

    fn valid_job() -> ScrapeJob {
        ScrapeJob::builder("j1", "energy prices", "https://example.com/prices")
            .selector("price", "#price")
            .build()
    }

    #[test]
    fn valid_job_registers() {
        let registry = ScraperRegistry::new(Arc::new(RobotsCache::new()));
        assert!(registry.register(valid_job()).is_ok());
    }

    #[test]
    fn job_without_selectors_is_rejected() {
        let job = ScrapeJob::builder("j2", "n", "https://example.com").build();
        let registry = ScraperRegistry::new(Arc::new(RobotsCache::new()));
        assert!(matches!(registry.register(job), Err(ScraperError::InvalidJob { .. })));
    }

    #[test]
    fn job_with_bad_user_agent_is_rejected() {
        let job = ScrapeJob::builder("j3", "n", "https://example.com")
            .selector("price", "#price")
            .user_agent("curl/8.0")
            .build();
        let registry = ScraperRegistry::new(Arc::new(RobotsCache::new()));
        assert!(matches!(registry.register(job), Err(ScraperError::InvalidJob { .. })));
    }

    #[test]
    fn invalid_url_is_rejected() {
        let job = ScrapeJob::builder("j4", "n", "not-a-url")
            .selector("price", "#price")
            .build();
        let registry = ScraperRegistry::new(Arc::new(RobotsCache::new()));
        assert!(matches!(registry.register(job), Err(ScraperError::InvalidJob { .. })));
    }

    #[test]
    fn unknown_job_validate_rule() {
        let rule = ValidationRule::Required { field: "price".to_string() };
        assert!(rule.evaluate(None).is_some());
    }
}
