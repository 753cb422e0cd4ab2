//! `ScrapeJob` configuration, per `spec.md` §4.8.

use std::collections::HashMap;

use crate::rules::ValidationRule;

/// Origin-scoped rate limit for one job: a minimum delay between requests
/// plus a cap on concurrent in-flight fetches.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitSettings {
    pub delay_ms: u64,
    pub concurrent: u32,
}

impl RateLimitSettings {
    /// `requestsPerMinute = ceil(60000/delayMs)`, per spec §4.8 step 3.
    pub fn requests_per_minute(&self) -> u32 {
        let delay = self.delay_ms.max(1);
        (((60_000 + delay - 1) / delay) as u32).max(1)
    }
}

#[derive(Debug, Clone)]
pub struct ScrapeJob {
    pub id: String,
    pub name: String,
    pub target_url: String,
    pub selectors: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    pub user_agent: String,
    pub rate_limit: RateLimitSettings,
    pub respect_robots_txt: bool,
    pub data_validation: Vec<ValidationRule>,
}

impl ScrapeJob {
    pub fn builder(
        id: impl Into<String>,
        name: impl Into<String>,
        target_url: impl Into<String>,
    ) -> ScrapeJobBuilder {
        ScrapeJobBuilder::new(id.into(), name.into(), target_url.into())
    }
}

pub struct ScrapeJobBuilder {
    id: String,
    name: String,
    target_url: String,
    selectors: HashMap<String, String>,
    headers: HashMap<String, String>,
    user_agent: String,
    rate_limit: RateLimitSettings,
    respect_robots_txt: bool,
    data_validation: Vec<ValidationRule>,
}

impl ScrapeJobBuilder {
    fn new(id: String, name: String, target_url: String) -> Self {
        Self {
            id,
            name,
            target_url,
            selectors: HashMap::new(),
            headers: HashMap::new(),
            user_agent: "ResilienceScraperBot/1.0 (+https://example.com/contact)".to_string(),
            rate_limit: RateLimitSettings { delay_ms: 1000, concurrent: 1 },
            respect_robots_txt: true,
            data_validation: Vec::new(),
        }
    }

    pub fn selector(mut self, field: impl Into<String>, css: impl Into<String>) -> Self {
        self.selectors.insert(field.into(), css.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn rate_limit(mut self, delay_ms: u64, concurrent: u32) -> Self {
        self.rate_limit = RateLimitSettings { delay_ms, concurrent };
        self
    }

    pub fn respect_robots_txt(mut self, respect: bool) -> Self {
        self.respect_robots_txt = respect;
        self
    }

    pub fn validation_rule(mut self, rule: ValidationRule) -> Self {
        self.data_validation.push(rule);
        self
    }

    pub fn build(self) -> ScrapeJob {
        ScrapeJob {
            id: self.id,
            name: self.name,
            target_url: self.target_url,
            selectors: self.selectors,
            headers: self.headers,
            user_agent: self.user_agent,
            rate_limit: self.rate_limit,
            respect_robots_txt: self.respect_robots_txt,
            data_validation: self.data_validation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_per_minute_rounds_up() {
        assert_eq!(RateLimitSettings { delay_ms: 1000, concurrent: 1 }.requests_per_minute(), 60);
        assert_eq!(RateLimitSettings { delay_ms: 4000, concurrent: 1 }.requests_per_minute(), 15);
        assert_eq!(RateLimitSettings { delay_ms: 7000, concurrent: 1 }.requests_per_minute(), 9);
    }
}
