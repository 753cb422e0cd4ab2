//! `StreamConfig`: one registered feed's polling parameters and its filter
//! and transform chains, per `spec.md` §4.7.

use std::collections::HashMap;
use std::time::Duration;

use crate::filter::FilterRule;
use crate::parse::FeedType;
use crate::transform::Transform;

#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub id: String,
    pub url: String,
    pub feed_type: FeedType,
    pub poll_interval: Duration,
    pub timeout: Duration,
    pub user_agent: String,
    pub headers: HashMap<String, String>,
    pub filters: Vec<FilterRule>,
    pub transforms: Vec<Transform>,
    /// Baseline quality figure fed into `qualityScore`'s formula.
    pub quality_baseline: f64,
}

impl StreamConfig {
    pub fn builder(id: impl Into<String>, url: impl Into<String>, feed_type: FeedType) -> StreamConfigBuilder {
        StreamConfigBuilder::new(id.into(), url.into(), feed_type)
    }
}

pub struct StreamConfigBuilder {
    id: String,
    url: String,
    feed_type: FeedType,
    poll_interval: Duration,
    timeout: Duration,
    user_agent: String,
    headers: HashMap<String, String>,
    filters: Vec<FilterRule>,
    transforms: Vec<Transform>,
    quality_baseline: f64,
}

impl StreamConfigBuilder {
    fn new(id: String, url: String, feed_type: FeedType) -> Self {
        Self {
            id,
            url,
            feed_type,
            poll_interval: Duration::from_secs(300),
            timeout: Duration::from_millis(10_000),
            user_agent: "resilience-feedpoller/1.0".to_string(),
            headers: HashMap::new(),
            filters: Vec::new(),
            transforms: Vec::new(),
            quality_baseline: 1.0,
        }
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn filter(mut self, rule: FilterRule) -> Self {
        self.filters.push(rule);
        self
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        self.transforms.push(transform);
        self
    }

    pub fn quality_baseline(mut self, baseline: f64) -> Self {
        self.quality_baseline = baseline;
        self
    }

    pub fn build(self) -> StreamConfig {
        StreamConfig {
            id: self.id,
            url: self.url,
            feed_type: self.feed_type,
            poll_interval: self.poll_interval,
            timeout: self.timeout,
            user_agent: self.user_agent,
            headers: self.headers,
            filters: self.filters,
            transforms: self.transforms,
            quality_baseline: self.quality_baseline,
        }
    }
}
