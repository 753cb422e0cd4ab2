//! `RobotsRules`, per `spec.md` §3 and §6.3. Parsing lives in
//! `resilience-compliance`; this crate only carries the parsed shape so
//! other components (the scraper runner) can read it without depending on
//! the parser.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserAgentRules {
    pub allow: Vec<String>,
    pub disallow: Vec<String>,
    pub crawl_delay: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RobotsRules {
    pub user_agents: HashMap<String, UserAgentRules>,
    pub sitemaps: Vec<String>,
    pub fetched_at: DateTime<Utc>,
}

impl RobotsRules {
    pub const TTL_SECS: i64 = 24 * 60 * 60;

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        (now - self.fetched_at).num_seconds() >= Self::TTL_SECS
    }

    /// An empty rule set (no `Disallow` anywhere), used when a robots.txt
    /// fetch fails or returns non-200: "treat as no rules and allow by
    /// default."
    pub fn permissive(now: DateTime<Utc>) -> Self {
        Self {
            user_agents: HashMap::new(),
            sitemaps: Vec::new(),
            fetched_at: now,
        }
    }
}
