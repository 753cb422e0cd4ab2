//! Robots.txt parsing and per-origin caching, per `spec.md` §4.5(b) and
//! §6.3. Hand-rolled: the custom `*`/`$` wildcard semantics and
//! most-specific-user-agent-wins contract are themselves the deliverable, so
//! no off-the-shelf crate is a fit.

use chrono::Utc;
use dashmap::DashMap;
use std::future::Future;

use resilience_types::{RobotsRules, UserAgentRules};

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Parses a robots.txt document into [`RobotsRules`]. Directive names are
/// case-insensitive; groups are sequences of `User-agent` lines followed by
/// their rules, per the standard format in `spec.md` §6.3.
pub fn parse(text: &str, fetched_at: chrono::DateTime<Utc>) -> RobotsRules {
    let mut user_agents: std::collections::HashMap<String, UserAgentRules> = std::collections::HashMap::new();
    let mut sitemaps = Vec::new();
    let mut current_agents: Vec<String> = Vec::new();
    let mut group_has_rules = false;

    for raw_line in text.lines() {
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        let Some((directive, value)) = line.split_once(':') else { continue };
        let directive = directive.trim().to_ascii_lowercase();
        let value = value.trim().to_string();

        match directive.as_str() {
            "user-agent" => {
                if group_has_rules {
                    current_agents.clear();
                    group_has_rules = false;
                }
                let agent = value.to_ascii_lowercase();
                user_agents.entry(agent.clone()).or_default();
                current_agents.push(agent);
            }
            "disallow" => {
                group_has_rules = true;
                for agent in &current_agents {
                    user_agents.entry(agent.clone()).or_default().disallow.push(value.clone());
                }
            }
            "allow" => {
                group_has_rules = true;
                for agent in &current_agents {
                    user_agents.entry(agent.clone()).or_default().allow.push(value.clone());
                }
            }
            "crawl-delay" => {
                group_has_rules = true;
                if let Ok(seconds) = value.parse::<f64>() {
                    for agent in &current_agents {
                        user_agents.entry(agent.clone()).or_default().crawl_delay = Some(seconds);
                    }
                }
            }
            "sitemap" => sitemaps.push(value),
            _ => {}
        }
    }

    RobotsRules { user_agents, sitemaps, fetched_at }
}

/// Matches a robots.txt pattern against a URL path. `*` matches any
/// substring; a trailing `$` anchors the match to end-of-path.
fn pattern_matches(pattern: &str, path: &str) -> bool {
    let anchored = pattern.ends_with('$');
    let body = if anchored { &pattern[..pattern.len() - 1] } else { pattern };
    let segments: Vec<&str> = body.split('*').collect();

    let Some(first) = segments.first() else { return true };
    if !path.starts_with(first) {
        return false;
    }
    let mut pos = first.len();

    for segment in segments.iter().skip(1) {
        if segment.is_empty() {
            continue;
        }
        match path[pos..].find(segment) {
            Some(found) => pos += found + segment.len(),
            None => return false,
        }
    }

    if anchored {
        pos == path.len()
    } else {
        true
    }
}

fn specificity(pattern: &str) -> usize {
    pattern.trim_end_matches('$').len()
}

/// Evaluates `path` against the most-specific matching user-agent group
/// (exact match, falling back to `*`). Explicit `Allow` beats `Disallow` at
/// equal specificity. No matching rule group, or no matching pattern,
/// means allowed.
pub fn is_allowed(rules: &RobotsRules, user_agent: &str, path: &str) -> bool {
    let agent_key = user_agent.to_ascii_lowercase();
    let group = rules
        .user_agents
        .get(&agent_key)
        .or_else(|| rules.user_agents.get("*"));

    let Some(group) = group else { return true };

    let mut winner: Option<(usize, bool)> = None;
    for pattern in &group.disallow {
        if !pattern.is_empty() && pattern_matches(pattern, path) {
            let candidate = (specificity(pattern), false);
            winner = Some(max_candidate(winner, candidate));
        }
    }
    for pattern in &group.allow {
        if pattern_matches(pattern, path) {
            let candidate = (specificity(pattern), true);
            winner = Some(max_candidate(winner, candidate));
        }
    }

    winner.map(|(_, allowed)| allowed).unwrap_or(true)
}

fn max_candidate(current: Option<(usize, bool)>, candidate: (usize, bool)) -> (usize, bool) {
    match current {
        None => candidate,
        Some(existing) => {
            // Higher specificity wins; ties favor Allow (`true > false`).
            if candidate.0 > existing.0 || (candidate.0 == existing.0 && candidate.1 && !existing.1) {
                candidate
            } else {
                existing
            }
        }
    }
}

pub fn crawl_delay(rules: &RobotsRules, user_agent: &str) -> Option<f64> {
    let agent_key = user_agent.to_ascii_lowercase();
    rules
        .user_agents
        .get(&agent_key)
        .or_else(|| rules.user_agents.get("*"))
        .and_then(|group| group.crawl_delay)
}

/// Per-origin cache with a 24h TTL, checked lazily on read (no background
/// sweep thread, matching the circuit breaker's "no timer thread required"
/// design choice).
pub struct RobotsCache {
    entries: DashMap<String, RobotsRules>,
}

impl RobotsCache {
    pub fn new() -> Self {
        Self { entries: DashMap::new() }
    }

    /// Returns the cached rules for `origin` if unexpired; otherwise calls
    /// `fetch` (the caller's HTTP fetch), parses its body if present, or
    /// falls back to a permissive rule set if `fetch` returns `None`
    /// (fetch failed or returned non-200).
    pub async fn get_or_fetch<F, Fut>(&self, origin: &str, fetch: F) -> RobotsRules
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<String>>,
    {
        let now = Utc::now();
        if let Some(existing) = self.entries.get(origin) {
            if !existing.is_expired(now) {
                return existing.clone();
            }
        }

        let rules = match fetch().await {
            Some(body) => parse(&body, now),
            None => RobotsRules::permissive(now),
        };
        self.entries.insert(origin.to_string(), rules.clone());
        rules
    }

    pub fn peek(&self, origin: &str) -> Option<RobotsRules> {
        self.entries.get(origin).map(|e| e.clone())
    }
}

impl Default for RobotsCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disallow_prefix_blocks_subpaths() {
        let rules = parse("User-agent: *\nDisallow: /private/\n", Utc::now());
        assert!(!is_allowed(&rules, "anybot", "/private/list"));
        assert!(is_allowed(&rules, "anybot", "/public/list"));
    }

    #[test]
    fn explicit_allow_wins_at_equal_specificity() {
        let rules = parse(
            "User-agent: *\nDisallow: /data\nAllow: /data\n",
            Utc::now(),
        );
        assert!(is_allowed(&rules, "anybot", "/data"));
    }

    #[test]
    fn more_specific_disallow_overrides_general_allow() {
        let rules = parse(
            "User-agent: *\nAllow: /\nDisallow: /data/private\n",
            Utc::now(),
        );
        assert!(!is_allowed(&rules, "anybot", "/data/private/x"));
        assert!(is_allowed(&rules, "anybot", "/data/public"));
    }

    #[test]
    fn wildcard_and_end_anchor_are_honored() {
        let rules = parse("User-agent: *\nDisallow: /*.pdf$\n", Utc::now());
        assert!(!is_allowed(&rules, "anybot", "/reports/q1.pdf"));
        assert!(is_allowed(&rules, "anybot", "/reports/q1.pdf.html"));
    }

    #[test]
    fn exact_agent_group_is_more_specific_than_wildcard() {
        let rules = parse(
            "User-agent: *\nDisallow: /\nUser-agent: goodbot\nDisallow:\n",
            Utc::now(),
        );
        assert!(!is_allowed(&rules, "otherbot", "/anything"));
        assert!(is_allowed(&rules, "goodbot", "/anything"));
    }

    #[tokio::test]
    async fn failed_fetch_is_permissive() {
        let cache = RobotsCache::new();
        let rules = cache.get_or_fetch("https://example.org", || async { None }).await;
        assert!(is_allowed(&rules, "anybot", "/anything"));
    }
}
