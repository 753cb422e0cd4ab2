//! Candidate selection: filters a request's eligible sources and sorts them
//! `(state == CLOSED desc, priority asc, userSatisfaction desc)`, per
//! `spec.md` §4.6 step 2.

use resilience_circuitbreaker::{CircuitBreakerRegistry, CircuitState};
use resilience_reliability::ReliabilityRegistry;
use resilience_types::{SourceConfig, SourceFilters};

pub fn candidates(
    sources: &[SourceConfig],
    filters: &SourceFilters,
    breaker: &CircuitBreakerRegistry,
    reliability: &ReliabilityRegistry,
) -> Vec<SourceConfig> {
    let mut pool: Vec<SourceConfig> = sources
        .iter()
        .filter(|s| !filters.excluded.contains(&s.id))
        .filter(|s| filters.required.is_empty() || filters.required.contains(&s.id))
        .cloned()
        .collect();

    pool.sort_by(|a, b| {
        let a_closed = breaker.state(&a.id) != Some(CircuitState::Open);
        let b_closed = breaker.state(&b.id) != Some(CircuitState::Open);
        let a_satisfaction = reliability.metrics(&a.id).map(|m| m.user_satisfaction).unwrap_or(1.0);
        let b_satisfaction = reliability.metrics(&b.id).map(|m| m.user_satisfaction).unwrap_or(1.0);

        b_closed
            .cmp(&a_closed)
            .then(a.priority.cmp(&b.priority))
            .then(b_satisfaction.partial_cmp(&a_satisfaction).unwrap_or(std::cmp::Ordering::Equal))
    });

    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use resilience_circuitbreaker::CircuitBreakerConfig;

    fn source(id: &str, priority: u32) -> SourceConfig {
        SourceConfig::builder(id, "https://example.com").priority(priority).build()
    }

    #[test]
    fn sorts_by_priority_when_all_closed() {
        let breaker = CircuitBreakerRegistry::new(CircuitBreakerConfig::standard());
        let reliability = ReliabilityRegistry::new(Default::default());
        breaker.register("A", None);
        breaker.register("B", None);
        reliability.register("A");
        reliability.register("B");

        let sources = vec![source("B", 2), source("A", 1)];
        let ranked = candidates(&sources, &SourceFilters::default(), &breaker, &reliability);
        assert_eq!(ranked[0].id, "A");
        assert_eq!(ranked[1].id, "B");
    }

    #[test]
    fn excluded_sources_are_dropped() {
        let breaker = CircuitBreakerRegistry::new(CircuitBreakerConfig::standard());
        let reliability = ReliabilityRegistry::new(Default::default());
        breaker.register("A", None);
        reliability.register("A");
        let sources = vec![source("A", 1)];
        let filters = SourceFilters { excluded: vec!["A".to_string()], ..Default::default() };
        let ranked = candidates(&sources, &filters, &breaker, &reliability);
        assert!(ranked.is_empty());
    }
}
