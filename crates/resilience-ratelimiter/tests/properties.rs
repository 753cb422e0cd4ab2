use proptest::prelude::*;
use resilience_ratelimiter::{RateLimitConfig, RateLimiterRegistry};

proptest! {
    /// Invariant 3: total `acquire` grants within a single (never-refreshed,
    /// i.e. all attempts land in the same second) window never exceed the
    /// configured per-second limit.
    #[test]
    fn grants_never_exceed_per_second_limit(
        limit in 1u32..20,
        attempts in 1usize..200,
    ) {
        let registry = RateLimiterRegistry::new();
        registry.register("A", RateLimitConfig::builder().per_second(limit).build());

        let mut grants = 0u32;
        for _ in 0..attempts {
            if registry.acquire("A").is_ok() {
                grants += 1;
            }
        }

        prop_assert!(grants <= limit);
    }

    #[test]
    fn hour_and_day_limits_both_bound_grants(
        per_second in 50u32..1000,
        per_hour in 1u32..50,
        attempts in 1usize..200,
    ) {
        let registry = RateLimiterRegistry::new();
        registry.register(
            "A",
            RateLimitConfig::builder()
                .per_second(per_second)
                .per_hour(per_hour)
                .build(),
        );

        let mut grants = 0u32;
        for _ in 0..attempts {
            if registry.acquire("A").is_ok() {
                grants += 1;
            }
        }

        prop_assert!(grants <= per_hour);
    }
}
