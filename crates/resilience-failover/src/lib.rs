//! Candidate ranking and the three request strategies (`PrimaryOnly`,
//! `Failover`, `Fusion`) described in `spec.md` §4.6. This crate is the one
//! piece of the workspace that composes the rate limiter, circuit breaker,
//! reliability tracker, and fusion engine around a [`resilience_types::SourceAdapter`]
//! call.
//!
//! ```
//! use std::sync::Arc;
//! use resilience_circuitbreaker::{CircuitBreakerConfig, CircuitBreakerRegistry};
//! use resilience_failover::FailoverOrchestrator;
//! use resilience_ratelimiter::RateLimiterRegistry;
//! use resilience_reliability::{ReliabilityConfig, ReliabilityRegistry};
//!
//! let orchestrator = FailoverOrchestrator::new(
//!     Arc::new(CircuitBreakerRegistry::new(CircuitBreakerConfig::standard())),
//!     Arc::new(RateLimiterRegistry::new()),
//!     Arc::new(ReliabilityRegistry::new(ReliabilityConfig::standard())),
//! );
//! ```

mod candidate;
mod convert;
mod error;
mod orchestrator;

pub use candidate::candidates;
pub use error::FailoverError;
pub use orchestrator::{AdapterMap, FailoverOrchestrator, FailoverOutcome, FusionRunOutcome};
