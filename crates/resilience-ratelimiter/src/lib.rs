//! Per-source token/window rate limiting: three rolling windows (second,
//! hour, day), aligned to UTC boundaries, checked and consumed atomically so
//! a request can never partially consume its budget.
//!
//! ```
//! use resilience_ratelimiter::{RateLimitConfig, RateLimiterRegistry};
//!
//! let registry = RateLimiterRegistry::new();
//! registry.register("nasa-power", RateLimitConfig::builder().per_second(5).build());
//! assert!(registry.acquire("nasa-power").is_ok());
//! ```

mod config;
mod error;
mod events;
mod limiter;
mod registry;

pub use config::{RateLimitConfig, RateLimitConfigBuilder};
pub use error::RateLimitExceeded;
pub use events::RateLimiterEvent;
pub use limiter::RemainingPermits;
pub use registry::RateLimiterRegistry;
