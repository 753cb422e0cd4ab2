//! Per-source circuit breaker: a `CLOSED` / `OPEN` / `HALF_OPEN` state machine
//! that isolates a failing upstream data source so the failover orchestrator
//! can skip straight past it instead of paying its timeout on every attempt.
//!
//! ```
//! use resilience_circuitbreaker::{CircuitBreakerConfig, CircuitBreakerRegistry, CircuitState};
//! use resilience_core::Deadline;
//! use std::time::Duration;
//!
//! # async fn example() {
//! let registry = CircuitBreakerRegistry::new(CircuitBreakerConfig::standard());
//! registry.register("world-bank", None);
//!
//! let (_handle, mut cancel) = resilience_core::cancel_pair();
//! let result: Result<i32, _> = registry
//!     .execute("world-bank", Deadline::after(Duration::from_millis(500)), &mut cancel, || async {
//!         Ok::<i32, &str>(42)
//!     })
//!     .await;
//! assert!(result.is_ok());
//! assert_eq!(registry.state("world-bank"), Some(CircuitState::Closed));
//! # }
//! ```

mod circuit;
mod config;
mod error;
mod events;
mod registry;
mod state;

pub use config::{CircuitBreakerConfig, CircuitBreakerConfigBuilder};
pub use error::CircuitBreakerError;
pub use events::CircuitBreakerEvent;
pub use registry::CircuitBreakerRegistry;
pub use state::{CircuitBreakerState, CircuitState};
