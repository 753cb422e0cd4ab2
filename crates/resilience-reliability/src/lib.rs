//! Rolling reliability metrics, incidents, and quality scoring for the data
//! source resilience core (`spec.md` §4.3).
//!
//! No teacher analogue exists for this component among the pattern-middleware
//! crates; it is grounded on the teacher's point-in-time `CircuitMetrics`
//! snapshot idiom (a plain, clonable struct recomputed from a bounded ring of
//! samples), generalized from one metric to the full `SourceMetrics` surface.
//!
//! ```
//! use resilience_reliability::{ReliabilityConfig, ReliabilityRegistry};
//! use resilience_types::PerformancePoint;
//! use std::time::Duration;
//!
//! let registry = ReliabilityRegistry::new(ReliabilityConfig::standard());
//! registry.register("nasa-power");
//! registry.record(
//!     "nasa-power",
//!     PerformancePoint { timestamp: chrono::Utc::now(), latency: Duration::from_millis(120), success: true },
//!     None,
//! );
//! assert_eq!(registry.metrics("nasa-power").unwrap().uptime_pct, 100.0);
//! ```

mod config;
mod events;
mod registry;
mod tracker;

pub use config::{ReliabilityConfig, ReliabilityConfigBuilder};
pub use events::ReliabilityEvent;
pub use registry::ReliabilityRegistry;
pub use tracker::Alert;
