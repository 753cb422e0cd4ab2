//! Multi-source fusion: combines parallel contributions from the failover
//! orchestrator's fan-out into a single answer with a bounded confidence
//! score, per `spec.md` §4.4.
//!
//! Pure-function module, no background state: algorithm selection, weight,
//! and confidence formulas are implemented exactly as specified and
//! unit-tested against concrete fixtures.
//!
//! ```
//! use resilience_fusion::{fuse, FusionOutput, FusionValue};
//! use resilience_types::{ContributionStatus, SourceContribution};
//! use std::time::Duration;
//!
//! let contributions = vec![
//!     SourceContribution { source_id: "a".into(), status: ContributionStatus::Success, data: Some(FusionValue::Number(10.0)), latency: Duration::from_millis(100), confidence: 0.9, weight: 0.95 },
//!     SourceContribution { source_id: "b".into(), status: ContributionStatus::Success, data: Some(FusionValue::Number(12.0)), latency: Duration::from_millis(200), confidence: 0.8, weight: 0.80 },
//! ];
//! let outcome = fuse("numerical", &contributions, 0.5).unwrap();
//! assert!(matches!(outcome.output, FusionOutput::Scalar(FusionValue::Number(_))));
//! ```

mod algorithms;
mod engine;
mod error;
mod value;
mod weight;

pub use algorithms::{FusionOutput, TemporalContribution};
pub use engine::{fuse, select_algorithm, Algorithm, FusionOutcome};
pub use error::FusionError;
pub use value::{FusionValue, SeriesPoint};
pub use weight::{compute_weight, WeightInputs};
