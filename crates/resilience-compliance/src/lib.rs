//! Compliance gating for the data source resilience core, per `spec.md`
//! §4.5: a cached pre-request licensing/policy check per source, and a
//! robots.txt cache + parser gating respectful scraping.
//!
//! Both caches are `dashmap`-backed, read-mostly, fine-grained-locked
//! structures, adopted from the wider example pack's use of `dashmap` for
//! exactly this kind of shared cache. TTL expiry is evaluated lazily on
//! read, never via a background sweep thread.
//!
//! ```
//! use resilience_compliance::{evaluate, CheckStatus};
//! use resilience_types::{ComplianceProfile, SourceConfig};
//!
//! let config = SourceConfig::builder("esmap", "https://esmap.org")
//!     .compliance(ComplianceProfile {
//!         license_terms: Some("CC-BY-4.0".into()),
//!         usage_restrictions: vec!["attribution required".into()],
//!         retention_days: 90,
//!         commercial: false,
//!         pricing_transparent: false,
//!         requires_attribution: true,
//!     })
//!     .build();
//! assert_eq!(evaluate(&config).status, CheckStatus::Pass);
//! ```

mod compliance;
mod error;
mod robots;

pub use compliance::{evaluate, CheckStatus, ComplianceCache, ComplianceCheck};
pub use error::ComplianceViolation;
pub use robots::{crawl_delay, is_allowed, parse as parse_robots, RobotsCache};
