//! Origin-scoped web scraping for the data source resilience core, per
//! `spec.md` §4.8: job registration with validation, a robots.txt-aware
//! compliance gate, origin-scoped rate limiting, minimal CSS-selector field
//! extraction, and rule-based validation of the extracted data.
//!
//! ```
//! use std::sync::Arc;
//! use resilience_compliance::RobotsCache;
//! use resilience_scraper::{ScrapeJob, ScraperRegistry};
//!
//! let registry = ScraperRegistry::new(Arc::new(RobotsCache::new()));
//! let job = ScrapeJob::builder("grid-prices", "grid prices", "https://example.com/prices")
//!     .selector("price", "#price")
//!     .build();
//! registry.register(job).unwrap();
//! ```

mod error;
mod job;
mod origin;
mod rules;
mod runner;
mod selector;

pub use error::ScraperError;
pub use job::{RateLimitSettings, ScrapeJob, ScrapeJobBuilder};
pub use origin::{OriginLimiter, OriginPermit};
pub use rules::{RuleSeverity, RuleViolation, ValidationRule};
pub use runner::{ScrapingResult, ScraperRegistry};
pub use selector::{extract, ExtractionOutcome};
