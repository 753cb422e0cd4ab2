//! Public facade for the data source resilience core, per `spec.md` §4.9.
//! Composes the circuit breaker, rate limiter, reliability tracker, fusion
//! engine, compliance gate, and failover orchestrator into `registerSource`,
//! `executeRequest`, `status`, `healthCheck`, and `maintenance`.
//!
//! ```
//! use std::sync::Arc;
//! use resilience_manager::{ResilienceManager, ResilienceManagerConfig};
//! use resilience_feedpoller::{FeedPollerRegistry, ReqwestFeedFetcher};
//! use resilience_scraper::ScraperRegistry;
//! use resilience_compliance::RobotsCache;
//!
//! let manager = ResilienceManager::new(
//!     ResilienceManagerConfig::default(),
//!     Arc::new(FeedPollerRegistry::new(Arc::new(ReqwestFeedFetcher::new()))),
//!     Arc::new(ScraperRegistry::new(Arc::new(RobotsCache::new()))),
//! );
//! assert_eq!(manager.status().total_sources, 0);
//! ```

mod config;
mod manager;
mod status;

pub use config::{ResilienceManagerConfig, ResilienceManagerConfigBuilder, DEFAULT_ALERT_RETENTION, STUCK_OPEN_GRACE};
pub use manager::ResilienceManager;
pub use status::{ComponentHealth, HealthCheck, ManagerStatus};
