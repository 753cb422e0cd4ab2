//! Per-stream RSS/Atom/JSON Feed/News-API polling, filtering, transformation,
//! and deduplication, per `spec.md` §4.7.
//!
//! ```
//! use std::sync::Arc;
//! use resilience_feedpoller::{FeedPollerRegistry, FeedType, ReqwestFeedFetcher, StreamConfig};
//!
//! let registry = FeedPollerRegistry::new(Arc::new(ReqwestFeedFetcher::new()));
//! registry.register(
//!     StreamConfig::builder("world-bank-news", "https://example.com/feed.xml", FeedType::Rss).build(),
//! );
//! ```

mod dedupe;
mod error;
mod fetcher;
mod filter;
mod metrics;
mod parse;
mod poller;
mod stream;
mod transform;

pub use dedupe::DedupeCache;
pub use error::FeedPollerError;
pub use fetcher::{FeedFetcher, ReqwestFeedFetcher};
pub use filter::{FilterOp, FilterRule};
pub use metrics::StreamMetrics;
pub use parse::{parse, FeedType};
pub use poller::{FeedPollerEvent, FeedPollerRegistry};
pub use stream::{StreamConfig, StreamConfigBuilder};
pub use transform::{MapOp, Transform, TransformOutcome};
