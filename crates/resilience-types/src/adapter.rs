//! `SourceAdapter`: the interface `spec.md` §6.1 says the core consumes
//! from each out-of-scope domain ingestion client (World Bank, NASA POWER,
//! IEA, OpenStreetMap, ESMAP, ...).
//!
//! A single `async fn` method, kept object-safe via `async_trait` (the
//! pack's standard idiom for trait objects holding `async fn` before
//! native support is ergonomic enough here) so adapters live in a
//! `HashMap<String, Arc<dyn SourceAdapter>>` registry, each a plain value.
//! Adapters MUST NOT implement their own retries or circuit logic; the core
//! calls them under circuit-breaker and rate-limiter guards.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::source::SourceConfig;

#[derive(Debug, Clone)]
pub struct AdapterSuccess {
    pub data: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    pub request_id: String,
    pub rate_limit_remaining: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct AdapterFailure {
    pub message: String,
}

impl std::fmt::Display for AdapterFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AdapterFailure {}

#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    fn config(&self) -> &SourceConfig;

    async fn fetch(&self, params: &HashMap<String, String>) -> Result<AdapterSuccess, AdapterFailure>;
}
