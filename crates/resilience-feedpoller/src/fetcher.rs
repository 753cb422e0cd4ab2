//! `FeedFetcher`: the HTTP boundary the ticker calls through, kept as a
//! trait (mirroring `resilience_types::SourceAdapter`) so tests can swap in
//! a canned response instead of making a real network call.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::FeedPollerError;

#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, url: &str, headers: &HashMap<String, String>, user_agent: &str, timeout: Duration)
        -> Result<Vec<u8>, FeedPollerError>;
}

/// The default, real-network fetcher, backed by a shared `reqwest::Client`.
pub struct ReqwestFeedFetcher {
    client: reqwest::Client,
}

impl ReqwestFeedFetcher {
    pub fn new() -> Self {
        Self { client: reqwest::Client::new() }
    }
}

impl Default for ReqwestFeedFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedFetcher for ReqwestFeedFetcher {
    async fn fetch(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Vec<u8>, FeedPollerError> {
        let mut request = self.client.get(url).header("User-Agent", user_agent).timeout(timeout);
        for (key, value) in headers {
            request = request.header(key.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(|e| FeedPollerError::FetchFailed(e.to_string()))?;
        let bytes = response.bytes().await.map_err(|e| FeedPollerError::FetchFailed(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
