//! `FeedPollerRegistry`: one cooperative ticker task per registered stream,
//! per `spec.md` §4.7. Scheduling is cooperative (`tokio::time::interval`);
//! stopping a stream waits for any in-flight poll to finish before
//! cancelling its ticker, per the spec's scheduling model.

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Instant as StdInstant;

use dashmap::DashMap;
use resilience_core::{cancel_pair, CancelHandle, CancelToken, EventListeners, ResilienceEvent};
use resilience_types::FeedItem;
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tokio::task::JoinHandle;

use crate::dedupe::DedupeCache;
use crate::error::FeedPollerError;
use crate::fetcher::FeedFetcher;
use crate::metrics::StreamMetrics;
use crate::parse::parse;
use crate::stream::StreamConfig;
use crate::transform::{self, TransformOutcome};

#[derive(Debug, Clone)]
pub enum FeedPollerEvent {
    PollCompleted { stream_id: String, timestamp: StdInstant, new_items: usize, duplicates: usize },
    PollFailed { stream_id: String, timestamp: StdInstant, message: String },
}

impl ResilienceEvent for FeedPollerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            FeedPollerEvent::PollCompleted { .. } => "poll_completed",
            FeedPollerEvent::PollFailed { .. } => "poll_failed",
        }
    }

    fn timestamp(&self) -> StdInstant {
        match self {
            FeedPollerEvent::PollCompleted { timestamp, .. } | FeedPollerEvent::PollFailed { timestamp, .. } => *timestamp,
        }
    }

    fn subject(&self) -> &str {
        match self {
            FeedPollerEvent::PollCompleted { stream_id, .. } | FeedPollerEvent::PollFailed { stream_id, .. } => stream_id,
        }
    }
}

struct StreamHandle {
    config: StreamConfig,
    dedupe: StdMutex<DedupeCache>,
    metrics: StdMutex<StreamMetrics>,
    cancel_handle: CancelHandle,
    cancel_token: CancelToken,
    task: AsyncMutex<Option<JoinHandle<()>>>,
}

pub struct FeedPollerRegistry {
    fetcher: Arc<dyn FeedFetcher>,
    streams: DashMap<String, Arc<StreamHandle>>,
    listeners: EventListeners<FeedPollerEvent>,
}

impl FeedPollerRegistry {
    pub fn new(fetcher: Arc<dyn FeedFetcher>) -> Self {
        Self { fetcher, streams: DashMap::new(), listeners: EventListeners::new() }
    }

    pub fn with_listeners(mut self, listeners: EventListeners<FeedPollerEvent>) -> Self {
        self.listeners = listeners;
        self
    }

    pub fn register(&self, config: StreamConfig) {
        let (cancel_handle, cancel_token) = cancel_pair();
        let handle = Arc::new(StreamHandle {
            config,
            dedupe: StdMutex::new(DedupeCache::new()),
            metrics: StdMutex::new(StreamMetrics::new()),
            cancel_handle,
            cancel_token,
            task: AsyncMutex::new(None),
        });
        self.streams.insert(handle.config.id.clone(), handle);
    }

    pub fn metrics(&self, stream_id: &str) -> Option<StreamMetrics> {
        self.streams.get(stream_id).map(|h| *h.metrics.lock().expect("metrics mutex poisoned"))
    }

    /// Runs a single fetch/parse/filter/transform/dedupe pass for `stream_id`
    /// and returns the newly delivered items (never the duplicates).
    pub async fn poll_once(&self, stream_id: &str) -> Result<Vec<FeedItem>, FeedPollerError> {
        let Some(handle) = self.streams.get(stream_id).map(|e| Arc::clone(e.value())) else {
            return Err(FeedPollerError::UnknownStream(stream_id.to_string()));
        };

        let start = StdInstant::now();
        let fetch_result = self
            .fetcher
            .fetch(&handle.config.url, &handle.config.headers, &handle.config.user_agent, handle.config.timeout)
            .await;

        let body = match fetch_result {
            Ok(body) => body,
            Err(err) => {
                handle.metrics.lock().expect("metrics mutex poisoned").record_error();
                self.listeners.emit(&FeedPollerEvent::PollFailed {
                    stream_id: stream_id.to_string(),
                    timestamp: StdInstant::now(),
                    message: err.to_string(),
                });
                return Err(err);
            }
        };

        let parsed = parse(handle.config.feed_type, stream_id, &body);

        let mut new_items = Vec::new();
        let mut duplicates = 0u64;
        let mut errors = 0u64;

        for item in parsed {
            if !handle.config.filters.iter().all(|rule| rule.matches(&item)) {
                continue;
            }
            match transform::apply(item, &handle.config.transforms) {
                TransformOutcome::Dropped => continue,
                TransformOutcome::Invalid => {
                    errors += 1;
                    continue;
                }
                TransformOutcome::Kept(item) => {
                    let key = item.dedupe_key();
                    let mut dedupe = handle.dedupe.lock().expect("dedupe mutex poisoned");
                    if dedupe.check_and_insert(key) {
                        duplicates += 1;
                    } else {
                        drop(dedupe);
                        new_items.push(item);
                    }
                }
            }
        }

        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
        {
            let mut metrics = handle.metrics.lock().expect("metrics mutex poisoned");
            for _ in 0..errors {
                metrics.record_error();
            }
            metrics.record_success(new_items.len() as u64, duplicates, latency_ms, handle.config.quality_baseline);
        }

        self.listeners.emit(&FeedPollerEvent::PollCompleted {
            stream_id: stream_id.to_string(),
            timestamp: StdInstant::now(),
            new_items: new_items.len(),
            duplicates: duplicates as usize,
        });

        Ok(new_items)
    }

    /// Starts the cooperative ticker for `stream_id`, forwarding newly
    /// delivered items to `sink`. A stream already running is left alone.
    pub fn start(self: &Arc<Self>, stream_id: &str, sink: mpsc::UnboundedSender<FeedItem>) -> Result<(), FeedPollerError> {
        let Some(handle) = self.streams.get(stream_id).map(|e| Arc::clone(e.value())) else {
            return Err(FeedPollerError::UnknownStream(stream_id.to_string()));
        };

        let registry = Arc::clone(self);
        let stream_id = stream_id.to_string();
        let mut cancel_token = handle.cancel_token.clone();
        let interval = handle.config.poll_interval;

        let join_handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = cancel_token.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Ok(items) = registry.poll_once(&stream_id).await {
                            for item in items {
                                if sink.send(item).is_err() {
                                    return;
                                }
                            }
                        }
                    }
                }
            }
        });

        // `task` is fetched synchronously once at registration time, so this
        // never contends with an in-flight poll.
        *handle.task.try_lock().expect("task slot only touched by start/stop") = Some(join_handle);
        Ok(())
    }

    /// Signals the ticker to stop, waiting for any in-flight poll to finish
    /// (the spawned task checks the cancel signal only between ticks, so a
    /// poll already underway always runs to completion first).
    pub async fn stop(&self, stream_id: &str) -> Result<(), FeedPollerError> {
        let Some(handle) = self.streams.get(stream_id).map(|e| Arc::clone(e.value())) else {
            return Err(FeedPollerError::UnknownStream(stream_id.to_string()));
        };
        handle.cancel_handle.cancel();
        if let Some(task) = handle.task.lock().await.take() {
            let _ = task.await;
        }
        Ok(())
    }

    pub async fn remove(&self, stream_id: &str) -> Result<(), FeedPollerError> {
        self.stop(stream_id).await?;
        self.streams.remove(stream_id);
        Ok(())
    }

    pub fn stream_ids(&self) -> Vec<String> {
        self.streams.iter().map(|e| e.key().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::FeedType;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CannedFetcher {
        body: Vec<u8>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FeedFetcher for CannedFetcher {
        async fn fetch(&self, _url: &str, _headers: &HashMap<String, String>, _user_agent: &str, _timeout: Duration) -> Result<Vec<u8>, FeedPollerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.body.clone())
        }
    }

    fn rss_body() -> Vec<u8> {
        br#"<rss><channel><item><guid>g1</guid><title>A</title><link>https://x</link><pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate><description>d</description></item></channel></rss>"#.to_vec()
    }

    #[tokio::test]
    async fn poll_once_delivers_new_items_then_dedupes() {
        let fetcher = Arc::new(CannedFetcher { body: rss_body(), calls: AtomicUsize::new(0) });
        let registry = FeedPollerRegistry::new(fetcher);
        registry.register(StreamConfig::builder("s1", "https://example.com/feed", FeedType::Rss).build());

        let first = registry.poll_once("s1").await.unwrap();
        assert_eq!(first.len(), 1);

        let second = registry.poll_once("s1").await.unwrap();
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn unknown_stream_errors() {
        let fetcher = Arc::new(CannedFetcher { body: Vec::new(), calls: AtomicUsize::new(0) });
        let registry = FeedPollerRegistry::new(fetcher);
        assert!(matches!(registry.poll_once("missing").await, Err(FeedPollerError::UnknownStream(_))));
    }

    #[tokio::test]
    async fn start_then_stop_cancels_the_ticker() {
        let fetcher = Arc::new(CannedFetcher { body: rss_body(), calls: AtomicUsize::new(0) });
        let registry = Arc::new(FeedPollerRegistry::new(fetcher));
        registry.register(
            StreamConfig::builder("s1", "https://example.com/feed", FeedType::Rss)
                .poll_interval(Duration::from_millis(10))
                .build(),
        );

        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.start("s1", tx).unwrap();

        let item = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await.unwrap();
        assert!(item.is_some());

        registry.stop("s1").await.unwrap();
    }
}
