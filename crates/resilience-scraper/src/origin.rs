//! Origin-scoped rate limiting for scraping jobs, per `spec.md` §4.8 step 3:
//! a minimum delay between requests to the same origin (`protocol+host`)
//! plus a cap on concurrent in-flight requests.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;

struct OriginState {
    delay: Duration,
    semaphore: Arc<Semaphore>,
    last_request: Mutex<Option<Instant>>,
}

/// Holds a concurrency permit for the life of one origin request; drop it
/// once the fetch completes to free the slot for the next waiter.
pub struct OriginPermit {
    _permit: OwnedSemaphorePermit,
}

#[derive(Default)]
pub struct OriginLimiter {
    origins: DashMap<String, Arc<OriginState>>,
}

impl OriginLimiter {
    pub fn new() -> Self {
        Self { origins: DashMap::new() }
    }

    fn state(&self, origin: &str, delay_ms: u64, concurrent: u32) -> Arc<OriginState> {
        Arc::clone(self.origins.entry(origin.to_string()).or_insert_with(|| {
            Arc::new(OriginState {
                delay: Duration::from_millis(delay_ms),
                semaphore: Arc::new(Semaphore::new(concurrent.max(1) as usize)),
                last_request: Mutex::new(None),
            })
        }))
    }

    /// Waits for a concurrency slot, then for the origin's minimum delay to
    /// elapse since the previous request, before recording the new request
    /// time and handing back the held permit.
    pub async fn acquire(&self, origin: &str, delay_ms: u64, concurrent: u32) -> OriginPermit {
        let state = self.state(origin, delay_ms, concurrent);
        let permit = Arc::clone(&state.semaphore).acquire_owned().await.expect("semaphore never closed");

        let mut last = state.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < state.delay {
                tokio::time::sleep(state.delay - elapsed).await;
            }
        }
        *last = Some(Instant::now());
        drop(last);

        OriginPermit { _permit: permit }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn second_acquire_waits_for_the_configured_delay() {
        let limiter = OriginLimiter::new();
        let origin = "https://example.com";

        drop(limiter.acquire(origin, 100, 1).await);

        let started = Instant::now();
        drop(limiter.acquire(origin, 100, 1).await);
        assert!(started.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn concurrency_cap_blocks_until_a_permit_is_released() {
        let limiter = Arc::new(OriginLimiter::new());
        let origin = "https://example.com";

        let held = limiter.acquire(origin, 0, 1).await;

        let waiter = Arc::clone(&limiter);
        let handle = tokio::spawn(async move {
            waiter.acquire(origin, 0, 1).await;
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!handle.is_finished());

        drop(held);
        handle.await.unwrap();
    }
}
