//! Deadlines and cancellation, shared by every outbound call the orchestrator,
//! feed poller, and scraper runner make.
//!
//! A [`CancelToken`]/[`CancelHandle`] pair is a thin wrapper over
//! `tokio::sync::watch<bool>`: cheap to clone, and cancellation is a single
//! broadcast rather than a per-listener channel.

use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// The sending half; call `cancel()` to signal every cloned [`CancelToken`].
#[derive(Clone)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// The receiving half, passed down the call tree.
#[derive(Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the token is cancelled. Never resolves on an
    /// uncancelled, still-live handle.
    pub async fn cancelled(&mut self) {
        if self.is_cancelled() {
            return;
        }
        while self.rx.changed().await.is_ok() {
            if *self.rx.borrow() {
                return;
            }
        }
    }
}

/// Creates a fresh, uncancelled handle/token pair.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

/// A point in time after which an operation must abort.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    pub fn after(duration: Duration) -> Self {
        Self {
            at: Instant::now() + duration,
        }
    }

    pub fn at(at: Instant) -> Self {
        Self { at }
    }

    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.at
    }

    /// The earlier of two deadlines, matching the orchestrator's rule of
    /// taking `min(request timeout, source timeout)`.
    pub fn earliest(self, other: Deadline) -> Deadline {
        if self.at <= other.at {
            self
        } else {
            other
        }
    }
}

/// The outcome of racing a future against a deadline and a cancellation
/// token.
#[derive(Debug)]
pub enum RunOutcome<T> {
    Completed(T),
    TimedOut,
    Cancelled,
}

/// Races `fut` against `deadline` and `cancel`. Cancellation and timeout are
/// distinguished so that callers can choose not to count a cancellation as a
/// circuit breaker failure (cancelled calls "never completed their business
/// contract").
pub async fn run_with_deadline<F, T>(
    fut: F,
    deadline: Deadline,
    cancel: &mut CancelToken,
) -> RunOutcome<T>
where
    F: std::future::Future<Output = T>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => RunOutcome::Cancelled,
        _ = tokio::time::sleep_until(deadline.at) => RunOutcome::TimedOut,
        result = fut => RunOutcome::Completed(result),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completes_when_fast_enough() {
        let (_handle, mut token) = cancel_pair();
        let deadline = Deadline::after(Duration::from_millis(200));
        let outcome = run_with_deadline(async { 42 }, deadline, &mut token).await;
        assert!(matches!(outcome, RunOutcome::Completed(42)));
    }

    #[tokio::test]
    async fn times_out_when_slow() {
        let (_handle, mut token) = cancel_pair();
        let deadline = Deadline::after(Duration::from_millis(10));
        let outcome = run_with_deadline(
            async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                42
            },
            deadline,
            &mut token,
        )
        .await;
        assert!(matches!(outcome, RunOutcome::TimedOut));
    }

    #[tokio::test]
    async fn cancellation_wins_over_pending_work() {
        let (handle, mut token) = cancel_pair();
        let deadline = Deadline::after(Duration::from_secs(5));
        handle.cancel();
        let outcome = run_with_deadline(
            async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                42
            },
            deadline,
            &mut token,
        )
        .await;
        assert!(matches!(outcome, RunOutcome::Cancelled));
    }

    #[test]
    fn earliest_deadline_wins() {
        let near = Deadline::after(Duration::from_millis(10));
        let far = Deadline::after(Duration::from_secs(10));
        let earliest = far.earliest(near);
        assert!(earliest.remaining() <= Duration::from_millis(10));
    }
}
