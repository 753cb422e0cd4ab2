use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::time::Duration;

use resilience_core::clock;

/// A single fixed window (second/hour/day) counter, aligned to UTC
/// boundaries rather than to the time of first use: the window for "now" is
/// always `[boundary(now), boundary(now) + period)`, computed fresh on every
/// check so counters don't drift across process restarts.
#[derive(Debug, Clone, Copy)]
pub(crate) enum WindowKind {
    Second,
    Hour,
    Day,
}

impl WindowKind {
    fn boundary(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            WindowKind::Second => clock::second_boundary(now),
            WindowKind::Hour => clock::hour_boundary(now),
            WindowKind::Day => clock::day_boundary(now),
        }
    }

    fn remaining(self, now: DateTime<Utc>) -> ChronoDuration {
        match self {
            WindowKind::Second => clock::remaining_in_second(now),
            WindowKind::Hour => clock::remaining_in_hour(now),
            WindowKind::Day => clock::remaining_in_day(now),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct WindowCounter {
    kind: WindowKind,
    limit: u32,
    current_boundary: DateTime<Utc>,
    count: u32,
}

impl WindowCounter {
    fn new(kind: WindowKind, limit: u32, now: DateTime<Utc>) -> Self {
        Self {
            kind,
            limit,
            current_boundary: kind.boundary(now),
            count: 0,
        }
    }

    /// Rolls the counter forward if `now` has moved into a new window.
    fn refresh(&mut self, now: DateTime<Utc>) {
        let boundary = self.kind.boundary(now);
        if boundary != self.current_boundary {
            self.current_boundary = boundary;
            self.count = 0;
        }
    }

    fn remaining_permits(&mut self, now: DateTime<Utc>) -> u32 {
        self.refresh(now);
        self.limit.saturating_sub(self.count)
    }

    fn would_exceed(&mut self, now: DateTime<Utc>) -> bool {
        self.remaining_permits(now) == 0
    }

    fn consume(&mut self) {
        self.count += 1;
    }

    fn reset_duration(&self, now: DateTime<Utc>) -> Duration {
        self.kind
            .remaining(now)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

/// The three rolling windows for one source. `None` means that window is
/// unbounded and never blocks acquisition.
pub(crate) struct SourceWindows {
    second: Option<WindowCounter>,
    hour: Option<WindowCounter>,
    day: Option<WindowCounter>,
}

impl SourceWindows {
    pub(crate) fn new(config: crate::config::RateLimitConfig, now: DateTime<Utc>) -> Self {
        Self {
            second: config
                .per_second()
                .map(|n| WindowCounter::new(WindowKind::Second, n, now)),
            hour: config
                .per_hour()
                .map(|n| WindowCounter::new(WindowKind::Hour, n, now)),
            day: config
                .per_day()
                .map(|n| WindowCounter::new(WindowKind::Day, n, now)),
        }
    }

    /// Atomically checks all three windows; if any would be exceeded, none
    /// are consumed and the earliest of the saturated windows' reset times
    /// is returned.
    pub(crate) fn try_acquire(&mut self, now: DateTime<Utc>) -> Result<(), Duration> {
        let mut saturated: Vec<Duration> = Vec::new();

        for window in [self.second.as_mut(), self.hour.as_mut(), self.day.as_mut()]
            .into_iter()
            .flatten()
        {
            if window.would_exceed(now) {
                saturated.push(window.reset_duration(now));
            }
        }

        if let Some(earliest) = saturated.into_iter().min() {
            return Err(earliest);
        }

        for window in [self.second.as_mut(), self.hour.as_mut(), self.day.as_mut()]
            .into_iter()
            .flatten()
        {
            window.consume();
        }

        Ok(())
    }

    pub(crate) fn remaining(&mut self, now: DateTime<Utc>) -> RemainingPermits {
        RemainingPermits {
            per_second: self.second.as_mut().map(|w| w.remaining_permits(now)),
            per_hour: self.hour.as_mut().map(|w| w.remaining_permits(now)),
            per_day: self.day.as_mut().map(|w| w.remaining_permits(now)),
        }
    }
}

/// Snapshot of remaining permits per window, `None` meaning unbounded.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemainingPermits {
    pub per_second: Option<u32>,
    pub per_hour: Option<u32>,
    pub per_day: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn second_window_blocks_after_limit() {
        let config = crate::config::RateLimitConfig::builder().per_second(2).build();
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut windows = SourceWindows::new(config, now);

        assert!(windows.try_acquire(now).is_ok());
        assert!(windows.try_acquire(now).is_ok());
        assert!(windows.try_acquire(now).is_err());
    }

    #[test]
    fn window_resets_on_boundary_crossing() {
        let config = crate::config::RateLimitConfig::builder().per_second(1).build();
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut windows = SourceWindows::new(config, now);

        assert!(windows.try_acquire(now).is_ok());
        assert!(windows.try_acquire(now).is_err());

        let next_second = now + ChronoDuration::seconds(1);
        assert!(windows.try_acquire(next_second).is_ok());
    }

    #[test]
    fn acquisition_is_atomic_across_windows() {
        let config = crate::config::RateLimitConfig::builder()
            .per_second(100)
            .per_hour(1)
            .build();
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut windows = SourceWindows::new(config, now);

        assert!(windows.try_acquire(now).is_ok());
        // The hourly window is now saturated; a second attempt must consume
        // nothing from the (still open) second window either.
        assert!(windows.try_acquire(now).is_err());
        let remaining = windows.remaining(now);
        assert_eq!(remaining.per_second, Some(99));
    }
}
