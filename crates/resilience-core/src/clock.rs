//! Wall-clock helpers shared by the rate limiter (UTC-aligned windows) and the
//! feed poller (UTC day rollover for daily counters).

use chrono::{DateTime, Datelike, Duration as ChronoDuration, TimeZone, Timelike, Utc};

/// Start of the UTC second containing `now`.
pub fn second_boundary(now: DateTime<Utc>) -> DateTime<Utc> {
    now.with_nanosecond(0).unwrap_or(now)
}

/// Start of the UTC hour containing `now`.
pub fn hour_boundary(now: DateTime<Utc>) -> DateTime<Utc> {
    now.with_minute(0)
        .and_then(|d| d.with_second(0))
        .and_then(|d| d.with_nanosecond(0))
        .unwrap_or(now)
}

/// Start of the UTC day containing `now`.
pub fn day_boundary(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), now.day(), 0, 0, 0)
        .single()
        .unwrap_or(now)
}

/// Whether `now` has rolled over to a new UTC day relative to `previous`.
pub fn crossed_day_boundary(previous: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    day_boundary(previous) != day_boundary(now)
}

/// Duration remaining until the next UTC second/hour/day boundary after `now`.
pub fn remaining_in_second(now: DateTime<Utc>) -> ChronoDuration {
    let next = second_boundary(now) + ChronoDuration::seconds(1);
    next - now
}

pub fn remaining_in_hour(now: DateTime<Utc>) -> ChronoDuration {
    let next = hour_boundary(now) + ChronoDuration::hours(1);
    next - now
}

pub fn remaining_in_day(now: DateTime<Utc>) -> ChronoDuration {
    let next = day_boundary(now) + ChronoDuration::days(1);
    next - now
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_idempotent() {
        let now = Utc.with_ymd_and_hms(2026, 7, 28, 14, 32, 9).unwrap();
        let hb = hour_boundary(now);
        assert_eq!(hour_boundary(hb), hb);
        let db = day_boundary(now);
        assert_eq!(day_boundary(db), db);
    }

    #[test]
    fn day_rollover_detected() {
        let before = Utc.with_ymd_and_hms(2026, 7, 28, 23, 59, 59).unwrap();
        let after = Utc.with_ymd_and_hms(2026, 7, 29, 0, 0, 1).unwrap();
        assert!(crossed_day_boundary(before, after));
        assert!(!crossed_day_boundary(before, before + ChronoDuration::seconds(1)));
    }
}
