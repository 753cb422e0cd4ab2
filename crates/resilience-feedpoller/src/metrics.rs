//! Per-stream metrics, per `spec.md` §4.7: running totals, EMA-smoothed
//! latency/duplicate rate, and a composite quality score. Daily counters
//! reset at UTC day rollover.

use chrono::{NaiveDate, Utc};

const LATENCY_ALPHA: f64 = 0.2;
const DUPLICATE_ALPHA: f64 = 0.1;

#[derive(Debug, Clone, Copy)]
pub struct StreamMetrics {
    pub total_items: u64,
    pub items_today: u64,
    pub error_count: u64,
    pub average_latency_ms: f64,
    pub duplicate_rate: f64,
    pub quality_score: f64,
    today: NaiveDate,
    polls: u64,
    successful_polls: u64,
}

impl StreamMetrics {
    pub fn new() -> Self {
        Self {
            total_items: 0,
            items_today: 0,
            error_count: 0,
            average_latency_ms: 0.0,
            duplicate_rate: 0.0,
            quality_score: 1.0,
            today: Utc::now().date_naive(),
            polls: 0,
            successful_polls: 0,
        }
    }

    fn roll_day_if_needed(&mut self) {
        let today = Utc::now().date_naive();
        if today != self.today {
            self.today = today;
            self.items_today = 0;
        }
    }

    /// Records a successful poll: `new_items` delivered, `duplicates` seen,
    /// over `latency_ms`, with a source-supplied `baseline` quality figure.
    pub fn record_success(&mut self, new_items: u64, duplicates: u64, latency_ms: f64, baseline: f64) {
        self.roll_day_if_needed();
        self.polls += 1;
        self.successful_polls += 1;
        self.total_items += new_items;
        self.items_today += new_items;

        self.average_latency_ms = LATENCY_ALPHA * latency_ms + (1.0 - LATENCY_ALPHA) * self.average_latency_ms;

        let attempted = new_items + duplicates;
        let sample_duplicate_rate = if attempted > 0 { duplicates as f64 / attempted as f64 } else { 0.0 };
        self.duplicate_rate = DUPLICATE_ALPHA * sample_duplicate_rate + (1.0 - DUPLICATE_ALPHA) * self.duplicate_rate;

        self.recompute_quality(baseline);
    }

    pub fn record_error(&mut self) {
        self.roll_day_if_needed();
        self.polls += 1;
        self.error_count += 1;
        self.recompute_quality(1.0);
    }

    /// `qualityScore = baseline * successRate * (1 - latency/5000) * (1 - duplicateRate)`,
    /// clamped to `[0,1]`.
    fn recompute_quality(&mut self, baseline: f64) {
        let success_rate = if self.polls > 0 { self.successful_polls as f64 / self.polls as f64 } else { 1.0 };
        let latency_factor = (1.0 - self.average_latency_ms / 5_000.0).max(0.0);
        let quality = baseline * success_rate * latency_factor * (1.0 - self.duplicate_rate);
        self.quality_score = quality.clamp(0.0, 1.0);
    }
}

impl Default for StreamMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_score_starts_perfect() {
        let metrics = StreamMetrics::new();
        assert_eq!(metrics.quality_score, 1.0);
    }

    #[test]
    fn errors_drag_down_quality() {
        let mut metrics = StreamMetrics::new();
        metrics.record_error();
        metrics.record_error();
        assert!(metrics.quality_score < 1.0);
    }

    #[test]
    fn duplicate_rate_is_ema_smoothed() {
        let mut metrics = StreamMetrics::new();
        metrics.record_success(0, 10, 100.0, 1.0);
        assert!((metrics.duplicate_rate - 0.1).abs() < 1e-9);
        metrics.record_success(10, 0, 100.0, 1.0);
        assert!(metrics.duplicate_rate < 0.1);
    }

    #[test]
    fn total_items_accumulate_across_polls() {
        let mut metrics = StreamMetrics::new();
        metrics.record_success(3, 0, 50.0, 1.0);
        metrics.record_success(2, 0, 50.0, 1.0);
        assert_eq!(metrics.total_items, 5);
        assert_eq!(metrics.items_today, 5);
    }
}
