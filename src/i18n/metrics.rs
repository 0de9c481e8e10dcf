//! Per-context translation counters.
//!
//! Counters are owned by a `TranslationContext` rather than a global, so
//! independent contexts (and tests) never see each other's numbers.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters for translation traffic.
#[derive(Debug, Default)]
pub struct TranslationMetrics {
    cache_hits: AtomicUsize,
    cache_misses: AtomicUsize,
    // Callers that joined an identical in-flight request
    coalesced: AtomicUsize,
    api_calls: AtomicUsize,
    api_failures: AtomicUsize,
    // Translations that resolved to the source text
    fallbacks: AtomicUsize,
    // Results dropped because a newer request superseded them
    stale_discards: AtomicUsize,
}

impl TranslationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_coalesced(&self) {
        self.coalesced.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_api_call(&self) {
        self.api_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_api_failure(&self) {
        self.api_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stale_discard(&self) {
        self.stale_discards.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> usize {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn coalesced(&self) -> usize {
        self.coalesced.load(Ordering::Relaxed)
    }

    pub fn api_calls(&self) -> usize {
        self.api_calls.load(Ordering::Relaxed)
    }

    pub fn api_failures(&self) -> usize {
        self.api_failures.load(Ordering::Relaxed)
    }

    pub fn fallbacks(&self) -> usize {
        self.fallbacks.load(Ordering::Relaxed)
    }

    pub fn stale_discards(&self) -> usize {
        self.stale_discards.load(Ordering::Relaxed)
    }

    /// Snapshot every counter, with derived rates.
    pub fn report(&self) -> MetricsReport {
        let cache_hits = self.cache_hits();
        let cache_misses = self.cache_misses();
        let api_calls = self.api_calls();
        let api_failures = self.api_failures();

        MetricsReport {
            cache_hits,
            cache_misses,
            cache_hit_rate: percentage(cache_hits, cache_hits + cache_misses),
            coalesced: self.coalesced(),
            api_calls,
            api_failures,
            api_success_rate: percentage(api_calls.saturating_sub(api_failures), api_calls),
            fallbacks: self.fallbacks(),
            stale_discards: self.stale_discards(),
        }
    }
}

/// `part` as a percentage of `whole`; 0 when nothing was counted.
fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 * 100.0 / whole as f64
}

/// Point-in-time view of [`TranslationMetrics`], printed by `--metrics`.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub cache_hits: usize,
    pub cache_misses: usize,
    /// 0-100
    pub cache_hit_rate: f64,
    pub coalesced: usize,
    pub api_calls: usize,
    pub api_failures: usize,
    /// 0-100
    pub api_success_rate: f64,
    pub fallbacks: usize,
    pub stale_discards: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let metrics = TranslationMetrics::new();
        assert_eq!(metrics.cache_hits(), 0);
        assert_eq!(metrics.api_calls(), 0);
        assert_eq!(metrics.stale_discards(), 0);
    }

    #[test]
    fn test_each_counter_is_separate() {
        let metrics = TranslationMetrics::new();
        metrics.record_cache_hit();
        metrics.record_cache_hit();
        metrics.record_cache_miss();
        metrics.record_coalesced();
        metrics.record_fallback();
        metrics.record_stale_discard();
        metrics.record_stale_discard();
        metrics.record_stale_discard();

        assert_eq!(metrics.cache_hits(), 2);
        assert_eq!(metrics.cache_misses(), 1);
        assert_eq!(metrics.coalesced(), 1);
        assert_eq!(metrics.fallbacks(), 1);
        assert_eq!(metrics.stale_discards(), 3);
        assert_eq!(metrics.api_failures(), 0);
    }

    #[test]
    fn test_instances_are_independent() {
        let a = TranslationMetrics::new();
        let b = TranslationMetrics::new();
        a.record_api_call();
        assert_eq!(a.api_calls(), 1);
        assert_eq!(b.api_calls(), 0);
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(1, 4), 25.0);
        assert_eq!(percentage(4, 4), 100.0);
    }

    #[test]
    fn test_report_rates() {
        let metrics = TranslationMetrics::new();
        for _ in 0..3 {
            metrics.record_cache_hit();
        }
        metrics.record_cache_miss();
        for _ in 0..2 {
            metrics.record_api_call();
        }
        metrics.record_api_failure();

        let report = metrics.report();
        assert_eq!(report.cache_hit_rate, 75.0);
        assert_eq!(report.api_success_rate, 50.0);
    }

    #[test]
    fn test_report_nothing_recorded() {
        let report = TranslationMetrics::new().report();
        assert_eq!(report.cache_hit_rate, 0.0);
        assert_eq!(report.api_success_rate, 0.0);
    }

    #[test]
    fn test_report_serializes() {
        let metrics = TranslationMetrics::new();
        metrics.record_fallback();

        let json = serde_json::to_value(metrics.report()).expect("serialize");
        assert_eq!(json["fallbacks"], 1);
        assert_eq!(json["cache_hits"], 0);
    }
}
