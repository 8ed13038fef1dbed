//! Metrics for cache facade operations.
//!
//! Recorded through the `metrics` facade; installing an exporter is left to
//! the embedding application.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

/// Metric names for the cache facade.
pub mod names {
    /// Total facade operations by operation and outcome.
    pub const OPERATIONS_TOTAL: &str = "stash_cache_operations_total";
    /// Facade operation duration in seconds.
    pub const OPERATION_DURATION_SECONDS: &str = "stash_cache_operation_duration_seconds";
    /// Keys removed by prefix deletes.
    pub const PREFIX_DELETED_KEYS_TOTAL: &str = "stash_cache_prefix_deleted_keys_total";
}

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(
        names::OPERATIONS_TOTAL,
        "Total number of cache operations by outcome (done, not_found, failed)"
    );
    describe_histogram!(
        names::OPERATION_DURATION_SECONDS,
        "Cache operation duration in seconds, including the store round-trip"
    );
    describe_counter!(
        names::PREFIX_DELETED_KEYS_TOTAL,
        "Total number of keys removed by prefix deletes"
    );
}

/// Cache operation metrics recorder.
#[derive(Clone)]
pub struct CacheMetrics;

impl CacheMetrics {
    /// Record one finished operation.
    pub fn operation(op: &'static str, outcome: &'static str, duration: Duration) {
        counter!(
            names::OPERATIONS_TOTAL,
            "op" => op,
            "outcome" => outcome
        )
        .increment(1);

        histogram!(
            names::OPERATION_DURATION_SECONDS,
            "op" => op
        )
        .record(duration.as_secs_f64());
    }

    /// Record keys removed by a prefix delete.
    pub fn prefix_deleted(count: u64) {
        counter!(names::PREFIX_DELETED_KEYS_TOTAL).increment(count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_metrics() {
        // Just verify registration doesn't panic without a recorder
        register_metrics();
    }

    #[test]
    fn test_cache_metrics() {
        CacheMetrics::operation("set", "done", Duration::from_millis(3));
        CacheMetrics::operation("delete", "not_found", Duration::from_millis(1));
        CacheMetrics::prefix_deleted(4);
    }
}
