//! Diagnostic counters for ingestion runs.
//!
//! A single [`IngestMetrics`] instance is passed explicitly into the
//! pipeline; there is no process-wide mutable state. Counters only ever
//! increase for the lifetime of the instance.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct IngestMetrics {
    pages_fetched: AtomicU64,
    statuses_fetched: AtomicU64,
    malformed_items: AtomicU64,
    records_inserted: AtomicU64,
    duplicates_skipped: AtomicU64,
    quota_hits: AtomicU64,
}

impl IngestMetrics {
    pub fn record_page(&self, statuses: usize) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
        self.statuses_fetched
            .fetch_add(statuses as u64, Ordering::Relaxed);
    }

    pub fn record_malformed(&self) {
        self.malformed_items.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_inserted(&self) {
        self.records_inserted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duplicate(&self) {
        self.duplicates_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_quota_hit(&self) {
        self.quota_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Consistent-enough copy of the counters for reporting and tests.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            statuses_fetched: self.statuses_fetched.load(Ordering::Relaxed),
            malformed_items: self.malformed_items.load(Ordering::Relaxed),
            records_inserted: self.records_inserted.load(Ordering::Relaxed),
            duplicates_skipped: self.duplicates_skipped.load(Ordering::Relaxed),
            quota_hits: self.quota_hits.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub pages_fetched: u64,
    pub statuses_fetched: u64,
    pub malformed_items: u64,
    pub records_inserted: u64,
    pub duplicates_skipped: u64,
    pub quota_hits: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = IngestMetrics::default();
        metrics.record_page(5);
        metrics.record_page(3);
        metrics.record_malformed();
        metrics.record_inserted();
        metrics.record_inserted();
        metrics.record_duplicate();
        metrics.record_quota_hit();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.pages_fetched, 2);
        assert_eq!(snapshot.statuses_fetched, 8);
        assert_eq!(snapshot.malformed_items, 1);
        assert_eq!(snapshot.records_inserted, 2);
        assert_eq!(snapshot.duplicates_skipped, 1);
        assert_eq!(snapshot.quota_hits, 1);
    }

    #[test]
    fn snapshot_of_fresh_metrics_is_zero() {
        assert_eq!(
            IngestMetrics::default().snapshot(),
            MetricsSnapshot::default()
        );
    }
}
