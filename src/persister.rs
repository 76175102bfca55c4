//! Deduplicating record persistence.

use anyhow::Result;
use tracing::{info, warn};

use crate::db::{self, Pool};
use crate::metrics::IngestMetrics;
use crate::model::{PersistOutcome, Record};

/// Totals for one persist stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistSummary {
    pub attempted: usize,
    pub inserted: u64,
    pub duplicates: u64,
}

/// Write records one at a time, in fetch order.
///
/// A duplicate source id is reported and skipped, not retried and not
/// overwritten. Any other store error ends the run immediately.
pub async fn persist_records(
    pool: &Pool,
    records: &[Record],
    metrics: &IngestMetrics,
) -> Result<PersistSummary> {
    let total = records.len();
    let mut summary = PersistSummary::default();

    for (idx, record) in records.iter().enumerate() {
        summary.attempted += 1;
        match db::insert_record(pool, record).await? {
            PersistOutcome::Inserted => {
                summary.inserted += 1;
                metrics.record_inserted();
                info!(
                    committed = idx + 1,
                    total,
                    record_id = %record.record_id,
                    "committed record"
                );
            }
            PersistOutcome::Duplicate => {
                summary.duplicates += 1;
                metrics.record_duplicate();
                warn!(
                    source_id = record.source_id,
                    "duplicate source id; record skipped"
                );
            }
        }
    }

    Ok(summary)
}
