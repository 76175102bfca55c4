//! Mapping from remote statuses to persistable records.
//!
//! The mapping is pure, synchronous, and infallible: a malformed status is
//! logged and counted but still yields a best-effort record, so the
//! transformed count always equals the fetched count.

use chrono::DateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;
use uuid::Uuid;

use crate::metrics::IngestMetrics;
use crate::model::Record;
use crate::timeline::model::ExternalStatus;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Map one external status into a record, assigning a fresh record id.
///
/// Absent fields become empty strings; an absent timestamp archives at the
/// Unix epoch so the fallback stays unmistakable in queries.
pub fn to_record(status: &ExternalStatus, metrics: &IngestMetrics) -> Record {
    let author = status
        .user
        .as_ref()
        .and_then(|user| user.name.clone())
        .unwrap_or_default();

    let malformed = status.created_at.is_none() || status.text.is_none() || author.is_empty();
    if malformed {
        metrics.record_malformed();
        warn!(
            source_id = status.id,
            "status missing fields; archiving best-effort record"
        );
    }

    Record {
        record_id: Uuid::new_v4(),
        source_id: status.id,
        created_at: status.created_at.unwrap_or(DateTime::UNIX_EPOCH),
        text: status
            .text
            .as_deref()
            .map(collapse_whitespace)
            .unwrap_or_default(),
        author,
        language: status.lang.clone().unwrap_or_default(),
    }
}

/// Map a fetched batch one-to-one, preserving order.
pub fn transform_all(statuses: &[ExternalStatus], metrics: &IngestMetrics) -> Vec<Record> {
    statuses
        .iter()
        .map(|status| to_record(status, metrics))
        .collect()
}
