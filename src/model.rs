use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// One archived timeline item. Immutable once persisted; `source_id` is
/// guarded by a UNIQUE index in the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Record {
    pub record_id: Uuid,
    pub source_id: i64,
    pub created_at: DateTime<Utc>,
    pub text: String,
    pub author: String,
    pub language: String,
}

/// Validated invocation surface of one pipeline run.
///
/// Only produced by [`crate::config::Config::ingest_request`], which
/// rejects empty usernames and counts above the configured ceiling before
/// any network or store activity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestRequest {
    pub username: String,
    pub count: u32,
}

/// Result of attempting to write one record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PersistOutcome {
    Inserted,
    Duplicate,
}

/// Pipeline stages, in execution order. The chain never branches back.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Stage {
    Start,
    Fetched,
    Transformed,
    Persisted,
    Done,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Start => "start",
            Stage::Fetched => "fetched",
            Stage::Transformed => "transformed",
            Stage::Persisted => "persisted",
            Stage::Done => "done",
        }
    }
}

/// Totals reported after a pipeline run reaches Done.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub fetched: usize,
    pub transformed: usize,
    pub inserted: u64,
    pub duplicates: u64,
    pub elapsed: Duration,
}
