//! Row views returned by the record repository.
//!
//! Keep these structs focused on the data returned by queries. Business
//! logic lives in higher layers.

use chrono::{DateTime, Utc};

/// One archived record as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub record_id: String,
    pub source_id: i64,
    pub created_at: DateTime<Utc>,
    pub text: String,
    pub author: String,
    pub language: String,
}
