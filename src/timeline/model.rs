//! Wire models for the remote timeline API.
//!
//! These mirror the remote JSON shapes and are read-only to the rest of
//! the crate: the transformer turns them into [`crate::model::Record`]s
//! and nothing else retains them.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One status object as returned by the timeline endpoint.
///
/// Everything except the source id is optional on the wire; filling
/// defaults is the transformer's job.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ExternalStatus {
    pub id: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub user: Option<StatusAuthor>,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub place: Option<Place>,
}

/// Author slice embedded in a status.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct StatusAuthor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub screen_name: Option<String>,
}

/// Geo/place slice embedded in a status. Carried through deserialization
/// but not persisted.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Place {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// Profile slice returned by the user lookup endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub name: String,
    #[serde(default)]
    pub followers_count: i64,
}

/// Quota diagnostics carried by a 429 response body. Malformed bodies
/// degrade to zeroed fields rather than masking the rate-limit signal.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
pub struct RateLimitStatus {
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub remaining: u32,
    #[serde(default)]
    pub reset_in_seconds: u64,
}
