//! Database module: row views and the SQL repository.
//!
//! This module is split into two submodules:
//! - `model`: row views returned by repository queries.
//! - `repo`: SQL-only functions that map rows into views.
//!
//! External modules should import from `timeline_archiver::db` — we
//! re-export the repository API and the row views for convenience.

pub mod model;
pub mod repo;

pub use model::StoredRecord;
pub use repo::*;
