//! Storage module for persisting the crawl graph
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Page creation and fetch outcome persistence
//! - Link (edge) tracking
//! - Frontier selection and worker claims
//! - Scope registration for resumption

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{GraphStore, StorageError, StorageResult};

use crate::state::PageStatus;

/// Rank assigned to every page on creation
pub const DEFAULT_RANK: f64 = 1.0;

/// Represents a page in the database
#[derive(Debug, Clone)]
pub struct PageRecord {
    pub id: i64,
    pub url: String,
    pub status: PageStatus,
    pub old_rank: f64,
    pub new_rank: f64,
}

/// Represents a link relationship between pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkRecord {
    pub from_id: i64,
    pub to_id: i64,
}

/// A pending page handed out by the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPage {
    pub id: i64,
    pub url: String,
}
