//! Storage traits and error types
//!
//! This module defines the trait interface for graph store backends and
//! associated error types.

use crate::state::StatusKind;
use crate::storage::{LinkRecord, PageRecord, PendingPage};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for graph store implementations
///
/// Every method either applies completely or leaves the persisted state
/// untouched. Any error is a store failure and is fatal to the crawl run.
pub trait GraphStore {
    // ===== Page Management =====

    /// Inserts a pending page with default ranks if the URL is new
    ///
    /// # Returns
    ///
    /// The page ID (either newly created or existing)
    fn ensure_page(&mut self, url: &str) -> StorageResult<i64>;

    /// Stores the fetched body of an existing page
    fn record_fetch_success(&mut self, url: &str, content: &[u8]) -> StorageResult<()>;

    /// Stores the error code of an existing page
    fn record_fetch_error(&mut self, url: &str, code: i64) -> StorageResult<()>;

    /// Removes a page together with every link to or from it
    ///
    /// Deleting an unknown URL is a no-op.
    fn delete_page(&mut self, url: &str) -> StorageResult<()>;

    /// Gets a page by ID
    fn get_page(&self, page_id: i64) -> StorageResult<PageRecord>;

    /// Gets a page by URL
    fn get_page_by_url(&self, url: &str) -> StorageResult<Option<PageRecord>>;

    // ===== Link Management =====

    /// Deletes all links leaving a page
    fn clear_outgoing_links(&mut self, from_id: i64) -> StorageResult<()>;

    /// Inserts a link unless the same ordered pair already exists
    ///
    /// # Returns
    ///
    /// `true` if a new edge was stored
    fn add_link(&mut self, from_id: i64, to_id: i64) -> StorageResult<bool>;

    /// Gets all outgoing links from a page
    fn get_outgoing_links(&self, page_id: i64) -> StorageResult<Vec<LinkRecord>>;

    /// Stores the body of a claimed page and all its outgoing edges at once
    ///
    /// Ensures a page for every target URL and links `page_id` to it, in a
    /// single transaction with the content update.
    ///
    /// # Returns
    ///
    /// The number of new edges stored
    fn commit_fetch(&mut self, page_id: i64, content: &[u8], targets: &[String])
        -> StorageResult<usize>;

    // ===== Frontier Management =====

    /// Returns a uniformly random pending page, if any
    fn next_pending_random(&self) -> StorageResult<Option<PendingPage>>;

    /// Returns a random pending page no other worker holds, and claims it
    fn claim_next_pending(&mut self) -> StorageResult<Option<PendingPage>>;

    /// Releases the claim on a page
    fn release_claim(&mut self, page_id: i64) -> StorageResult<()>;

    /// Releases every claim held on this store
    fn release_all_claims(&mut self) -> StorageResult<()>;

    // ===== Scope Management =====

    /// Lists registered scope prefixes in registration order
    fn list_scopes(&self) -> StorageResult<Vec<String>>;

    /// Registers a scope prefix; registering it twice is a no-op
    fn add_scope(&mut self, url: &str) -> StorageResult<()>;

    // ===== Statistics =====

    /// Counts pages with the given status
    fn count_pages(&self, kind: StatusKind) -> StorageResult<u64>;

    /// Gets total page count
    fn count_total_pages(&self) -> StorageResult<u64>;

    /// Counts the total number of links
    fn count_links(&self) -> StorageResult<u64>;
}
