//! Frontier selection
//!
//! Pending pages live in the store; the frontier hands them out to workers
//! one claim at a time and keeps count of the pages being worked on, which
//! is what separates "nothing to do right now" from "crawl drained".

use crate::storage::{GraphStore, PendingPage, StorageResult};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Result of asking the frontier for work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A pending page, now claimed by the caller
    Page(PendingPage),

    /// Nothing pending yet, but in-flight pages may still discover more
    Wait,

    /// Nothing pending and nothing in flight
    Drained,
}

/// Hands out pending pages to workers
///
/// Callers must hold exclusive access to the store across `select` and
/// `finish` so the in-flight count and the claims change together.
#[derive(Debug, Default)]
pub struct Frontier {
    in_flight: AtomicUsize,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a random pending page
    pub fn select<S: GraphStore + ?Sized>(&self, store: &mut S) -> StorageResult<Selection> {
        match store.claim_next_pending()? {
            Some(page) => {
                self.in_flight.fetch_add(1, Ordering::SeqCst);
                Ok(Selection::Page(page))
            }
            None if self.in_flight() == 0 => Ok(Selection::Drained),
            None => Ok(Selection::Wait),
        }
    }

    /// Releases the claim on a page whose step has ended
    pub fn finish<S: GraphStore + ?Sized>(&self, store: &mut S, page_id: i64) -> StorageResult<()> {
        // Decrement first so a failed release never leaves the count stuck
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        store.release_claim(page_id)
    }

    /// Forgets all claims, e.g. before a new run
    pub fn reset<S: GraphStore + ?Sized>(&self, store: &mut S) -> StorageResult<()> {
        self.in_flight.store(0, Ordering::SeqCst);
        store.release_all_claims()
    }

    /// Number of claimed pages whose step has not ended
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}
