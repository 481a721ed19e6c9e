//! Statistics generation from crawl database
//!
//! This module provides functionality for extracting and displaying
//! crawl statistics from the storage layer.

use crate::state::StatusKind;
use crate::storage::{GraphStore, StorageResult};
use std::collections::HashMap;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Total number of pages in the store
    pub total_pages: u64,

    /// Count of pages by status
    pub pages_by_status: HashMap<StatusKind, u64>,

    /// Total number of stored links
    pub total_links: u64,

    /// Registered scope prefixes
    pub scopes: Vec<String>,
}

impl CrawlStatistics {
    pub fn count(&self, kind: StatusKind) -> u64 {
        self.pages_by_status.get(&kind).copied().unwrap_or(0)
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `store` - The graph store to query
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics<S: GraphStore + ?Sized>(store: &S) -> StorageResult<CrawlStatistics> {
    let mut pages_by_status = HashMap::new();
    for kind in StatusKind::all() {
        pages_by_status.insert(kind, store.count_pages(kind)?);
    }

    Ok(CrawlStatistics {
        total_pages: store.count_total_pages()?,
        pages_by_status,
        total_links: store.count_links()?,
        scopes: store.list_scopes()?,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Total pages: {}", stats.total_pages);
    println!("  Total links: {}", stats.total_links);
    println!();

    println!("Pages by Status:");
    for kind in StatusKind::all() {
        let count = stats.count(kind);
        let percentage = if stats.total_pages > 0 {
            (count as f64 / stats.total_pages as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", kind, count, percentage);
    }
    println!();

    println!("Websites ({}):", stats.scopes.len());
    for web in &stats.scopes {
        println!("  - {}", web);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStorage;

    #[test]
    fn test_empty_store() {
        let store = SqliteStorage::new_in_memory().unwrap();
        let stats = load_statistics(&store).unwrap();

        assert_eq!(stats.total_pages, 0);
        assert_eq!(stats.total_links, 0);
        assert!(stats.scopes.is_empty());
        for kind in StatusKind::all() {
            assert_eq!(stats.count(kind), 0);
        }
    }

    #[test]
    fn test_counts_by_status() {
        let mut store = SqliteStorage::new_in_memory().unwrap();
        store.add_scope("https://example.com").unwrap();
        let home = store.ensure_page("https://example.com").unwrap();
        let a = store.ensure_page("https://example.com/a").unwrap();
        store.ensure_page("https://example.com/b").unwrap();
        store.add_link(home, a).unwrap();
        store.record_fetch_success("https://example.com", b"<html>").unwrap();
        store.record_fetch_error("https://example.com/b", 404).unwrap();

        let stats = load_statistics(&store).unwrap();

        assert_eq!(stats.total_pages, 3);
        assert_eq!(stats.total_links, 1);
        assert_eq!(stats.count(StatusKind::Pending), 1);
        assert_eq!(stats.count(StatusKind::Fetched), 1);
        assert_eq!(stats.count(StatusKind::Failed), 1);
        assert_eq!(stats.scopes, vec!["https://example.com".to_string()]);
    }
}
