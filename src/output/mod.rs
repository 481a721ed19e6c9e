//! Output module for crawl reporting
//!
//! Statistics are read back from the graph store so they reflect every run
//! that wrote to it, not just the current one.

pub mod stats;

pub use stats::{load_statistics, print_statistics, CrawlStatistics};
