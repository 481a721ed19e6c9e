//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageStatus`: Fetch outcome of an individual page (pending, fetched, failed)
//! - `CrawlState`: Lifecycle of the crawl as a whole

mod crawl_state;
mod page_state;

// Re-export main types
pub use crawl_state::CrawlState;
pub use page_state::{PageStatus, StatusKind, FETCH_ERROR_SENTINEL};
