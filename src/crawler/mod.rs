//! Crawler module for page fetching and graph building
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the [`PageFetcher`] trait
//! - HTML anchor extraction
//! - Frontier selection over the pending pages in the store
//! - The step loop that ties them together

mod engine;
mod fetcher;
mod frontier;
mod parser;

pub use engine::{CrawlEngine, CrawlOutcome, EngineSettings, StartMode, StopReason};
pub use fetcher::{
    build_http_client, media_type, FetchError, FetchResponse, HttpFetcher, PageFetcher,
    HTML_MEDIA_TYPE,
};
pub use frontier::{Frontier, Selection};
pub use parser::{extract_hrefs, AnchorExtractor, HtmlAnchorExtractor};
