//! Vitalpipe Crawl - planner and fetch-and-stage worker pool
//!
//! Expands (record type, year) coverage into page-level tasks and crawls
//! them concurrently: fetch a result page, extract its records, publish
//! them atomically to the staging area, then mark the task completed.

pub mod extract;
pub mod fetch;
pub mod planner;
pub mod surnames;
pub mod url;
pub mod worker;

// Re-exports for convenience
pub use extract::{Extractor, VitalSearchExtractor};
pub use fetch::{HttpFetcher, PageFetcher};
pub use planner::{PlanStats, plan};
pub use surnames::SurnameList;
pub use url::{PAGE_SIZE, PROBE_PAGE_SIZE, SearchUrls};
pub use worker::{CrawlStats, crawl};
