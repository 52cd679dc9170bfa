//! Crawler module: the crawl-and-extract pipeline
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with redirects classified as "absent"
//! - HTML extraction for listing and detail pages
//! - Walking the listing pages of a category
//! - Assembling records and downloading artifacts
//! - Linear backoff and overall crawl coordination

mod assembler;
mod backoff;
mod coordinator;
mod fetcher;
mod parser;
mod walker;

pub use assembler::{Assembler, BookPage, Cover};
pub use backoff::Backoff;
pub use coordinator::{run_crawl, Coordinator, CrawlReport};
pub use fetcher::{build_http_client, FetchedPage, Fetcher};
pub use parser::{
    extract_book_links, extract_comments, extract_genres, extract_image_ref,
    extract_text_download_link, extract_title_author,
};
pub use walker::{CatalogWalker, ListingWalk};

use crate::config::Config;
use crate::TululuError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Create the output directories
/// 2. Walk the listing pages for detail page URLs
/// 3. Fetch, extract and download every book
/// 4. Write the JSON catalog
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The catalog written and the run statistics
/// * `Err(TululuError)` - Setup failed; no URL was processed
pub async fn crawl(config: Config) -> Result<CrawlReport, TululuError> {
    run_crawl(config).await
}
