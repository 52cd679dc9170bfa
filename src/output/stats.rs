//! Run statistics
//!
//! Counters updated by the crawl driver as URLs reach their terminal states,
//! and a console report printed once the catalog has been written.

use crate::state::UrlState;
use chrono::{DateTime, Utc};

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished, set by [`CrawlStatistics::finish`]
    pub finished_at: Option<DateTime<Utc>>,

    /// Listing pages that were fetched and parsed
    pub listing_pages: u64,

    /// Listing pages skipped after their backoff gave up
    pub listing_pages_given_up: u64,

    /// Detail page URLs collected from the listing pages
    pub detail_urls: u64,

    /// Records appended to the catalog
    pub books_saved: u64,

    /// Pages fetched but lacking a text download link
    pub skipped_no_download: u64,

    /// Pages the site redirected away from
    pub absent: u64,

    /// URLs whose backoff grew past the ceiling
    pub given_up: u64,

    /// Pages that did not have the expected structure
    pub extraction_failures: u64,

    /// Retries across all URLs
    pub retries: u64,

    /// Text files written
    pub texts_written: u64,

    /// Cover images written
    pub images_written: u64,
}

impl CrawlStatistics {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            listing_pages: 0,
            listing_pages_given_up: 0,
            detail_urls: 0,
            books_saved: 0,
            skipped_no_download: 0,
            absent: 0,
            given_up: 0,
            extraction_failures: 0,
            retries: 0,
            texts_written: 0,
            images_written: 0,
        }
    }

    /// Counts one URL that reached a terminal state
    pub fn record_outcome(&mut self, state: UrlState, saved: bool) {
        match state {
            UrlState::Extracted if saved => self.books_saved += 1,
            UrlState::Extracted => self.skipped_no_download += 1,
            UrlState::Absent => self.absent += 1,
            UrlState::GivenUp => self.given_up += 1,
            UrlState::Failed => self.extraction_failures += 1,
            UrlState::Pending | UrlState::Fetching | UrlState::Retrying => {}
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Seconds between start and finish, if the run finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// URLs that reached a terminal state
    pub fn processed(&self) -> u64 {
        self.books_saved
            + self.skipped_no_download
            + self.absent
            + self.given_up
            + self.extraction_failures
    }
}

impl Default for CrawlStatistics {
    fn default() -> Self {
        Self::new()
    }
}

/// Prints statistics to stdout in a human-readable format
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Started:  {}", stats.started_at.to_rfc3339());
    if let Some(finished) = stats.finished_at {
        println!("Finished: {}", finished.to_rfc3339());
    }
    if let Some(duration) = stats.duration_seconds() {
        println!("Duration: {} seconds", duration);
    }
    println!();

    println!("Listing pages walked: {}", stats.listing_pages);
    println!("Listing pages failed: {}", stats.listing_pages_given_up);
    println!("Detail pages found:   {}", stats.detail_urls);
    println!("Detail pages done:    {}", stats.processed());
    println!();

    println!("Outcomes:");
    println!("  {:<22} {}", "saved", stats.books_saved);
    println!("  {:<22} {}", "no text download", stats.skipped_no_download);
    println!("  {:<22} {}", "absent (redirect)", stats.absent);
    println!("  {:<22} {}", "given up", stats.given_up);
    println!("  {:<22} {}", "extraction failed", stats.extraction_failures);
    println!();

    println!("Retries:        {}", stats.retries);
    println!("Texts written:  {}", stats.texts_written);
    println!("Images written: {}", stats.images_written);
}
