//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl driver that coordinates a run:
//! - Preparing the output directories
//! - Walking the listing pages for detail page URLs
//! - Fetching each detail page with linear backoff on transient failures
//! - Assembling records and collecting them into the catalog
//! - Writing the catalog once at the end

use crate::config::Config;
use crate::crawler::assembler::Assembler;
use crate::crawler::backoff::Backoff;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::walker::CatalogWalker;
use crate::output::{print_statistics, BookRecord, Catalog, CrawlStatistics};
use crate::state::UrlState;
use crate::storage::OutputLayout;
use crate::{Presence, TululuError};
use url::Url;

/// What one attempt at a detail page produced
enum Attempt {
    /// The site redirected away from the page
    Absent,
    /// The page was fetched and assembled
    Extracted(Presence<BookRecord>),
}

/// Result of a complete run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub catalog: Catalog,
    pub statistics: CrawlStatistics,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    fetcher: Fetcher,
    layout: OutputLayout,
    base_url: Url,
    stats: CrawlStatistics,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// Builds the HTTP client and creates the output directories. Failing to
    /// create a directory aborts here, before any URL is processed.
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(TululuError)` - Bad base URL, client or directory setup failure
    pub fn new(config: Config) -> Result<Self, TululuError> {
        let base_url = Url::parse(&config.site.base_url)?;

        let fetcher = Fetcher::from_config(&config.user_agent, &config.retry)?;

        let layout = OutputLayout::from_config(&config.output);
        layout.prepare()?;
        tracing::debug!(
            "Output directories ready: {} and {}",
            layout.books_dir().display(),
            layout.images_dir().display()
        );

        Ok(Self {
            config,
            fetcher,
            layout,
            base_url,
            stats: CrawlStatistics::new(),
        })
    }

    pub fn statistics(&self) -> &CrawlStatistics {
        &self.stats
    }

    /// Runs the crawl and returns the collected catalog
    ///
    /// Never aborts on a single URL: every URL ends in a terminal state and
    /// the run moves on.
    pub async fn run(&mut self) -> Result<Catalog, TululuError> {
        let crawl = &self.config.crawl;
        tracing::info!(
            "Walking {} pages {}..{}",
            self.config.site.category,
            crawl.start_page,
            crawl.end_page
        );

        let walk = CatalogWalker::new(&self.fetcher, &self.config.retry)
            .collect_detail_urls(
                &self.base_url,
                &self.config.site.category,
                crawl.start_page,
                crawl.end_page,
            )
            .await?;

        self.stats.listing_pages = walk.pages_walked;
        self.stats.listing_pages_given_up = walk.pages_given_up;
        self.stats.detail_urls = walk.detail_urls.len() as u64;
        tracing::info!("Collected {} book pages", walk.detail_urls.len());

        let mut catalog = Catalog::new();
        for url in &walk.detail_urls {
            if let Some(record) = self.process_url(url).await {
                catalog.push(record);
            }
        }

        self.stats.finish();
        tracing::info!(
            "Crawl completed: {} books saved out of {} pages",
            catalog.len(),
            walk.detail_urls.len()
        );

        Ok(catalog)
    }

    /// Drives one detail page URL to a terminal state
    ///
    /// ```text
    /// Pending -> Fetching -> Extracted | Absent | Failed
    ///               |  ^
    ///               v  |
    ///             Retrying            (delay += step)
    ///               |
    ///               v
    ///             GivenUp             (delay > ceiling)
    /// ```
    pub async fn process_url(&mut self, url: &Url) -> Option<BookRecord> {
        let mut state = UrlState::Pending;
        let mut backoff = Backoff::from_config(&self.config.retry);

        let (terminal, record) = loop {
            state = self.advance(url, state, UrlState::Fetching)?;

            match self.attempt(url).await {
                Ok(Attempt::Absent) => {
                    tracing::info!("{} does not exist, skipping", url);
                    break (UrlState::Absent, None);
                }
                Ok(Attempt::Extracted(Presence::Found(record))) => {
                    tracing::info!("Saved '{}' by {}", record.title, record.author);
                    break (UrlState::Extracted, Some(record));
                }
                Ok(Attempt::Extracted(Presence::Absent)) => {
                    // The heading is never read on pages without a download link
                    tracing::info!("{} has no text download, skipping", url);
                    break (UrlState::Extracted, None);
                }
                Err(TululuError::Fetch(e)) if e.is_transient() => match backoff.next_delay() {
                    Some(delay) => {
                        state = self.advance(url, state, UrlState::Retrying)?;
                        self.stats.retries += 1;
                        tracing::warn!("{}; retry {} in {:?}", e, backoff.retries(), delay);
                        tokio::time::sleep(delay).await;
                    }
                    None => {
                        tracing::error!(
                            "Giving up on {} after {} retries: {}",
                            url,
                            backoff.retries(),
                            e
                        );
                        break (UrlState::GivenUp, None);
                    }
                },
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", url, e);
                    break (UrlState::Failed, None);
                }
            }
        };

        self.advance(url, state, terminal)?;
        self.stats.record_outcome(terminal, record.is_some());

        if let Some(record) = &record {
            if record.book_path.is_some() {
                self.stats.texts_written += 1;
            }
            if record.img_src.is_some() {
                self.stats.images_written += 1;
            }
        }

        record
    }

    /// Moves a URL to its next state, logging illegal transitions
    fn advance(&self, url: &Url, from: UrlState, to: UrlState) -> Option<UrlState> {
        match from.transition(to) {
            Ok(next) => {
                tracing::debug!("{}: {} -> {}", url, from, next);
                Some(next)
            }
            Err(e) => {
                tracing::error!("{}: {}", url, e);
                None
            }
        }
    }

    /// One fetch of the detail page plus assembly
    async fn attempt(&self, url: &Url) -> Result<Attempt, TululuError> {
        let page = match self.fetcher.fetch(url).await? {
            Presence::Found(page) => page,
            Presence::Absent => return Ok(Attempt::Absent),
        };

        let crawl = &self.config.crawl;
        let assembler = Assembler::new(
            &self.fetcher,
            &self.layout,
            &self.config.site.download_label,
            crawl.skip_images,
            crawl.skip_text,
        );

        let record = assembler.assemble_book(&page.text(), &page.url).await?;
        Ok(Attempt::Extracted(record))
    }

    /// Writes the catalog to the configured JSON path
    pub fn write_catalog(&self, catalog: &Catalog) -> Result<(), TululuError> {
        let path = &self.config.output.json_path;
        catalog.write_json(path)?;
        tracing::info!("Wrote {} records to {}", catalog.len(), path.display());
        Ok(())
    }
}

/// Runs a complete crawl: walk, assemble, write the catalog, print statistics
///
/// # Example
///
/// ```no_run
/// use tululu_crawler::config::Config;
/// use tululu_crawler::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_crawl(Config::default()).await?;
/// println!("{} books", report.catalog.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlReport, TululuError> {
    let mut coordinator = Coordinator::new(config)?;
    let catalog = coordinator.run().await?;
    coordinator.write_catalog(&catalog)?;

    let statistics = coordinator.statistics().clone();
    print_statistics(&statistics);

    Ok(CrawlReport {
        catalog,
        statistics,
    })
}
