//! Catalog page walker
//!
//! Walks the numbered listing pages of a category and collects the detail page
//! URL of every book entry. A redirect on a listing page means the category has
//! no more pages and ends the walk.

use crate::config::RetryConfig;
use crate::crawler::backoff::Backoff;
use crate::crawler::fetcher::{FetchedPage, Fetcher};
use crate::crawler::parser::extract_book_links;
use crate::url::listing_url;
use crate::{Presence, TululuError};
use scraper::Html;
use url::Url;

/// What a walk over the listing pages produced
#[derive(Debug, Clone, Default)]
pub struct ListingWalk {
    /// Detail page URLs, page-ascending then in page order; duplicates kept
    pub detail_urls: Vec<Url>,

    /// Listing pages fetched and parsed
    pub pages_walked: u64,

    /// Listing pages skipped after their backoff gave up
    pub pages_given_up: u64,

    /// The page number that signalled the end of the category, if any
    pub end_of_data: Option<u32>,
}

/// Collects detail page URLs from a range of listing pages
pub struct CatalogWalker<'a> {
    fetcher: &'a Fetcher,
    retry: &'a RetryConfig,
}

impl<'a> CatalogWalker<'a> {
    pub fn new(fetcher: &'a Fetcher, retry: &'a RetryConfig) -> Self {
        Self { fetcher, retry }
    }

    /// Walks pages `start_page..end_page` of `category`
    ///
    /// Stops at the first page answered with a redirect; later pages are never
    /// requested. A page whose fetch keeps failing past the backoff ceiling is
    /// skipped and the walk carries on.
    ///
    /// # Returns
    ///
    /// * `Ok(ListingWalk)` - The URLs collected, in listing order
    /// * `Err(TululuError::UrlParse)` - A listing URL could not be built
    pub async fn collect_detail_urls(
        &self,
        base_url: &Url,
        category: &str,
        start_page: u32,
        end_page: u32,
    ) -> Result<ListingWalk, TululuError> {
        let mut walk = ListingWalk::default();

        for page in start_page..end_page {
            let url = listing_url(base_url, category, page)?;

            let fetched = match self.fetch_listing(&url).await {
                Some(fetched) => fetched,
                None => {
                    walk.pages_given_up += 1;
                    continue;
                }
            };

            let page_body = match fetched {
                Presence::Found(page_body) => page_body,
                Presence::Absent => {
                    tracing::info!("Listing page {} does not exist, end of category", page);
                    walk.end_of_data = Some(page);
                    break;
                }
            };

            let links = extract_book_links(&Html::parse_document(&page_body.text()), &url);
            tracing::info!("Listing page {}: {} books", page, links.len());

            walk.pages_walked += 1;
            walk.detail_urls.extend(links);
        }

        Ok(walk)
    }

    /// Fetches one listing page, retrying transient failures
    ///
    /// Returns None when the backoff ceiling is exceeded.
    async fn fetch_listing(&self, url: &Url) -> Option<Presence<FetchedPage>> {
        let mut backoff = Backoff::from_config(self.retry);

        loop {
            match self.fetcher.fetch(url).await {
                Ok(fetched) => return Some(fetched),
                Err(e) => match backoff.next_delay() {
                    Some(delay) => {
                        tracing::warn!("{}; retrying listing page in {:?}", e, delay);
                        tokio::time::sleep(delay).await;
                    }
                    None => {
                        tracing::error!(
                            "Giving up on listing page {} after {} retries: {}",
                            url,
                            backoff.retries(),
                            e
                        );
                        return None;
                    }
                },
            }
        }
    }
}
