//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the crawler's user agent
//! - GET requests with redirect following disabled
//! - Classifying redirects as "resource absent"
//! - Classifying error statuses and transport failures

use crate::config::{RetryConfig, UserAgentConfig};
use crate::{FetchError, Presence};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// A successfully fetched resource
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// The URL that was requested
    pub url: Url,
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: Vec<u8>,
}

impl FetchedPage {
    /// Body decoded as UTF-8, with invalid sequences replaced
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are never followed: the site answers with a redirect when a book
/// or a listing page does not exist, and the fetcher needs to see that.
///
/// # Example
///
/// ```no_run
/// use tululu_crawler::config::{RetryConfig, UserAgentConfig};
/// use tululu_crawler::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), &RetryConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    retry: &RetryConfig,
) -> Result<Client, reqwest::Error> {
    let user_agent = format!(
        "{}/{}",
        user_agent.crawler_name, user_agent.crawler_version
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(retry.request_timeout())
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::none()) // Redirects mean "absent"
        .gzip(true)
        .brotli(true)
        .build()
}

/// Issues GET requests and classifies the responses
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher around a freshly configured client
    pub fn from_config(
        user_agent: &UserAgentConfig,
        retry: &RetryConfig,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(user_agent, retry)?))
    }

    /// Fetches a URL
    ///
    /// | Response | Result |
    /// |----------|--------|
    /// | 2xx | `Ok(Found(page))` |
    /// | 3xx | `Ok(Absent)` |
    /// | any other status | `Err(FetchError::Status)` |
    /// | timeout, connection error, broken body | `Err(FetchError::Transport)` |
    pub async fn fetch(&self, url: &Url) -> Result<Presence<FetchedPage>, FetchError> {
        tracing::trace!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();

        if status.is_redirection() {
            let location = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("");
            tracing::debug!("{} redirected ({}) to '{}'", url, status.as_u16(), location);
            return Ok(Presence::Absent);
        }

        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        Ok(Presence::Found(FetchedPage {
            url: url.clone(),
            status: status.as_u16(),
            body: body.to_vec(),
        }))
    }
}
