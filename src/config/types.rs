use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for the crawler
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub retry: RetryConfig,
    pub output: OutputConfig,
    pub crawl: CrawlConfig,
}

/// Where the library lives and which category to mirror
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Root of the site, e.g. `https://tululu.org/`
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Category path relative to the base URL, e.g. `l55/`
    pub category: String,

    /// Exact label of the plain-text download link on a detail page
    #[serde(rename = "download-label")]
    pub download_label: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://tululu.org/".to_string(),
            category: "l55/".to_string(),
            download_label: "скачать txt".to_string(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "tululu-crawler".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Linear backoff applied to transient fetch failures
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Delay the backoff starts from (milliseconds)
    #[serde(rename = "base-delay-ms")]
    pub base_delay_ms: u64,

    /// Amount added to the delay after every failure (milliseconds)
    #[serde(rename = "step-ms")]
    pub step_ms: u64,

    /// Once the delay grows past this, the URL is given up (milliseconds)
    #[serde(rename = "ceiling-ms")]
    pub ceiling_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn step(&self) -> Duration {
        Duration::from_millis(self.step_ms)
    }

    pub fn ceiling(&self) -> Duration {
        Duration::from_millis(self.ceiling_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 1_000,
            step_ms: 5_000,
            ceiling_ms: 30_000,
            request_timeout_secs: 30,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root folder that holds the books and images directories
    #[serde(rename = "dest-folder")]
    pub dest_folder: PathBuf,

    /// Directory name for downloaded texts, relative to `dest_folder`
    #[serde(rename = "books-dir")]
    pub books_dir: String,

    /// Directory name for downloaded covers, relative to `dest_folder`
    #[serde(rename = "images-dir")]
    pub images_dir: String,

    /// Path of the JSON catalog
    #[serde(rename = "json-path")]
    pub json_path: PathBuf,
}

impl OutputConfig {
    pub fn books_path(&self) -> PathBuf {
        self.dest_folder.join(&self.books_dir)
    }

    pub fn images_path(&self) -> PathBuf {
        self.dest_folder.join(&self.images_dir)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dest_folder: PathBuf::from("."),
            books_dir: "books".to_string(),
            images_dir: "images".to_string(),
            json_path: PathBuf::from("books.json"),
        }
    }
}

/// Which listing pages to walk and which artifacts to download
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// First listing page (inclusive)
    #[serde(rename = "start-page")]
    pub start_page: u32,

    /// Last listing page (exclusive)
    #[serde(rename = "end-page")]
    pub end_page: u32,

    /// Do not download cover images
    #[serde(rename = "skip-images")]
    pub skip_images: bool,

    /// Do not download book texts
    #[serde(rename = "skip-text")]
    pub skip_text: bool,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            start_page: 1,
            end_page: 1000,
            skip_images: false,
            skip_text: false,
        }
    }
}
