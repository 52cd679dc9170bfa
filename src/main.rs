//! Tululu crawler main entry point
//!
//! This is the command-line interface for mirroring a tululu.org category.

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tululu_crawler::config::{load_config_with_hash, validate, Config};
use tululu_crawler::crawler::crawl;
use tululu_crawler::url::listing_url;

/// Tululu crawler: download books, covers and a JSON catalog
///
/// Walks the listing pages of a tululu.org category, downloads the plain-text
/// book and cover of every entry, and writes a catalog of what was saved.
#[derive(Parser, Debug)]
#[command(name = "tululu-crawler")]
#[command(version)]
#[command(about = "Mirror a tululu.org book category", long_about = None)]
struct Cli {
    /// Optional TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// First listing page to walk (inclusive)
    #[arg(long)]
    start_page: Option<u32>,

    /// Listing page to stop before (exclusive)
    #[arg(long)]
    end_page: Option<u32>,

    /// Do not download cover images
    #[arg(long)]
    skip_imgs: bool,

    /// Do not download book texts
    #[arg(long)]
    skip_txt: bool,

    /// Folder that receives the books and images directories
    #[arg(long, value_name = "DIR")]
    dest_folder: Option<PathBuf>,

    /// Path of the JSON catalog
    #[arg(long, value_name = "FILE")]
    json_path: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show the effective configuration and the listing pages, without crawling
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    /// Applies command-line values on top of the file configuration
    fn apply_to(&self, config: &mut Config) {
        if let Some(start_page) = self.start_page {
            config.crawl.start_page = start_page;
        }
        if let Some(end_page) = self.end_page {
            config.crawl.end_page = end_page;
        }
        if self.skip_imgs {
            config.crawl.skip_images = true;
        }
        if self.skip_txt {
            config.crawl.skip_text = true;
        }
        if let Some(dest_folder) = &self.dest_folder {
            config.output.dest_folder = dest_folder.clone();
        }
        if let Some(json_path) = &self.json_path {
            config.output.json_path = json_path.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => Config::default(),
    };

    cli.apply_to(&mut config);
    if let Err(e) = validate(&config) {
        tracing::error!("Invalid configuration: {}", e);
        return Err(e.into());
    }

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tululu_crawler=info,warn"),
            1 => EnvFilter::new("tululu_crawler=debug,info"),
            2 => EnvFilter::new("tululu_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Tululu Crawler Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Category: {}", config.site.category);
    println!("  Download label: {}", config.site.download_label);

    println!("\nRetry:");
    println!("  Base delay: {}ms", config.retry.base_delay_ms);
    println!("  Step: {}ms", config.retry.step_ms);
    println!("  Ceiling: {}ms", config.retry.ceiling_ms);

    println!("\nOutput:");
    println!("  Books: {}", config.output.books_path().display());
    println!("  Images: {}", config.output.images_path().display());
    println!("  Catalog: {}", config.output.json_path.display());
    println!("  Skip texts: {}", config.crawl.skip_text);
    println!("  Skip images: {}", config.crawl.skip_images);

    let base_url = url::Url::parse(&config.site.base_url)?;
    let pages = config.crawl.start_page..config.crawl.end_page;
    println!("\nListing pages ({}):", pages.len());
    for page in pages.take(5) {
        println!("  - {}", listing_url(&base_url, &config.site.category, page)?);
    }
    if config.crawl.end_page - config.crawl.start_page > 5 {
        println!("  ...");
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Mirroring {}{} into {}",
        config.site.base_url,
        config.site.category,
        config.output.dest_folder.display()
    );

    match crawl(config).await {
        Ok(report) => {
            tracing::info!(
                "Crawl completed successfully: {} books in catalog",
                report.catalog.len()
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
