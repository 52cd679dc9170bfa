//! Output module for the results of a run
//!
//! This module handles:
//! - The book records and the catalog they are collected into
//! - Writing the catalog as JSON
//! - Recording and printing run statistics

mod catalog;
pub mod stats;

pub use catalog::{BookRecord, Catalog};
pub use stats::{print_statistics, CrawlStatistics};
