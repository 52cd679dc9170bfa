//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `UrlState`: Tracks one detail page URL from pending to its terminal outcome

mod url_state;

pub use url_state::UrlState;
