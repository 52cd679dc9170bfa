//! URL handling for the crawler
//!
//! Builds listing page URLs, resolves links found on pages, and reads the
//! numeric book id out of a download link.

use url::{ParseError, Url};

/// Builds the URL of one numbered listing page of a category
///
/// The category is joined as a directory, so `l55` and `l55/` give the same
/// result: `{base}/l55/{page}`.
///
/// # Examples
///
/// ```
/// use tululu_crawler::url::listing_url;
/// use url::Url;
///
/// let base = Url::parse("https://tululu.org/").unwrap();
/// let url = listing_url(&base, "l55", 4).unwrap();
/// assert_eq!(url.as_str(), "https://tululu.org/l55/4");
/// ```
pub fn listing_url(base: &Url, category: &str, page: u32) -> Result<Url, ParseError> {
    let category = category.trim_start_matches('/');
    let category_url = if category.ends_with('/') {
        base.join(category)?
    } else {
        base.join(&format!("{}/", category))?
    };

    category_url.join(&page.to_string())
}

/// Resolves a link href against the page it was found on
///
/// Returns None for empty hrefs, fragment-only anchors, non-HTTP schemes and
/// anything that fails to parse.
pub fn resolve_link(href: &str, base: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    match base.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute)
        }
        _ => None,
    }
}

/// Returns the value of the last query parameter, which carries the book id
///
/// `https://tululu.org/txt.php?id=7` yields `7`.
pub fn book_id(download_link: &Url) -> Option<String> {
    download_link
        .query_pairs()
        .last()
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Returns the last path segment of a URL, e.g. `239.jpg` for `/shots/239.jpg`
pub fn basename(url: &Url) -> Option<String> {
    url.path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(str::to_string)
}
