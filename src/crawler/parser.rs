//! HTML extraction for listing and detail pages
//!
//! Pure functions over a parsed document; nothing here touches the network.
//! The selectors are tied to the tululu.org page layout:
//!
//! | Data | Selector |
//! |------|----------|
//! | Title and author | `h1`, text `Title :: Author` |
//! | Cover image | `.bookimage img` |
//! | Comments | `.texts .black` |
//! | Genres | `span.d_book a` |
//! | Resource links (download) | `.d_book a` |
//! | Listing entries | `.d_book`, first `a[href]` inside |

use crate::{ExtractError, Presence};
use scraper::{ElementRef, Html, Selector};
use url::Url;

const HEADING: &str = "h1";
const COVER_IMAGE: &str = ".bookimage img";
const COMMENTS: &str = ".texts .black";
const GENRES: &str = "span.d_book a";
const RESOURCE_LINKS: &str = ".d_book a";
const BOOK_ENTRY: &str = ".d_book";
const ENTRY_LINK: &str = "a[href]";

/// Separator between title and author in the heading
const TITLE_AUTHOR_SEPARATOR: &str = "::";

fn selector(css: &'static str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|_| ExtractError::InvalidSelector { selector: css })
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn collect_texts(document: &Html, css: &'static str) -> Vec<String> {
    match selector(css) {
        Ok(sel) => document.select(&sel).map(element_text).collect(),
        Err(_) => Vec::new(),
    }
}

/// Splits the page heading into `(title, author)`
///
/// The heading must contain the `::` separator exactly once, and both halves
/// must be non-empty after trimming.
pub fn extract_title_author(document: &Html) -> Result<(String, String), ExtractError> {
    let sel = selector(HEADING)?;
    let heading = document
        .select(&sel)
        .next()
        .map(element_text)
        .ok_or(ExtractError::MissingElement { selector: HEADING })?;

    let mut parts = heading.split(TITLE_AUTHOR_SEPARATOR);
    let (Some(title), Some(author), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ExtractError::MalformedHeading {
            heading: heading.clone(),
        });
    };

    let title = title.trim();
    let author = author.trim();

    if title.is_empty() {
        return Err(ExtractError::EmptyField { field: "title" });
    }
    if author.is_empty() {
        return Err(ExtractError::EmptyField { field: "author" });
    }

    Ok((title.to_string(), author.to_string()))
}

/// Returns the `src` of the cover image as written on the page
pub fn extract_image_ref(document: &Html) -> Presence<String> {
    let Ok(sel) = selector(COVER_IMAGE) else {
        return Presence::Absent;
    };

    document
        .select(&sel)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .map(str::to_string)
        .into()
}

/// Reader comments in page order
pub fn extract_comments(document: &Html) -> Vec<String> {
    collect_texts(document, COMMENTS)
}

/// Genre names in page order
pub fn extract_genres(document: &Html) -> Vec<String> {
    collect_texts(document, GENRES)
}

/// Returns the href of the first resource link labelled exactly `label`
///
/// Whitespace around the link text is ignored; the words must match exactly.
///
/// `Absent` means the page offers no plain-text download, which is how the
/// site marks stub or removed books.
pub fn extract_text_download_link(document: &Html, label: &str) -> Presence<String> {
    let Ok(sel) = selector(RESOURCE_LINKS) else {
        return Presence::Absent;
    };

    document
        .select(&sel)
        .filter(|link| element_text(*link) == label)
        .find_map(|link| link.value().attr("href").map(str::to_string))
        .into()
}

/// Detail page links of every book entry on a listing page, in page order
///
/// Links are resolved against `page_url`; duplicates are kept.
pub fn extract_book_links(document: &Html, page_url: &Url) -> Vec<Url> {
    let (Ok(entry_sel), Ok(link_sel)) = (selector(BOOK_ENTRY), selector(ENTRY_LINK)) else {
        return Vec::new();
    };

    document
        .select(&entry_sel)
        .filter_map(|entry| entry.select(&link_sel).next())
        .filter_map(|link| link.value().attr("href"))
        .filter_map(|href| crate::url::resolve_link(href, page_url))
        .collect()
}
