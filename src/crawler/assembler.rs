//! Book assembler
//!
//! Turns one fetched detail page into a catalog record, downloading the
//! plain-text book and the cover image along the way unless told to skip them.

use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::{
    extract_comments, extract_genres, extract_image_ref, extract_text_download_link,
    extract_title_author,
};
use crate::output::BookRecord;
use crate::storage::{image_filename, text_filename, OutputLayout};
use crate::url::{basename, book_id, resolve_link};
use crate::{ExtractError, Presence, TululuError};
use scraper::Html;
use std::path::PathBuf;
use url::Url;

/// Everything extracted from a detail page that offers a text download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookPage {
    pub title: String,
    pub author: String,
    /// Numeric id taken from the download link query, prefixes filenames
    pub book_id: String,
    pub download_link: Url,
    pub cover: Option<Cover>,
    pub comments: Vec<String>,
    pub genres: Vec<String>,
}

/// Where the cover lives and what its file is called on the site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cover {
    pub url: Url,
    pub basename: String,
}

impl BookPage {
    /// Extracts a book page from a parsed detail page
    ///
    /// The download link is looked up first: without it the page yields
    /// `Absent` and nothing else is extracted.
    pub fn from_document(
        document: &Html,
        page_url: &Url,
        download_label: &str,
    ) -> Result<Presence<Self>, ExtractError> {
        let href = match extract_text_download_link(document, download_label) {
            Presence::Found(href) => href,
            Presence::Absent => return Ok(Presence::Absent),
        };

        let download_link =
            resolve_link(&href, page_url).ok_or(ExtractError::InvalidLink { link: href })?;
        let book_id = book_id(&download_link).ok_or_else(|| ExtractError::MissingBookId {
            link: download_link.to_string(),
        })?;

        let (title, author) = extract_title_author(document)?;

        let cover = extract_image_ref(document)
            .found()
            .and_then(|src| resolve_link(&src, page_url))
            .and_then(|url| basename(&url).map(|basename| Cover { url, basename }));

        Ok(Presence::Found(Self {
            title,
            author,
            book_id,
            download_link,
            cover,
            comments: extract_comments(document),
            genres: extract_genres(document),
        }))
    }

    /// Sanitized filename of the text artifact
    pub fn text_filename(&self) -> String {
        text_filename(&self.book_id, &self.title)
    }

    /// Sanitized filename of the cover artifact
    pub fn image_filename(&self) -> Option<String> {
        self.cover
            .as_ref()
            .map(|cover| image_filename(&self.book_id, &cover.basename))
    }
}

/// Builds catalog records from detail pages
pub struct Assembler<'a> {
    fetcher: &'a Fetcher,
    layout: &'a OutputLayout,
    download_label: &'a str,
    skip_images: bool,
    skip_text: bool,
}

impl<'a> Assembler<'a> {
    pub fn new(
        fetcher: &'a Fetcher,
        layout: &'a OutputLayout,
        download_label: &'a str,
        skip_images: bool,
        skip_text: bool,
    ) -> Self {
        Self {
            fetcher,
            layout,
            download_label,
            skip_images,
            skip_text,
        }
    }

    /// Assembles the record for one detail page
    ///
    /// # Returns
    ///
    /// * `Ok(Found(record))` - The page offers a text download; artifacts were
    ///   downloaded unless skipped
    /// * `Ok(Absent)` - The page has no text download link; nothing was written
    /// * `Err(TululuError::Extract)` - The page is malformed
    /// * `Err(TululuError::Fetch)` - An artifact download failed transiently
    pub async fn assemble_book(
        &self,
        body: &str,
        page_url: &Url,
    ) -> Result<Presence<BookRecord>, TululuError> {
        let page = {
            let document = Html::parse_document(body);
            BookPage::from_document(&document, page_url, self.download_label)?
        };

        match page {
            Presence::Found(page) => Ok(Presence::Found(self.assemble(page).await?)),
            Presence::Absent => Ok(Presence::Absent),
        }
    }

    /// Downloads the artifacts of an extracted page and builds its record
    pub async fn assemble(&self, page: BookPage) -> Result<BookRecord, TululuError> {
        let book_path = if self.skip_text {
            None
        } else {
            self.download_text(&page).await?
        };

        let img_src = if self.skip_images {
            None
        } else {
            self.download_image(&page).await?
        };

        Ok(BookRecord::new(
            &page.title,
            &page.author,
            img_src,
            book_path,
            page.comments,
            page.genres,
        )?)
    }

    async fn download_text(&self, page: &BookPage) -> Result<Option<PathBuf>, TululuError> {
        let content = match self.fetcher.fetch(&page.download_link).await? {
            Presence::Found(content) => content,
            Presence::Absent => {
                tracing::warn!("Text of '{}' is not available", page.title);
                return Ok(None);
            }
        };

        let filename = page.text_filename();
        match self.layout.save_text(&filename, &content.body).await {
            Ok(path) => Ok(Some(path)),
            Err(e) => {
                tracing::warn!("Cannot write text '{}': {}", filename, e);
                Ok(None)
            }
        }
    }

    async fn download_image(&self, page: &BookPage) -> Result<Option<PathBuf>, TululuError> {
        let (Some(cover), Some(filename)) = (page.cover.as_ref(), page.image_filename()) else {
            tracing::debug!("'{}' has no cover image", page.title);
            return Ok(None);
        };

        let content = match self.fetcher.fetch(&cover.url).await? {
            Presence::Found(content) => content,
            Presence::Absent => {
                tracing::warn!("Cover of '{}' is not available", page.title);
                return Ok(None);
            }
        };

        match self.layout.save_image(&filename, &content.body).await {
            Ok(path) => Ok(Some(path)),
            Err(e) => {
                tracing::warn!("Cannot write cover '{}': {}", filename, e);
                Ok(None)
            }
        }
    }
}
