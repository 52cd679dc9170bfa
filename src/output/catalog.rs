//! Book records and the catalog they are collected into
//!
//! The catalog is an ordered list of records held in memory for the whole run
//! and written out once, as a JSON array, when the run ends.

use crate::ExtractError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// One entry of the output catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: String,
    pub author: String,
    /// Local path of the downloaded cover, absent when the download was skipped
    pub img_src: Option<PathBuf>,
    /// Local path of the downloaded text, absent when the download was skipped
    pub book_path: Option<PathBuf>,
    pub comments: Vec<String>,
    pub genres: Vec<String>,
}

impl BookRecord {
    /// Builds a record, trimming title and author and rejecting empty ones
    pub fn new(
        title: &str,
        author: &str,
        img_src: Option<PathBuf>,
        book_path: Option<PathBuf>,
        comments: Vec<String>,
        genres: Vec<String>,
    ) -> Result<Self, ExtractError> {
        let title = title.trim();
        let author = author.trim();

        if title.is_empty() {
            return Err(ExtractError::EmptyField { field: "title" });
        }
        if author.is_empty() {
            return Err(ExtractError::EmptyField { field: "author" });
        }

        Ok(Self {
            title: title.to_string(),
            author: author.to_string(),
            img_src,
            book_path,
            comments,
            genres,
        })
    }
}

/// Append-only, ordered collection of book records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    records: Vec<BookRecord>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: BookRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[BookRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BookRecord> {
        self.records.iter()
    }

    /// Writes the catalog as a UTF-8 JSON array; non-ASCII text is not escaped
    pub fn write_json(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;

        Ok(())
    }

    /// Reads a catalog previously written with [`Catalog::write_json`]
    pub fn read_json(path: &Path) -> crate::Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a BookRecord;
    type IntoIter = std::slice::Iter<'a, BookRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
