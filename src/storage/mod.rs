//! Storage module for downloaded artifacts
//!
//! This module handles the on-disk layout of a mirror:
//! - Creating the books and images directories before any download
//! - Building sanitized filenames for texts and covers
//! - Writing artifact bytes, overwriting whatever was there before

mod filename;

pub use filename::{image_filename, sanitize_filename, text_filename};

use crate::config::OutputConfig;
use crate::TululuError;
use std::path::{Path, PathBuf};

/// The two directories a run writes artifacts into
#[derive(Debug, Clone)]
pub struct OutputLayout {
    books_dir: PathBuf,
    images_dir: PathBuf,
}

impl OutputLayout {
    pub fn new(books_dir: impl Into<PathBuf>, images_dir: impl Into<PathBuf>) -> Self {
        Self {
            books_dir: books_dir.into(),
            images_dir: images_dir.into(),
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(config.books_path(), config.images_path())
    }

    pub fn books_dir(&self) -> &Path {
        &self.books_dir
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// Creates both directories, including missing parents
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Both directories exist
    /// * `Err(TululuError::Setup)` - A directory could not be created
    pub fn prepare(&self) -> Result<(), TululuError> {
        for dir in [&self.books_dir, &self.images_dir] {
            std::fs::create_dir_all(dir).map_err(|source| TululuError::Setup {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Writes a book text under the (already sanitized) filename
    pub async fn save_text(&self, filename: &str, content: &[u8]) -> std::io::Result<PathBuf> {
        write_artifact(&self.books_dir, filename, content).await
    }

    /// Writes a cover image under the (already sanitized) filename
    pub async fn save_image(&self, filename: &str, content: &[u8]) -> std::io::Result<PathBuf> {
        write_artifact(&self.images_dir, filename, content).await
    }
}

async fn write_artifact(dir: &Path, filename: &str, content: &[u8]) -> std::io::Result<PathBuf> {
    let path = dir.join(filename);
    tokio::fs::write(&path, content).await?;
    tracing::debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(path)
}
