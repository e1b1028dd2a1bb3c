//! Filesystem store for the raw uploaded files
//!
//! Originals are kept under the data directory as `{document_id}.{ext}` so
//! operators can inspect what was ingested; clear-all removes them together
//! with the vector store.

use std::path::PathBuf;

use crate::error::Result;
use crate::types::Document;

/// Raw-upload store rooted at one directory
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Create a store rooted at `dir`; the directory is created on first
    /// write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, doc: &Document) -> PathBuf {
        self.dir
            .join(format!("{}.{}", doc.id, doc.format.extension()))
    }

    /// Save the raw bytes of an ingested document
    pub async fn save(&self, doc: &Document, data: &[u8]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(doc);
        tokio::fs::write(&path, data).await?;
        Ok(path)
    }

    /// Remove every saved upload. Idempotent; a missing directory counts
    /// as already clear.
    pub async fn clear(&self) -> Result<usize> {
        if !self.dir.is_dir() {
            return Ok(0);
        }

        let mut removed = 0;
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                tokio::fs::remove_file(entry.path()).await?;
                removed += 1;
            }
        }

        Ok(removed)
    }
}
