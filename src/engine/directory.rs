//! Handles from which index readers are opened.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::info;

use crate::engine::memory::MemoryIndex;
use crate::engine::reader::IndexReader;
use crate::engine::snapshot;
use crate::error::Result;

/// A location an index can be opened from.
pub trait Directory: Send + Sync + std::fmt::Debug {
    /// Open a read-only view of the index.
    ///
    /// A missing or corrupt index is `RicochetError::IndexUnavailable`.
    fn open_reader(&self) -> Result<Arc<dyn IndexReader>>;
}

/// An index snapshot on the local file system.
#[derive(Debug, Clone)]
pub struct FsDirectory {
    path: PathBuf,
}

impl FsDirectory {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FsDirectory {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Directory for FsDirectory {
    fn open_reader(&self) -> Result<Arc<dyn IndexReader>> {
        let index = snapshot::read(&self.path)?;
        info!(
            "Opened index at {} ({} documents)",
            self.path.display(),
            index.doc_count()
        );
        Ok(Arc::new(index))
    }
}

/// An index shared in memory; every reader sees the same data.
#[derive(Debug, Clone)]
pub struct RamDirectory {
    index: Arc<MemoryIndex>,
}

impl RamDirectory {
    pub fn new(index: MemoryIndex) -> Self {
        RamDirectory {
            index: Arc::new(index),
        }
    }
}

impl Directory for RamDirectory {
    fn open_reader(&self) -> Result<Arc<dyn IndexReader>> {
        Ok(self.index.clone())
    }
}
