use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::io::recovery::atomic_write;

/// Narrow key-value interface the plan document is persisted through.
///
/// A store holds at most one document. It deals in raw text; encoding and
/// validation live in `parse::document`.
pub trait PlanStore {
    /// Stored document text, or `None` if nothing has been saved yet
    fn load(&self) -> io::Result<Option<String>>;
    fn save(&mut self, content: &str) -> io::Result<()>;
    /// Discard the stored document. Clearing an empty store succeeds.
    fn clear(&mut self) -> io::Result<()>;
}

/// Document stored as a single JSON file, replaced atomically on save
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PlanStore for FileStore {
    fn load(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save(&mut self, content: &str) -> io::Result<()> {
        atomic_write(&self.path, content.as_bytes())
    }

    fn clear(&mut self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// In-memory store, for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    content: Option<String>,
    /// Number of successful saves
    pub saves: usize,
}

impl MemoryStore {
    pub fn with_content(content: impl Into<String>) -> Self {
        MemoryStore {
            content: Some(content.into()),
            saves: 0,
        }
    }
}

impl PlanStore for MemoryStore {
    fn load(&self) -> io::Result<Option<String>> {
        Ok(self.content.clone())
    }

    fn save(&mut self, content: &str) -> io::Result<()> {
        self.content = Some(content.to_string());
        self.saves += 1;
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        self.content = None;
        Ok(())
    }
}
