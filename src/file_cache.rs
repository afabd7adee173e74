use crate::error::Result;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::{
    path::{Path, PathBuf},
    time::SystemTime,
};

/// Cached document content with modification time
struct CachedDocument {
    content: String,
    modified: SystemTime,
}

/// Global document content cache
///
/// Thread-safe, lock-free reads. Bounded by actual files in the model tree.
/// A robot description tree is typically a few dozen xacro fragments of a
/// few KB each, so the cache stays small.
static DOCUMENT_CACHE: Lazy<DashMap<PathBuf, CachedDocument>> = Lazy::new(DashMap::new);

/// Read a document with caching and modification time validation
pub(crate) fn read_document_cached(path: &Path) -> Result<String> {
    let metadata = std::fs::metadata(path)?;
    let modified = metadata.modified()?;

    // Check cache with modification time validation
    if let Some(entry) = DOCUMENT_CACHE.get(path) {
        if entry.modified == modified {
            log::trace!("Document cache hit: {}", path.display());
            return Ok(entry.content.clone());
        }
    }

    log::debug!("Document cache miss: {}", path.display());

    // Read and cache
    let content = std::fs::read_to_string(path)?;
    DOCUMENT_CACHE.insert(
        path.to_path_buf(),
        CachedDocument {
            content: content.clone(),
            modified,
        },
    );

    Ok(content)
}
