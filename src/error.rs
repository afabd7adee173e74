//! Error types for urdf_resolver

use std::path::PathBuf;
use thiserror::Error;

/// Hard failures of a top-level resolution request.
///
/// Per-directive problems inside a document (missing include, cycle, path
/// escaping the root) never surface here; they degrade to placeholder
/// comments and are reported as [`crate::include::IncludeIssue`] values.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("document not found: {}", .0.display())]
    DocumentNotFound(PathBuf),

    #[error("document {} is not readable: {source}", .path.display())]
    DocumentUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("flattened document is not well-formed XML: {0}")]
    MalformedDocument(#[from] roxmltree::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ResolveError>;
