//! urdf_resolver library
//!
//! Core utilities behind a browser-based URDF/Xacro viewer: a recursive
//! include resolver that pre-assembles a xacro document tree into one
//! flattened document, and an asset path matcher that finds a real file
//! for a symbolic mesh/texture reference such as
//! `package://robot/meshes/base.stl`.
//!
//! ```no_run
//! # fn main() -> Result<(), urdf_resolver::ResolveError> {
//! let flat = urdf_resolver::flatten_file("robot.xacro".as_ref(), "packages".as_ref())?;
//! println!("{}", flat.content);
//! # Ok(())
//! # }
//! ```

pub mod error;
mod file_cache;
pub mod include;
pub mod matcher;

pub use error::{ResolveError, Result};
pub use include::{Flattened, IncludeIssue, IncludeResolver};
pub use matcher::FileSet;

use std::path::Path;

/// Flatten a xacro document read from `path`, resolving `$(find PACKAGE)`
/// macros against `root_dir`.
///
/// A missing or unreadable top-level document is a hard error; problems
/// inside the include tree degrade to placeholder comments and are listed
/// in [`Flattened::issues`].
pub fn flatten_file(path: &Path, root_dir: &Path) -> Result<Flattened> {
    IncludeResolver::new(root_dir).resolve_file(path)
}

/// Flatten xacro content already held in memory, resolving relative
/// includes against `working_dir` and macro includes against `root_dir`.
pub fn flatten_string(content: &str, working_dir: &Path, root_dir: &Path) -> Flattened {
    IncludeResolver::new(root_dir).resolve(content, working_dir)
}

/// Check that a flattened document is well-formed XML.
pub fn validate_document(content: &str) -> Result<()> {
    let _ = roxmltree::Document::parse(content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_flatten_file_without_includes_is_identity() {
        let xml = "<robot name=\"r\">\n  <link name=\"base\"/>\n</robot>";
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(xml.as_bytes()).unwrap();
        file.flush().unwrap();

        let flat = flatten_file(file.path(), file.path().parent().unwrap()).unwrap();
        assert_eq!(flat.content, xml);
        assert!(flat.issues.is_empty());
    }

    #[test]
    fn test_flatten_missing_file_is_hard_error() {
        let result = flatten_file("does/not/exist.xacro".as_ref(), ".".as_ref());
        assert!(matches!(result, Err(ResolveError::DocumentNotFound(_))));
    }

    #[test]
    fn test_flatten_string_reports_missing_include() {
        let flat = flatten_string(
            "<robot><xacro:include filename=\"gone.xacro\"/></robot>",
            ".".as_ref(),
            ".".as_ref(),
        );
        assert!(flat.content.contains("gone.xacro"));
        assert_eq!(flat.issues.len(), 1);
    }

    #[test]
    fn test_validate_document() {
        assert!(validate_document("<robot><link/></robot>").is_ok());
        assert!(validate_document("<robot><link></robot>").is_err());
    }
}
