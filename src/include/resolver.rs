//! Recursive include resolver
//!
//! Flattens a xacro document by inlining every
//! `<xacro:include filename="..."/>` directive depth-first. Relative
//! filenames resolve against the including file's own directory; the
//! `$(find PACKAGE)` macro form resolves against the configured root
//! directory at any nesting depth. A directive that cannot be resolved is
//! replaced by a visible placeholder comment instead of being dropped.

use crate::{
    error::{ResolveError, Result},
    file_cache::read_document_cached,
    include::path::{parse_include_path, IncludePath},
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};

static INCLUDE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<xacro:include\s+filename="([^"]*)"\s*/>"#).expect("invalid include regex")
});

/// A soft failure encountered while resolving one directive.
///
/// Issues never abort resolution; the affected directive degrades to a
/// placeholder comment and siblings continue independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IncludeIssue {
    /// No file exists at the resolved target path
    NotFound { filename: String },
    /// The macro target escapes the configured root directory
    OutsideRoot { filename: String },
    /// The target is already being resolved on the current include chain
    Cycle { path: PathBuf },
    /// The target exists but could not be read
    ReadFailed { path: PathBuf, message: String },
}

impl IncludeIssue {
    /// Read failures are the one issue kind callers may want to escalate.
    pub fn is_read_failure(&self) -> bool {
        matches!(self, IncludeIssue::ReadFailed { .. })
    }
}

/// Output of include resolution
#[derive(Debug)]
pub struct Flattened {
    /// The flattened document text
    pub content: String,
    /// Soft failures, in the order their directives were encountered
    pub issues: Vec<IncludeIssue>,
}

/// Depth-first include resolver
pub struct IncludeResolver {
    root_dir: PathBuf,
}

impl IncludeResolver {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Resolve every directive in `content`, using `working_dir` for
    /// relative filenames. The input is never mutated.
    pub fn resolve(&self, content: &str, working_dir: &Path) -> Flattened {
        let mut issues = Vec::new();
        let mut chain = Vec::new();
        let content = self.resolve_inner(content, working_dir, &mut chain, &mut issues);
        Flattened { content, issues }
    }

    /// Resolve a document read from `path`, with that file's directory as
    /// the working directory. A missing or unreadable top-level document is
    /// a hard error; everything below degrades per directive.
    pub fn resolve_file(&self, path: &Path) -> Result<Flattened> {
        if !path.exists() {
            return Err(ResolveError::DocumentNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| {
            ResolveError::DocumentUnreadable {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let working_dir = path.parent().unwrap_or(Path::new("."));
        let mut issues = Vec::new();
        // Seed the chain with the root document so a fragment including its
        // own root is caught as a cycle too.
        let mut chain = vec![canonical_or_self(path)];
        let content = self.resolve_inner(&content, working_dir, &mut chain, &mut issues);
        Ok(Flattened { content, issues })
    }

    fn resolve_inner(
        &self,
        content: &str,
        working_dir: &Path,
        chain: &mut Vec<PathBuf>,
        issues: &mut Vec<IncludeIssue>,
    ) -> String {
        let mut out = String::with_capacity(content.len());
        let mut last = 0;

        for caps in INCLUDE_RE.captures_iter(content) {
            let directive = caps.get(0).expect("regex match has a whole-match group");
            let filename = &caps[1];

            out.push_str(&content[last..directive.start()]);
            out.push_str(&self.resolve_directive(filename, working_dir, chain, issues));
            last = directive.end();
        }

        out.push_str(&content[last..]);
        out
    }

    fn resolve_directive(
        &self,
        filename: &str,
        working_dir: &Path,
        chain: &mut Vec<PathBuf>,
        issues: &mut Vec<IncludeIssue>,
    ) -> String {
        let parsed = parse_include_path(filename);
        let target = parsed.resolve(working_dir, &self.root_dir);

        log::trace!("Processing include: {}", filename);

        // Macro targets are scoped to the root directory; an escape via
        // `..` or symlink is treated like a missing file.
        if matches!(parsed, IncludePath::FindPackage { .. }) && !self.is_within_root(&target) {
            log::warn!(
                "Include target escapes the root directory: {}",
                target.display()
            );
            issues.push(IncludeIssue::OutsideRoot {
                filename: filename.to_string(),
            });
            return placeholder(filename);
        }

        let canonical = canonical_or_self(&target);

        // Check for circular includes in the current include chain
        if chain.contains(&canonical) {
            log::warn!("Circular include detected: {}", canonical.display());
            issues.push(IncludeIssue::Cycle { path: canonical });
            return placeholder(filename);
        }

        if !target.exists() {
            log::warn!("Include target not found: {}", target.display());
            issues.push(IncludeIssue::NotFound {
                filename: filename.to_string(),
            });
            return placeholder(filename);
        }

        log::info!("Including file: {}", target.display());

        let included = match read_document_cached(&target) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Include target not readable: {}: {}", target.display(), e);
                issues.push(IncludeIssue::ReadFailed {
                    path: target.clone(),
                    message: e.to_string(),
                });
                return placeholder(filename);
            }
        };

        let stripped = strip_document_wrapper(&included);
        let child_dir = target.parent().unwrap_or(Path::new("."));

        chain.push(canonical);
        let resolved = self.resolve_inner(stripped, child_dir, chain, issues);
        chain.pop();

        resolved
    }

    fn is_within_root(&self, target: &Path) -> bool {
        let root = canonical_or_self(&self.root_dir);
        let target = canonical_or_self(target);
        target.starts_with(&root)
    }
}

fn canonical_or_self(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn placeholder(filename: &str) -> String {
    format!("<!-- xacro:include could not be resolved: {} -->", filename)
}

/// Strip exactly one top-level wrapper from an included fragment: the XML
/// declaration prolog if present, then the outermost container element's
/// open and close tags if present. The fragment's inner markup is returned
/// untouched.
fn strip_document_wrapper(content: &str) -> &str {
    let mut rest = content.trim_start();

    if rest.starts_with("<?xml") {
        match rest.find("?>") {
            Some(end) => rest = rest[end + 2..].trim_start(),
            None => return content,
        }
    }

    // Only a leading element counts as a wrapper; comments or bare text mean
    // the fragment is already unwrapped.
    if !rest.starts_with('<') || rest.starts_with("<!--") {
        return rest;
    }

    let name_end = rest[1..]
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .map(|i| i + 1);
    let Some(name_end) = name_end else {
        return rest;
    };
    let name = &rest[1..name_end];
    if name.is_empty() {
        return rest;
    }

    let Some(open_end) = rest.find('>') else {
        return rest;
    };

    // Self-closing container wraps nothing
    if rest[..open_end].ends_with('/') {
        return "";
    }

    let close_tag = format!("</{}>", name);
    let Some(close_start) = rest.rfind(&close_tag) else {
        return rest;
    };
    if close_start <= open_end {
        return rest;
    }

    &rest[open_end + 1..close_start]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_identity_without_directives() {
        let dir = tempdir().unwrap();
        let resolver = IncludeResolver::new(dir.path());
        let content = "<robot name=\"r\">\n  <link name=\"base\"/>\n</robot>";

        let flat = resolver.resolve(content, dir.path());
        assert_eq!(flat.content, content);
        assert!(flat.issues.is_empty());
    }

    #[test]
    fn test_single_include_replaced_with_stripped_content() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("arm.xacro"),
            "<?xml version=\"1.0\"?>\n<robot>\n  <link name=\"arm\"/>\n</robot>",
        )
        .unwrap();

        let resolver = IncludeResolver::new(dir.path());
        let content = "<robot name=\"r\">\n<xacro:include filename=\"arm.xacro\"/>\n</robot>";

        let flat = resolver.resolve(content, dir.path());
        assert!(flat.issues.is_empty());
        assert!(flat.content.contains("<link name=\"arm\"/>"));
        assert!(!flat.content.contains("xacro:include"));
        // The included file's own wrapper must not survive
        assert_eq!(flat.content.matches("<robot").count(), 1);
    }

    #[test]
    fn test_missing_include_becomes_placeholder() {
        let dir = tempdir().unwrap();
        let resolver = IncludeResolver::new(dir.path());
        let content = "<robot>\n<xacro:include filename=\"missing.xacro\"/>\n</robot>";

        let flat = resolver.resolve(content, dir.path());
        assert!(flat.content.contains("missing.xacro"));
        assert!(flat.content.contains("<!--"));
        assert_eq!(
            flat.issues,
            vec![IncludeIssue::NotFound {
                filename: "missing.xacro".to_string()
            }]
        );
    }

    #[test]
    fn test_missing_include_does_not_abort_siblings() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("real.xacro"), "<robot><link name=\"l\"/></robot>").unwrap();

        let resolver = IncludeResolver::new(dir.path());
        let content = "<robot>\n\
            <xacro:include filename=\"missing.xacro\"/>\n\
            <xacro:include filename=\"real.xacro\"/>\n\
            </robot>";

        let flat = resolver.resolve(content, dir.path());
        assert!(flat.content.contains("<link name=\"l\"/>"));
        assert!(flat.content.contains("missing.xacro"));
        assert_eq!(flat.issues.len(), 1);
    }

    #[test]
    fn test_find_macro_resolves_against_root_dir() {
        let root = tempdir().unwrap();
        let working = tempdir().unwrap();
        let pkg_dir = root.path().join("my_robot").join("urdf");
        fs::create_dir_all(&pkg_dir).unwrap();
        fs::write(pkg_dir.join("arm.xacro"), "<robot><link name=\"arm\"/></robot>").unwrap();

        let resolver = IncludeResolver::new(root.path());
        let content = "<xacro:include filename=\"$(find my_robot)/urdf/arm.xacro\"/>";

        // working_dir is unrelated; the macro must still resolve
        let flat = resolver.resolve(content, working.path());
        assert!(flat.issues.is_empty());
        assert!(flat.content.contains("<link name=\"arm\"/>"));
    }

    #[test]
    fn test_nested_includes_flatten_fully() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(
            dir.path().join("b.xacro"),
            "<robot><xacro:include filename=\"sub/c.xacro\"/></robot>",
        )
        .unwrap();
        // c.xacro lives in sub/, proving the working dir advances per level
        fs::write(sub.join("c.xacro"), "<robot><link name=\"c\"/></robot>").unwrap();

        let resolver = IncludeResolver::new(dir.path());
        let content = "<robot><xacro:include filename=\"b.xacro\"/></robot>";

        let flat = resolver.resolve(content, dir.path());
        assert!(flat.issues.is_empty());
        assert!(flat.content.contains("<link name=\"c\"/>"));
        assert!(!flat.content.contains("xacro:include"));
    }

    #[test]
    fn test_circular_include_terminates_with_placeholder() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("a.xacro"),
            "<robot><xacro:include filename=\"b.xacro\"/></robot>",
        )
        .unwrap();
        fs::write(
            dir.path().join("b.xacro"),
            "<robot><xacro:include filename=\"a.xacro\"/></robot>",
        )
        .unwrap();

        let resolver = IncludeResolver::new(dir.path());
        let flat = resolver.resolve_file(&dir.path().join("a.xacro")).unwrap();

        assert!(flat.content.contains("could not be resolved"));
        assert_eq!(flat.issues.len(), 1);
        assert!(matches!(flat.issues[0], IncludeIssue::Cycle { .. }));
    }

    #[test]
    fn test_self_include_is_a_cycle() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("a.xacro"),
            "<robot><xacro:include filename=\"a.xacro\"/></robot>",
        )
        .unwrap();

        let resolver = IncludeResolver::new(dir.path());
        let flat = resolver.resolve_file(&dir.path().join("a.xacro")).unwrap();
        assert!(matches!(flat.issues[0], IncludeIssue::Cycle { .. }));
    }

    #[test]
    fn test_macro_escape_beyond_root_is_rejected() {
        let root = tempdir().unwrap();
        let outside = tempdir().unwrap();
        fs::create_dir(root.path().join("pkg")).unwrap();
        let secret = outside.path().join("secret.xacro");
        fs::write(&secret, "<robot/>").unwrap();

        let resolver = IncludeResolver::new(root.path());
        // Climb far past the filesystem root, then descend to a real file
        // outside the configured root
        let content = format!(
            "<xacro:include filename=\"$(find pkg){}{}\"/>",
            "/..".repeat(40),
            secret.display()
        );

        let flat = resolver.resolve(&content, root.path());
        assert_eq!(flat.issues.len(), 1);
        assert!(matches!(flat.issues[0], IncludeIssue::OutsideRoot { .. }));
        assert!(flat.content.contains("could not be resolved"));
    }

    #[test]
    fn test_resolve_file_missing_document_is_hard_error() {
        let dir = tempdir().unwrap();
        let resolver = IncludeResolver::new(dir.path());

        let err = resolver
            .resolve_file(&dir.path().join("nope.xacro"))
            .unwrap_err();
        assert!(matches!(err, ResolveError::DocumentNotFound(_)));
    }

    #[test]
    fn test_strip_prolog_and_container() {
        let content = "<?xml version=\"1.0\"?>\n<robot name=\"x\">\n<link/>\n</robot>";
        assert_eq!(strip_document_wrapper(content), "\n<link/>\n");
    }

    #[test]
    fn test_strip_container_only() {
        assert_eq!(strip_document_wrapper("<robot><link/></robot>"), "<link/>");
    }

    #[test]
    fn test_strip_self_closing_container() {
        assert_eq!(strip_document_wrapper("<robot/>"), "");
    }

    #[test]
    fn test_strip_leaves_unwrapped_fragment_alone() {
        // Leading comment means there is no single wrapper to strip
        let fragment = "<!-- materials -->\n<material name=\"grey\"/>";
        assert_eq!(strip_document_wrapper(fragment), fragment);
    }

    #[test]
    fn test_strip_unclosed_container_left_as_is() {
        let fragment = "<robot><link/>";
        assert_eq!(strip_document_wrapper(fragment), fragment);
    }
}
