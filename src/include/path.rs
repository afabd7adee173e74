//! Include path parser
//!
//! The `filename` attribute of an include directive is either a literal
//! path or the package macro form `$(find PACKAGE)REST`. Parsing is total:
//! a value that looks like a macro but cannot be parsed (unmatched
//! parenthesis, unknown macro name) falls back to a literal path, which the
//! resolver then degrades to a placeholder when no such file exists.

use lru::LruCache;
use std::{
    cell::RefCell,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

// Thread-local LRU cache for include path parsing
//
// Caches parsed path forms, NOT resolved filesystem paths. This is safe
// because parsing is context-independent - the same attribute value always
// produces the same form. Resolution against working/root directories
// happens separately per call site.
const PATH_CACHE_SIZE: usize = 256;

thread_local! {
    static PARSE_CACHE: RefCell<LruCache<String, IncludePath>> =
        RefCell::new(LruCache::new(NonZeroUsize::new(PATH_CACHE_SIZE).unwrap()));
}

/// Parsed form of an include directive's `filename` attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncludePath {
    /// A literal relative or absolute path, used verbatim
    Literal(String),
    /// `$(find PACKAGE)REST` - resolved against the configured root directory
    FindPackage { package: String, rest: String },
}

impl IncludePath {
    /// Resolve to a concrete filesystem path.
    ///
    /// Literal relative paths resolve against `working_dir` (the directory
    /// of the including file); the macro form resolves against `root_dir`
    /// regardless of nesting depth.
    pub fn resolve(&self, working_dir: &Path, root_dir: &Path) -> PathBuf {
        match self {
            IncludePath::Literal(value) => {
                let path = Path::new(value);
                if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    working_dir.join(path)
                }
            }
            IncludePath::FindPackage { package, rest } => {
                root_dir.join(package).join(rest.trim_start_matches('/'))
            }
        }
    }
}

/// Parse an include `filename` attribute value.
///
/// Uses a thread-local LRU cache to avoid re-parsing identical values;
/// robot description trees repeat the same handful of include targets.
pub fn parse_include_path(value: &str) -> IncludePath {
    PARSE_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();

        if let Some(cached) = cache.get(value) {
            log::trace!("Include path parse cache hit: {}", value);
            return cached.clone();
        }

        let parsed = parse_value(value);
        cache.put(value.to_string(), parsed.clone());
        parsed
    })
}

fn parse_value(value: &str) -> IncludePath {
    let Some(body) = value.strip_prefix("$(") else {
        return IncludePath::Literal(value.to_string());
    };

    let Some(close) = body.find(')') else {
        log::warn!("Unmatched parenthesis in include path: {}", value);
        return IncludePath::Literal(value.to_string());
    };

    let macro_text = body[..close].trim();
    let rest = &body[close + 1..];

    let mut parts = macro_text.splitn(2, ' ');
    let macro_name = parts.next().unwrap_or("");
    let package = parts.next().unwrap_or("").trim();

    if macro_name != "find" || package.is_empty() {
        log::warn!("Unsupported macro in include path: {}", value);
        return IncludePath::Literal(value.to_string());
    }

    IncludePath::FindPackage {
        package: package.to_string(),
        rest: rest.to_string(),
    }
}
