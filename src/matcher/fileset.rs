//! File set built from a user-supplied file collection

use crate::matcher::strategies::{filename_match, strip_scheme, structural_match};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

/// An immutable mapping from relative POSIX path to an opaque file handle.
///
/// Built once per user action (upload, drag-drop, directory walk) and
/// queried many times while resolving asset references out of a parsed
/// robot description. Keys are normalized to forward slashes with no
/// leading `/` or `./`.
#[derive(Debug, Default)]
pub struct FileSet<H> {
    entries: HashMap<String, H>,
}

impl<H> FileSet<H> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn insert(&mut self, key: impl AsRef<str>, handle: H) {
        self.entries.insert(normalize_key(key.as_ref()), handle);
    }

    pub fn get(&self, key: &str) -> Option<&H> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &H)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Find the best file for a symbolic reference.
    ///
    /// Strategies run in strict priority order and the first hit wins:
    /// exact key, scheme-stripped structural scan, filename-only fallback.
    /// Absence is a normal outcome, never an error.
    pub fn resolve(&self, target: &str) -> Option<&H> {
        if let Some(handle) = self.entries.get(target) {
            log::trace!("Asset matched exactly: {}", target);
            return Some(handle);
        }

        let normalized = strip_scheme(target);

        if let Some(key) = structural_match(normalized, self.keys()) {
            log::trace!("Asset matched structurally: {} -> {}", target, key);
            return self.entries.get(key);
        }

        if let Some(key) = filename_match(normalized, self.keys()) {
            log::debug!("Asset matched by filename only: {} -> {}", target, key);
            return self.entries.get(key);
        }

        log::debug!("No file matches asset reference: {}", target);
        None
    }

    /// The key [`resolve`](Self::resolve) would pick, without the handle.
    pub fn resolve_key(&self, target: &str) -> Option<&str> {
        if let Some((key, _)) = self.entries.get_key_value(target) {
            return Some(key);
        }
        let normalized = strip_scheme(target);
        structural_match(normalized, self.keys())
            .or_else(|| filename_match(normalized, self.keys()))
    }
}

impl<H> FromIterator<(String, H)> for FileSet<H> {
    fn from_iter<I: IntoIterator<Item = (String, H)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (key, handle) in iter {
            set.insert(key, handle);
        }
        set
    }
}

impl FileSet<PathBuf> {
    /// Build a file set by walking a directory tree. Keys are paths
    /// relative to `root`; handles are the absolute paths. Hidden entries
    /// are skipped.
    pub fn from_dir(root: &Path) -> std::io::Result<Self> {
        let mut set = Self::new();
        collect_files(root, Path::new(""), &mut set)?;
        log::debug!("Collected {} files under {}", set.len(), root.display());
        Ok(set)
    }
}

fn collect_files(dir: &Path, relative: &Path, set: &mut FileSet<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name();
        if file_name.to_string_lossy().starts_with('.') {
            continue;
        }

        let path = entry.path();
        let next_relative = relative.join(&file_name);
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            collect_files(&path, &next_relative, set)?;
        } else {
            set.insert(next_relative.to_string_lossy(), path);
        }
    }
    Ok(())
}

fn normalize_key(key: &str) -> String {
    let key = key.replace('\\', "/");
    let key = key.trim_start_matches("./");
    key.trim_start_matches('/').to_string()
}
