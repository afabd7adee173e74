//! Match strategies for symbolic asset references
//!
//! Each strategy is a pure function over the normalized target and the set
//! of available keys. [`crate::matcher::FileSet::resolve`] evaluates them
//! in strict priority order; the first hit wins, so the policy stays
//! declarative and each strategy is testable on its own.

/// Remove a leading `package://` or `file://` scheme from a reference,
/// along with any leading slashes left behind, so absolute `file://` URIs
/// can still suffix-match relative keys.
pub fn strip_scheme(target: &str) -> &str {
    let stripped = target
        .strip_prefix("package://")
        .or_else(|| target.strip_prefix("file://"))
        .unwrap_or(target);
    stripped.trim_start_matches('/')
}

/// True when `path` ends with `suffix` as whole path segments, i.e. the
/// character before the suffix is a `/`. Equality does not count.
fn ends_with_segments(path: &str, suffix: &str) -> bool {
    path.len() > suffix.len()
        && path.ends_with(suffix)
        && path[..path.len() - suffix.len()].ends_with('/')
}

/// Scheme-stripped structural scan: accept a key equal to the normalized
/// target, a key living under extra leading segments (a dropped folder
/// root), or a key that is itself a trailing portion of the target.
pub(crate) fn structural_match<'a>(
    normalized: &str,
    keys: impl Iterator<Item = &'a str>,
) -> Option<&'a str> {
    for key in keys {
        if key == normalized
            || ends_with_segments(key, normalized)
            || ends_with_segments(normalized, key)
        {
            return Some(key);
        }
    }
    None
}

/// Filename-only fallback: match on the final path segment alone. This can
/// pick a same-named file from the wrong directory when several candidates
/// exist; that imprecision is an accepted trade-off for arbitrary dropped
/// folder layouts.
pub(crate) fn filename_match<'a>(
    normalized: &str,
    keys: impl Iterator<Item = &'a str>,
) -> Option<&'a str> {
    let filename = normalized.rsplit('/').next().unwrap_or(normalized);
    if filename.is_empty() {
        return None;
    }
    for key in keys {
        if key == filename || ends_with_segments(key, filename) {
            return Some(key);
        }
    }
    None
}
