//! Request-time path safety and access scoping.
//!
//! Three pure predicates decide whether a request may touch the filesystem,
//! evaluated in order: safety (no escape from the share root), allow-list
//! scope, hidden-file check. Each failing check short-circuits; callers must
//! answer with the same "Forbidden" response for all three so the miss
//! reason is not observable from outside.

use std::fs;
use std::path::{Component, Path, PathBuf};

use percent_encoding::percent_decode_str;

/// Full guard decision for one request path.
pub fn is_request_allowed(request_path: &str, root: &Path, allow: &[PathBuf]) -> bool {
    let decoded = decode(request_path);

    if !is_safe(&decoded, root) {
        return false;
    }
    if !is_allowed(&decoded, allow, root) {
        return false;
    }
    if is_hidden(&decoded) {
        return false;
    }
    true
}

/// Whether the request resolves to a location under `root`.
///
/// The textual path is normalized first (collapsing `.`/`..`); a path that
/// lexically escapes the root is rejected outright. The joined path is then
/// resolved through symlinks, and the resolved target must still sit under
/// the canonicalized root. A target that does not exist yet is non-fatal:
/// the lexical decision stands and existence is the file layer's problem.
pub fn is_safe(request_path: &str, root: &Path) -> bool {
    let rel = match normalize(request_path) {
        Some(rel) => rel,
        // Normalization walked above the root.
        None => return false,
    };

    let joined = root.join(&rel);
    let canonical_root = fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());

    match fs::canonicalize(&joined) {
        Ok(resolved) => resolved.starts_with(&canonical_root),
        // Not-yet-existing targets (404 case) fall back to the lexical
        // check, which already passed.
        Err(_) => true,
    }
}

/// Whether the request falls inside the configured allow-list.
///
/// An empty list means the entire root is visible. The root path itself is
/// always allowed: the listing page reveals nothing beyond names already
/// implied by the allow-list.
pub fn is_allowed(request_path: &str, allow: &[PathBuf], root: &Path) -> bool {
    if allow.is_empty() {
        return true;
    }

    let rel = match normalize(request_path) {
        Some(rel) => rel,
        None => return false,
    };
    if rel.as_os_str().is_empty() {
        return true;
    }

    allow.iter().any(|entry| {
        let absolute = if entry.is_absolute() {
            lexical_clean(entry)
        } else {
            lexical_clean(&root.join(entry))
        };
        match absolute.strip_prefix(root) {
            // Prefix match is component-bounded: "docs" matches
            // "docs/readme.txt" but not "docs-private".
            Ok(entry_rel) => rel.starts_with(entry_rel),
            // Entries outside the root are ignored, not escape hatches.
            Err(_) => false,
        }
    })
}

/// Whether any path segment names a hidden (dot-prefixed) file or directory.
pub fn is_hidden(request_path: &str) -> bool {
    let rel = match normalize(request_path) {
        Some(rel) => rel,
        None => return true,
    };
    rel.components().any(|c| match c {
        Component::Normal(name) => name.to_string_lossy().starts_with('.'),
        _ => false,
    })
}

fn decode(request_path: &str) -> String {
    percent_decode_str(request_path)
        .decode_utf8()
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| request_path.to_string())
}

/// Collapse `.` and `..` in a request path, yielding a relative path.
/// Returns `None` if the path walks above its starting point.
fn normalize(request_path: &str) -> Option<PathBuf> {
    let mut parts: Vec<&str> = Vec::new();
    for segment in request_path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() {
                    return None;
                }
            }
            other => parts.push(other),
        }
    }
    Some(parts.iter().collect())
}

/// Lexically collapse `.`/`..` components of an absolute path.
fn lexical_clean(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other),
        }
    }
    cleaned
}
