//! Namespace-safe path helpers
//!
//! Tree-relative paths are plain `/`-separated strings. Helpers here guarantee
//! that a path produced for the output tree never begins with `/` and never
//! climbs out of the namespace it was joined under.

use smallvec::SmallVec;

/// True when `path` names the tree root
pub fn is_root(path: &str) -> bool {
    matches!(path, "" | "." | "/" | "./")
}

/// Strip every leading `/` (used for configured `src_dir`/`dest_dir`)
pub fn strip_leading_slashes(path: &str) -> &str {
    path.trim_start_matches('/')
}

/// Normalize a relative path
///
/// - Drops empty and `.` segments (repeated, leading and trailing slashes)
/// - Resolves `..` against earlier segments; a `..` at the top is dropped
pub fn normalize(path: &str) -> String {
    let mut segments: SmallVec<[&str; 16]> = SmallVec::new();

    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}

/// Join `relative` under `namespace`
///
/// `relative` is normalized on its own first, so it can never escape the
/// namespace even when it starts with `..` or `/`.
pub fn join(namespace: &str, relative: &str) -> String {
    let namespace = normalize(namespace);
    let relative = normalize(relative);

    match (namespace.is_empty(), relative.is_empty()) {
        (true, _) => relative,
        (false, true) => namespace,
        (false, false) => format!("{}/{}", namespace, relative),
    }
}

/// Parent of a tree-relative path (`""` for top-level entries)
pub fn parent(path: &str) -> &str {
    let path = path.trim_end_matches('/');
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// True when `path` equals `namespace` or lives below it
pub fn is_within(namespace: &str, path: &str) -> bool {
    if is_root(namespace) {
        return true;
    }
    path == namespace
        || (path.starts_with(namespace) && path.as_bytes().get(namespace.len()) == Some(&b'/'))
}
