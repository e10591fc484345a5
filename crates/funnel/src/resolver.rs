//! Destination paths for source entries

use ahash::AHashMap;
use funnel_core::path::{is_within, join, normalize};
use funnel_core::SourceEntry;

/// Rename rule applied to source-relative file paths
pub type DestinationPathFn = Box<dyn Fn(&str) -> String>;

/// Maps source entries to output-relative destination paths
///
/// Results are memoized per source path for the lifetime of the resolver.
/// Files and directories are cached apart, since the rename rule only
/// applies to files and a path may switch kind between builds.
pub struct DestinationPathResolver {
    /// Namespace every destination lives under (normalized)
    namespace: String,

    /// Optional per-file rename rule
    rename: Option<DestinationPathFn>,

    files: AHashMap<String, String>,
    dirs: AHashMap<String, String>,
}

impl DestinationPathResolver {
    pub fn new(namespace: &str, rename: Option<DestinationPathFn>) -> Self {
        Self {
            namespace: normalize(namespace),
            rename,
            files: AHashMap::new(),
            dirs: AHashMap::new(),
        }
    }

    /// Destination of `entry`, relative to the output root
    ///
    /// Never starts with `/` and never leaves the namespace.
    pub fn resolve(&mut self, entry: &SourceEntry) -> String {
        let is_directory = entry.is_directory();
        let cache = if is_directory {
            &self.dirs
        } else {
            &self.files
        };
        if let Some(hit) = cache.get(&entry.relative_path) {
            return hit.clone();
        }

        let resolved = match self.rename {
            Some(ref rename) if !is_directory => {
                join(&self.namespace, &rename(&entry.relative_path))
            }
            _ => join(&self.namespace, &entry.relative_path),
        };
        debug_assert!(is_within(&self.namespace, &resolved));

        let cache = if is_directory {
            &mut self.dirs
        } else {
            &mut self.files
        };
        cache.insert(entry.relative_path.clone(), resolved.clone());
        resolved
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn has_rename(&self) -> bool {
        self.rename.is_some()
    }

    /// Number of memoized paths
    pub fn len(&self) -> usize {
        self.files.len() + self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for DestinationPathResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DestinationPathResolver")
            .field("namespace", &self.namespace)
            .field("rename", &self.rename.is_some())
            .field("cached", &self.len())
            .finish()
    }
}
