//! Snapshots of a projected source directory

use crate::filter::PathFilter;
use funnel_core::{FunnelError, Result, SourceEntry};
use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// The state of a projected tree at one point in time
///
/// Entries are keyed by `/`-separated relative path and kept sorted, so
/// iteration always visits parents before their children.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    entries: BTreeMap<String, SourceEntry>,
}

impl Snapshot {
    /// Create a new empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan the directory at `root`, keeping what `filter` allows
    ///
    /// A missing root yields an empty snapshot. Symlinks are followed, so a
    /// tree that is itself made of links (for example the output of another
    /// funnel) scans like the tree it points at.
    pub fn scan(root: &Path, filter: &PathFilter) -> Result<Self> {
        let mut snapshot = Self::new();
        if !root.is_dir() {
            return Ok(snapshot);
        }

        let mut files = Vec::new();
        let mut dirs = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(true)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                !e.file_type().is_dir() || !filter.excludes_dir(&relative_path(root, e.path()))
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    // Broken links show up as NotFound once followed
                    if err.io_error().map(io::Error::kind) == Some(io::ErrorKind::NotFound) {
                        debug!("Skipping dangling entry: {}", err);
                        continue;
                    }
                    let path = err.path().unwrap_or(root).to_path_buf();
                    return Err(FunnelError::io(path, err.into()));
                }
            };

            let rel = relative_path(root, entry.path());
            if entry.file_type().is_dir() {
                dirs.push(rel);
                continue;
            }

            if !filter.keeps_file(&rel) {
                continue;
            }

            let metadata = entry
                .metadata()
                .map_err(|err| FunnelError::io(entry.path(), err.into()))?;
            files.push(SourceEntry::file(rel, metadata.len(), metadata.modified().ok()));
        }

        let kept_dirs: BTreeSet<String> = if filter.keeps_all_dirs() {
            dirs.into_iter().collect()
        } else {
            // Only directories that lead to a kept file survive
            let mut parents = BTreeSet::new();
            for file in &files {
                let path = file.relative_path.as_str();
                for (idx, _) in path.match_indices('/') {
                    parents.insert(path[..idx].to_string());
                }
            }
            parents
        };

        for dir in kept_dirs {
            snapshot.insert(SourceEntry::directory(dir));
        }
        for file in files {
            snapshot.insert(file);
        }

        Ok(snapshot)
    }

    /// Insert an entry, replacing any entry at the same path
    pub fn insert(&mut self, entry: SourceEntry) {
        self.entries.insert(entry.relative_path.clone(), entry);
    }

    /// Get an entry by relative path
    pub fn get(&self, path: &str) -> Option<&SourceEntry> {
        self.entries.get(path)
    }

    /// Iterate entries in path order
    pub fn iter(&self) -> btree_map::Values<'_, String, SourceEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `/`-separated path of `path` relative to `root`
fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let rel = rel.to_string_lossy();
    if cfg!(windows) {
        rel.replace('\\', "/")
    } else {
        rel.into_owned()
    }
}
