//! Projected views of a source directory

use crate::diff::TreeDiff;
use crate::filter::PathFilter;
use crate::snapshot::Snapshot;
use funnel_core::path::{is_root, normalize};
use funnel_core::{Change, FunnelError, ProjectionConfig, Result, SourceTree, SourceView};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A source tree backed by a directory on disk
#[derive(Debug, Clone)]
pub struct DiskSource {
    /// Directory the tree is rooted at
    root: PathBuf,
}

impl DiskSource {
    /// Create a source tree rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SourceTree for DiskSource {
    type View = Projection;

    fn project(&self, config: ProjectionConfig) -> Result<Projection> {
        let cwd = normalize(&config.cwd);
        let root = if cwd.is_empty() {
            self.root.clone()
        } else {
            self.root.join(&cwd)
        };

        let filter = PathFilter::new(
            &root,
            config.include.as_deref(),
            config.exclude.as_deref(),
            config.files.as_deref(),
        )?;

        Ok(Projection::new(root, filter))
    }
}

/// Scoped, filtered view of a directory that tracks its own change-list
///
/// Every call to [`SourceView::changes`] scans the view, diffs it against the
/// snapshot taken by the previous call and remembers the new snapshot.
pub struct Projection {
    /// Directory the view is rooted at
    root: PathBuf,

    /// What the view keeps
    filter: PathFilter,

    /// Snapshot returned by the previous `changes()` call
    previous: Snapshot,
}

impl Projection {
    /// Create a view of `root` that has not reported any changes yet
    pub fn new(root: PathBuf, filter: PathFilter) -> Self {
        Self {
            root,
            filter,
            previous: Snapshot::new(),
        }
    }

    /// Snapshot as of the last `changes()` call
    pub fn snapshot(&self) -> &Snapshot {
        &self.previous
    }

    pub fn filter(&self) -> &PathFilter {
        &self.filter
    }
}

impl SourceView for Projection {
    fn root(&self) -> &Path {
        &self.root
    }

    fn exists(&self, relative: &str) -> bool {
        if is_root(relative) {
            return self.root.is_dir();
        }

        let relative = normalize(relative);
        let path = self.root.join(&relative);
        if path.is_dir() {
            !self.filter.excludes_dir(&relative)
        } else {
            path.exists() && self.filter.keeps_file(&relative)
        }
    }

    fn read_dir(&self, relative: &str) -> Result<Vec<String>> {
        let relative = normalize(relative);
        let dir = self.disk_path(&relative);
        let listing = fs::read_dir(&dir).map_err(|err| FunnelError::io(&dir, err))?;

        let mut names = Vec::new();
        for entry in listing {
            let entry = entry.map_err(|err| FunnelError::io(&dir, err))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let child = if relative.is_empty() {
                name.clone()
            } else {
                format!("{}/{}", relative, name)
            };

            let keep = if entry.path().is_dir() {
                !self.filter.excludes_dir(&child)
            } else {
                self.filter.keeps_file(&child)
            };
            if keep {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }

    fn set_files(&mut self, files: Option<Vec<String>>) {
        self.filter.set_files(files.as_deref());
    }

    fn reset(&mut self) {
        self.previous = Snapshot::new();
    }

    fn changes(&mut self) -> Result<Vec<Change>> {
        let current = Snapshot::scan(&self.root, &self.filter)?;
        let diff = TreeDiff::diff(&self.previous, &current);
        self.previous = current;

        let changes = diff.into_changes();
        debug!(
            root = %self.root.display(),
            changes = changes.len(),
            "computed change-list"
        );
        Ok(changes)
    }
}
