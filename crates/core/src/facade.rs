//! Collaborator traits for source and output trees
//!
//! The engine never touches the filesystem directly. It asks a [`SourceTree`]
//! for a projected view that knows how to enumerate changes, and mutates the
//! destination only through an [`OutputTree`].

use crate::change::Change;
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Constraints for projecting a source tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionConfig {
    /// Sub-directory of the source tree the view is rooted at
    pub cwd: String,
    /// Exact relative paths to keep
    pub files: Option<Vec<String>>,
    /// Globs a file (or one of its parents) must match
    pub include: Option<Vec<String>>,
    /// Globs that drop a file or a whole directory
    pub exclude: Option<Vec<String>>,
}

impl ProjectionConfig {
    /// True when the view keeps everything below `cwd`
    pub fn is_unfiltered(&self) -> bool {
        self.files.is_none() && self.include.is_none() && self.exclude.is_none()
    }
}

/// A tree that can be projected into scoped views
pub trait SourceTree {
    type View: SourceView;

    /// Create a view scoped to `config`
    fn project(&self, config: ProjectionConfig) -> Result<Self::View>;
}

/// A scoped, filtered view of a source tree
pub trait SourceView {
    /// Directory backing the view (the source root joined with `cwd`)
    fn root(&self) -> &Path;

    /// Backing path of a view-relative path; link targets point here
    fn disk_path(&self, relative: &str) -> PathBuf {
        let relative = crate::path::normalize(relative);
        if relative.is_empty() {
            self.root().to_path_buf()
        } else {
            self.root().join(relative)
        }
    }

    /// True when `relative` exists in the view
    fn exists(&self, relative: &str) -> bool;

    /// Sorted entry names of a directory in the view
    fn read_dir(&self, relative: &str) -> Result<Vec<String>>;

    /// Replace the file list before the next call to [`SourceView::changes`]
    fn set_files(&mut self, files: Option<Vec<String>>);

    /// Ordered change-list since the previous call
    ///
    /// Removals come children-first, additions parents-first.
    fn changes(&mut self) -> Result<Vec<Change>>;

    /// Forget the previous snapshot; the next change-list reports the
    /// whole view as new
    fn reset(&mut self);
}

/// Destination tree the engine patches
///
/// All paths are tree-relative; `""` is the tree root.
pub trait OutputTree {
    /// True when something (including a broken link) exists at `path`
    fn exists(&self, path: &str) -> bool;

    /// Sorted entry names of a directory
    fn read_dir(&self, path: &str) -> Result<Vec<String>>;

    /// True when `path` is a directory, without following links
    fn is_dir(&self, path: &str) -> bool;

    /// True when the tree root itself is a link into a source tree
    fn is_root_linked(&self) -> bool;

    /// Create a directory and any missing parents
    fn mkdirp(&mut self, path: &str) -> Result<()>;

    /// Create a directory whose parent exists
    fn mkdir(&mut self, path: &str) -> Result<()>;

    /// Remove an empty directory
    fn rmdir(&mut self, path: &str) -> Result<()>;

    /// Remove a file or link; absent targets are a consistency error
    fn unlink(&mut self, path: &str) -> Result<()>;

    /// Link `dest_path` to `source_path` inside `view`
    fn symlink_to_view<V: SourceView + ?Sized>(
        &mut self,
        view: &V,
        source_path: &str,
        dest_path: &str,
    ) -> Result<()>;

    /// Replace a root link with a fresh empty directory
    fn undo_root_symlink(&mut self) -> Result<()>;

    /// Remove everything inside the directory at `path`
    fn empty(&mut self, path: &str) -> Result<()>;
}
