//! Include/exclude filtering for projections
//!
//! Supports three constraints, all optional:
//! 1. File list (exact relative paths)
//! 2. Include globs (a file or one of its parent directories must match)
//! 3. Exclude globs (a match drops the file, or the whole directory)
//!
//! Globs use gitignore syntax via `ignore::overrides`.

use ahash::AHashSet;
use funnel_core::path::normalize;
use funnel_core::{FunnelError, Result};
use ignore::overrides::{Override, OverrideBuilder};
use std::path::Path;

/// Filter deciding which entries of a source tree a projection keeps
pub struct PathFilter {
    /// Whitelist globs (None = keep everything)
    include: Option<Override>,

    /// Blacklist globs
    exclude: Option<Override>,

    /// Exact file list (None = no constraint)
    files: Option<AHashSet<String>>,
}

impl PathFilter {
    /// Build a filter for a projection rooted at `root`
    pub fn new(
        root: &Path,
        include: Option<&[String]>,
        exclude: Option<&[String]>,
        files: Option<&[String]>,
    ) -> Result<Self> {
        let include = include
            .map(|patterns| build_override(root, patterns, false))
            .transpose()?;
        let exclude = exclude
            .map(|patterns| build_override(root, patterns, true))
            .transpose()?;

        let mut filter = Self {
            include,
            exclude,
            files: None,
        };
        filter.set_files(files);
        Ok(filter)
    }

    /// Filter that keeps everything
    pub fn unfiltered() -> Self {
        Self {
            include: None,
            exclude: None,
            files: None,
        }
    }

    /// Replace the file list
    pub fn set_files(&mut self, files: Option<&[String]>) {
        self.files = files.map(|files| files.iter().map(|f| normalize(f)).collect());
    }

    /// True when no constraint is configured
    pub fn is_unfiltered(&self) -> bool {
        self.include.is_none() && self.exclude.is_none() && self.files.is_none()
    }

    /// True when directories are kept for their own sake, not only as parents
    /// of kept files
    pub fn keeps_all_dirs(&self) -> bool {
        self.include.is_none() && self.files.is_none()
    }

    /// Check if a file at `path` is part of the projection
    pub fn keeps_file(&self, path: &str) -> bool {
        if let Some(ref files) = self.files {
            if !files.contains(path) {
                return false;
            }
        }

        if let Some(ref include) = self.include {
            let included = ancestors(path).any(|dir| include.matched(dir, true).is_whitelist())
                || include.matched(path, false).is_whitelist();
            if !included {
                return false;
            }
        }

        !self.is_excluded(path, false)
    }

    /// Check if a directory at `path` (and everything below it) is excluded
    pub fn excludes_dir(&self, path: &str) -> bool {
        self.is_excluded(path, true)
    }

    fn is_excluded(&self, path: &str, is_dir: bool) -> bool {
        let Some(ref exclude) = self.exclude else {
            return false;
        };

        if ancestors(path).any(|dir| exclude.matched(dir, true).is_ignore()) {
            return true;
        }

        exclude.matched(path, is_dir).is_ignore()
    }
}

impl Default for PathFilter {
    fn default() -> Self {
        Self::unfiltered()
    }
}

/// Strict ancestors of a relative path, outermost first
fn ancestors(path: &str) -> impl Iterator<Item = &str> {
    path.match_indices('/').map(move |(idx, _)| &path[..idx])
}

/// Compile globs into an override matcher
///
/// Include globs are whitelist entries; exclude globs get a `!` prefix so a
/// match reports `Ignore`.
fn build_override(root: &Path, patterns: &[String], negate: bool) -> Result<Override> {
    let mut builder = OverrideBuilder::new(root);

    for pattern in patterns {
        let glob = if negate {
            format!("!{}", pattern)
        } else {
            pattern.clone()
        };
        builder.add(&glob).map_err(|err| {
            FunnelError::Configuration(format!("invalid glob `{}`: {}", pattern, err))
        })?;
    }

    builder
        .build()
        .map_err(|err| FunnelError::Configuration(format!("invalid glob set: {}", err)))
}
