//! Funnel options

use crate::resolver::DestinationPathFn;
use funnel_core::path::strip_leading_slashes;
use funnel_core::{FunnelError, Result};
use std::fmt;
use tracing::warn;

/// Callback producing the file list before every build
pub type DynamicFiles = Box<dyn FnMut() -> Vec<String>>;

/// Exact list of files to project
pub enum FileList {
    /// Fixed for the lifetime of the funnel
    Static(Vec<String>),
    /// Asked for again before every build
    Dynamic(DynamicFiles),
}

impl fmt::Debug for FileList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileList::Static(files) => f.debug_tuple("Static").field(files).finish(),
            FileList::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Options for a [`Funnel`](crate::Funnel)
#[derive(Default)]
pub struct FunnelOptions {
    /// Source sub-directory to project (`""` = the whole source)
    pub src_dir: String,
    /// Namespace in the output the projection lands under (`""` = the output root)
    pub dest_dir: String,
    pub include: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub files: Option<FileList>,
    /// Rename rule applied to every file's source-relative path
    pub get_destination_path: Option<DestinationPathFn>,
    /// Treat a missing `src_dir` as an empty tree instead of an error
    pub allow_empty: bool,
    /// Name used in logs
    pub annotation: Option<String>,
}

impl FunnelOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn src_dir(mut self, src_dir: impl Into<String>) -> Self {
        self.src_dir = src_dir.into();
        self
    }

    pub fn dest_dir(mut self, dest_dir: impl Into<String>) -> Self {
        self.dest_dir = dest_dir.into();
        self
    }

    pub fn include<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = Some(patterns.into_iter().map(Into::into).collect());
        self
    }

    pub fn exclude<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = Some(patterns.into_iter().map(Into::into).collect());
        self
    }

    pub fn files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files = Some(FileList::Static(files.into_iter().map(Into::into).collect()));
        self
    }

    pub fn dynamic_files(mut self, files: impl FnMut() -> Vec<String> + 'static) -> Self {
        self.files = Some(FileList::Dynamic(Box::new(files)));
        self
    }

    pub fn get_destination_path(mut self, rename: impl Fn(&str) -> String + 'static) -> Self {
        self.get_destination_path = Some(Box::new(rename));
        self
    }

    pub fn allow_empty(mut self, allow_empty: bool) -> Self {
        self.allow_empty = allow_empty;
        self
    }

    pub fn annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    /// Validate and normalize into the form the engine runs on
    pub(crate) fn resolve(self) -> Result<ResolvedOptions> {
        let mut include = self.include;
        let mut files = None;
        let mut dynamic_files = None;

        match self.files {
            Some(FileList::Static(list)) if list.iter().any(|file| is_glob(file)) => {
                warn!(
                    "files contains glob patterns; treating {:?} as include patterns instead",
                    list
                );
                include = Some(list);
            }
            Some(FileList::Static(list)) => files = Some(list),
            Some(FileList::Dynamic(callback)) => dynamic_files = Some(callback),
            None => {}
        }

        if (files.is_some() || dynamic_files.is_some())
            && (include.is_some() || self.exclude.is_some())
        {
            return Err(FunnelError::Configuration(
                "Cannot pass files option (array or function) and a include/exclude filter. \
                 You can only have one or the other"
                    .to_string(),
            ));
        }

        Ok(ResolvedOptions {
            src_dir: strip_leading_slashes(&self.src_dir).to_string(),
            dest_dir: strip_leading_slashes(&self.dest_dir).to_string(),
            include,
            exclude: self.exclude,
            files,
            dynamic_files,
            get_destination_path: self.get_destination_path,
            allow_empty: self.allow_empty,
            annotation: self.annotation,
        })
    }
}

impl fmt::Debug for FunnelOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunnelOptions")
            .field("src_dir", &self.src_dir)
            .field("dest_dir", &self.dest_dir)
            .field("include", &self.include)
            .field("exclude", &self.exclude)
            .field("files", &self.files)
            .field("get_destination_path", &self.get_destination_path.is_some())
            .field("allow_empty", &self.allow_empty)
            .field("annotation", &self.annotation)
            .finish()
    }
}

/// Validated options
pub(crate) struct ResolvedOptions {
    pub src_dir: String,
    pub dest_dir: String,
    pub include: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub files: Option<Vec<String>>,
    pub dynamic_files: Option<DynamicFiles>,
    pub get_destination_path: Option<DestinationPathFn>,
    pub allow_empty: bool,
    pub annotation: Option<String>,
}

impl ResolvedOptions {
    /// True when nothing filters or renames the projection
    pub fn is_passthrough(&self) -> bool {
        self.files.is_none()
            && self.dynamic_files.is_none()
            && self.include.is_none()
            && self.exclude.is_none()
            && self.get_destination_path.is_none()
    }
}

/// Check whether a file-list entry uses glob syntax
///
/// Recognizes wildcards, classes, braces and the extglob groups `+(..)`,
/// `@(..)` and `!(..)` (`*(..)` and `?(..)` already start with a wildcard).
pub fn is_glob(pattern: &str) -> bool {
    let mut escaped = false;
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if !escaped => escaped = true,
            '*' | '?' | '[' | '{' if !escaped => return true,
            '+' | '@' | '!' if !escaped && chars.peek() == Some(&'(') => return true,
            _ => escaped = false,
        }
    }
    false
}
