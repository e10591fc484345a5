//! Error type shared by the funnel crates

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while projecting a source tree into an output tree
///
/// None of these are retried. A build that fails while patching may leave
/// its namespace partially patched; the next build clears the namespace and
/// starts over from the whole source view.
#[derive(Debug, Error)]
pub enum FunnelError {
    /// The configured source directory is missing and empty output was not allowed
    #[error(
        "You specified a `src_dir` of `{src_dir}` which does not exist and did not specify `allow_empty = true`"
    )]
    MissingSource {
        /// The configured `src_dir`, as given by the user
        src_dir: String,
    },

    /// Options that cannot be combined or parsed
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A collaborator's state disagrees with the change-list being applied
    #[error("inconsistent tree state at `{path}`: {detail}")]
    Consistency {
        /// Tree-relative path the operation referenced
        path: String,
        /// What was expected versus found
        detail: String,
    },

    /// A change carried an operation outside the known set
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// Any other filesystem failure
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Absolute path the failing call touched
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },
}

impl FunnelError {
    /// Wrap an I/O error with the path it occurred on
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Build a consistency error for a tree-relative path
    pub fn consistency(path: &str, detail: impl Into<String>) -> Self {
        Self::Consistency {
            path: path.to_string(),
            detail: detail.into(),
        }
    }

    /// True for errors caused by configuration rather than tree state
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingSource { .. } | Self::Configuration(_))
    }
}

/// Result type for funnel operations
pub type Result<T> = std::result::Result<T, FunnelError>;
