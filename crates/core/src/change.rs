//! Source entries and the change-list model

use crate::error::FunnelError;
use crate::path::is_root;
use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

/// Type of source entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Regular file (or a symlink resolving to one)
    File,
    /// Directory (or a symlink resolving to one)
    Directory,
}

/// Entry of a source snapshot
///
/// Identity is the source-relative path. Size and mtime only feed the source
/// collaborator's change detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Path relative to the projection root, `/`-separated
    pub relative_path: String,
    /// Kind of entry
    pub kind: EntryKind,
    /// Size in bytes (0 for directories)
    pub size: u64,
    /// Last modification time, when the platform reports one
    pub mtime: Option<SystemTime>,
}

impl SourceEntry {
    /// Create a new file entry
    pub fn file(relative_path: impl Into<String>, size: u64, mtime: Option<SystemTime>) -> Self {
        Self {
            relative_path: relative_path.into(),
            kind: EntryKind::File,
            size,
            mtime,
        }
    }

    /// Create a new directory entry
    pub fn directory(relative_path: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
            kind: EntryKind::Directory,
            size: 0,
            mtime: None,
        }
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// True when `other` describes different content at the same path
    pub fn differs_from(&self, other: &SourceEntry) -> bool {
        if self.kind != other.kind {
            return true;
        }
        // Directory metadata churns with every child; only children matter.
        if self.is_directory() {
            return false;
        }
        self.size != other.size || self.mtime != other.mtime
    }
}

/// Filesystem delta kind
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Mkdir,
    Rmdir,
    Unlink,
    Create,
    Change,
}

impl Operation {
    /// Lowercase wire name of the operation
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Mkdir => "mkdir",
            Operation::Rmdir => "rmdir",
            Operation::Unlink => "unlink",
            Operation::Create => "create",
            Operation::Change => "change",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = FunnelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mkdir" => Ok(Operation::Mkdir),
            "rmdir" => Ok(Operation::Rmdir),
            "unlink" => Ok(Operation::Unlink),
            "create" => Ok(Operation::Create),
            "change" => Ok(Operation::Change),
            other => Err(FunnelError::UnknownOperation(other.to_string())),
        }
    }
}

/// One entry of an ordered change-list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    /// What happened to the entry
    pub operation: Operation,
    /// Tree-relative target; `None` for the root entries the collaborator manages
    pub destination: Option<String>,
    /// The source entry the change describes
    pub entry: SourceEntry,
}

impl Change {
    /// Create a change whose destination starts out as the entry's own path
    pub fn new(operation: Operation, entry: SourceEntry) -> Self {
        let destination = if is_root(&entry.relative_path) {
            None
        } else {
            Some(entry.relative_path.clone())
        };

        Self {
            operation,
            destination,
            entry,
        }
    }

    /// Parse a change from its operation name
    pub fn parse(operation: &str, entry: SourceEntry) -> Result<Self, FunnelError> {
        Ok(Self::new(operation.parse()?, entry))
    }
}
