//! Shared model for funnel
//!
//! This crate provides:
//! - Source entries and the ordered change-list model
//! - Namespace-safe path helpers
//! - The collaborator traits for source and output trees
//! - The error type shared by every funnel crate

pub mod change;
pub mod error;
pub mod facade;
pub mod path;

// Re-exports
pub use change::{Change, EntryKind, Operation, SourceEntry};
pub use error::{FunnelError, Result};
pub use facade::{OutputTree, ProjectionConfig, SourceTree, SourceView};
