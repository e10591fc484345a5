//! Disk-backed source trees for funnel
//!
//! This crate provides:
//! - Include/exclude/file-list filtering with gitignore-style globs
//! - Snapshot scanning of a directory
//! - Snapshot diffing into an ordered change-list
//! - Projections (scoped, filtered views) implementing `SourceView`

pub mod diff;
pub mod filter;
pub mod projection;
pub mod snapshot;

// Re-exports
pub use diff::TreeDiff;
pub use filter::PathFilter;
pub use projection::{DiskSource, Projection};
pub use snapshot::Snapshot;
