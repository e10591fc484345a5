//! Incremental symlink projection of one file tree into another
//!
//! This crate provides:
//! - Destination path resolution under a namespace, with optional renames
//! - Per-build rename index from destination back to source paths
//! - Ordered application of change-lists through symlinks
//! - Whole-tree root linking with rebuild transitions
//! - Options and TOML configuration
//!
//! ```no_run
//! use funnel::{DiskFunnel, FunnelOptions};
//! use std::path::Path;
//!
//! let options = FunnelOptions::new().src_dir("src").dest_dir("lib").include(["**/*.js"]);
//! let mut funnel = DiskFunnel::open(Path::new("app"), Path::new("dist"), options)?;
//! let report = funnel.build()?;
//! println!("{} patches", report.patches);
//! # Ok::<(), funnel::FunnelError>(())
//! ```

pub mod config;
pub mod funnel;
pub mod options;
pub mod patch;
pub mod rename_index;
pub mod resolver;
pub mod root_link;
pub mod symlink;

// Re-exports
pub use config::{example_config, FunnelConfig, RenameRule};
pub use funnel::{BuildReport, DiskFunnel, Funnel};
pub use funnel_core::{FunnelError, Result};
pub use options::{FileList, FunnelOptions};
pub use patch::{ApplyStats, PatchApplier};
pub use rename_index::RenameIndex;
pub use resolver::{DestinationPathFn, DestinationPathResolver};
pub use root_link::{RootLinkAction, RootLinkState};
pub use symlink::link_into;
