//! Common utilities for integration tests

#![allow(dead_code)]

pub mod fixtures;
pub mod recording;

// Re-export commonly used items
pub use fixtures::TestTree;
pub use recording::RecordingOutput;
