//! Source/output directory fixtures

use funnel::{Funnel, FunnelOptions};
use funnel_output::DiskOutput;
use funnel_tree::{DiskSource, Projection};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::RecordingOutput;

/// A temporary source tree next to an output directory
pub struct TestTree {
    _temp_dir: TempDir,
    source: PathBuf,
    output: PathBuf,
}

impl TestTree {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("source");
        let output = temp_dir.path().join("output");
        fs::create_dir_all(&source).unwrap();

        Self {
            _temp_dir: temp_dir,
            source,
            output,
        }
    }

    /// Write a source file, creating parent directories
    pub fn write(&self, path: &str, contents: &str) -> &Self {
        let full = self.source.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, contents).unwrap();
        self
    }

    pub fn remove(&self, path: &str) {
        let full = self.source.join(path);
        if full.is_dir() {
            fs::remove_dir_all(full).unwrap();
        } else {
            fs::remove_file(full).unwrap();
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn source_path(&self, path: &str) -> PathBuf {
        self.source.join(path)
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn output_path(&self, path: &str) -> PathBuf {
        if path.is_empty() {
            self.output.clone()
        } else {
            self.output.join(path)
        }
    }

    /// Link target of an output path, if it is a link
    pub fn link_target(&self, path: &str) -> Option<PathBuf> {
        fs::read_link(self.output_path(path)).ok()
    }

    pub fn is_output_dir(&self, path: &str) -> bool {
        fs::symlink_metadata(self.output_path(path))
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }

    pub fn output_exists(&self, path: &str) -> bool {
        fs::symlink_metadata(self.output_path(path)).is_ok()
    }

    /// Sorted entries of an output directory
    pub fn output_entries(&self, path: &str) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.output_path(path))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Funnel whose output mutations are counted
    pub fn funnel(&self, options: FunnelOptions) -> Funnel<Projection, RecordingOutput<DiskOutput>> {
        self.try_funnel(options).unwrap()
    }

    pub fn try_funnel(
        &self,
        options: FunnelOptions,
    ) -> funnel::Result<Funnel<Projection, RecordingOutput<DiskOutput>>> {
        let output = RecordingOutput::new(DiskOutput::open(&self.output)?);
        Funnel::new(&DiskSource::new(&self.source), output, options)
    }
}
