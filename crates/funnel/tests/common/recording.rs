//! Output tree wrapper that records every mutation

use funnel_core::{OutputTree, Result, SourceView};

/// Wraps an output tree and logs each mutating call
pub struct RecordingOutput<O> {
    inner: O,
    calls: Vec<String>,
}

impl<O: OutputTree> RecordingOutput<O> {
    pub fn new(inner: O) -> Self {
        Self {
            inner,
            calls: Vec::new(),
        }
    }

    /// Mutating calls so far, as `op path`
    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    /// Drain the recorded calls
    pub fn take_calls(&mut self) -> Vec<String> {
        std::mem::take(&mut self.calls)
    }

    pub fn inner(&self) -> &O {
        &self.inner
    }

    fn record(&mut self, op: &str, path: &str) {
        self.calls.push(format!("{} {}", op, path));
    }
}

impl<O: OutputTree> OutputTree for RecordingOutput<O> {
    fn exists(&self, path: &str) -> bool {
        self.inner.exists(path)
    }

    fn read_dir(&self, path: &str) -> Result<Vec<String>> {
        self.inner.read_dir(path)
    }

    fn is_dir(&self, path: &str) -> bool {
        self.inner.is_dir(path)
    }

    fn is_root_linked(&self) -> bool {
        self.inner.is_root_linked()
    }

    fn mkdirp(&mut self, path: &str) -> Result<()> {
        self.record("mkdirp", path);
        self.inner.mkdirp(path)
    }

    fn mkdir(&mut self, path: &str) -> Result<()> {
        self.record("mkdir", path);
        self.inner.mkdir(path)
    }

    fn rmdir(&mut self, path: &str) -> Result<()> {
        self.record("rmdir", path);
        self.inner.rmdir(path)
    }

    fn unlink(&mut self, path: &str) -> Result<()> {
        self.record("unlink", path);
        self.inner.unlink(path)
    }

    fn symlink_to_view<V: SourceView + ?Sized>(
        &mut self,
        view: &V,
        source_path: &str,
        dest_path: &str,
    ) -> Result<()> {
        self.record("symlink", dest_path);
        self.inner.symlink_to_view(view, source_path, dest_path)
    }

    fn undo_root_symlink(&mut self) -> Result<()> {
        self.record("undo_root_symlink", "");
        self.inner.undo_root_symlink()
    }

    fn empty(&mut self, path: &str) -> Result<()> {
        self.record("empty", path);
        self.inner.empty(path)
    }
}
