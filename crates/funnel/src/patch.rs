//! Applying a change-list to the output tree

use crate::rename_index::RenameIndex;
use crate::symlink::link_into;
use funnel_core::{Change, FunnelError, Operation, OutputTree, Result, SourceView};
use serde::Serialize;
use tracing::debug;

/// Operation counters for one build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplyStats {
    pub mkdir: usize,
    pub rmdir: usize,
    pub unlink: usize,
    pub create: usize,
    pub change: usize,
    /// Root entries skipped because the collaborator manages them
    pub other: usize,
    /// Changes that carried a destination
    pub processed: usize,
    /// Symlinks created
    pub linked: usize,
}

impl ApplyStats {
    /// Number of calls that mutated the output tree
    pub fn mutations(&self) -> usize {
        self.mkdir + self.rmdir + self.unlink + self.linked
    }
}

/// Applies resolved changes, in order, to an output tree
pub struct PatchApplier<'a, V: ?Sized, O> {
    view: &'a V,
    output: &'a mut O,
    index: &'a RenameIndex,
    stats: ApplyStats,
}

impl<'a, V, O> PatchApplier<'a, V, O>
where
    V: SourceView + ?Sized,
    O: OutputTree,
{
    pub fn new(view: &'a V, output: &'a mut O, index: &'a RenameIndex) -> Self {
        Self {
            view,
            output,
            index,
            stats: ApplyStats::default(),
        }
    }

    /// Apply every change, stopping at the first failure
    pub fn apply(&mut self, changes: &[Change]) -> Result<()> {
        for change in changes {
            self.apply_one(change)?;
        }
        Ok(())
    }

    fn apply_one(&mut self, change: &Change) -> Result<()> {
        let Some(ref dest) = change.destination else {
            self.stats.other += 1;
            return Ok(());
        };
        self.stats.processed += 1;

        debug!(operation = %change.operation, path = %dest, "apply patch");

        match change.operation {
            Operation::Unlink => {
                self.stats.unlink += 1;
                self.output.unlink(dest)
            }
            Operation::Rmdir => {
                self.stats.rmdir += 1;
                self.output.rmdir(dest)
            }
            Operation::Mkdir => {
                self.stats.mkdir += 1;
                self.output.mkdir(dest)
            }
            Operation::Create => {
                self.stats.create += 1;
                self.link(dest)
            }
            Operation::Change => {
                self.stats.change += 1;
                self.link(dest)
            }
            ref other => Err(FunnelError::UnknownOperation(other.to_string())),
        }
    }

    fn link(&mut self, dest: &str) -> Result<()> {
        let index = self.index;
        let source = index.source_for(dest);
        link_into(self.view, source, &mut *self.output, dest)?;
        self.stats.linked += 1;
        Ok(())
    }

    pub fn stats(&self) -> &ApplyStats {
        &self.stats
    }

    pub fn into_stats(self) -> ApplyStats {
        self.stats
    }
}
