//! Linking a whole source tree at the namespace root
//!
//! When a funnel neither filters nor renames, the namespace can be a single
//! link to the projected source directory instead of one link per file.
//! [`plan`] decides what a build has to do; [`execute`] performs it.

use crate::symlink::link_into;
use funnel_core::path::is_root;
use funnel_core::{FunnelError, OutputTree, Result, SourceView};
use serde::Serialize;
use std::fmt;

/// What the previous root-link build left in the output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RootLinkState {
    /// Nothing managed yet, or cleared
    #[default]
    Unlinked,
    /// The namespace is a link to the source root
    Linked,
    /// The namespace is an empty directory standing in for a missing source
    Empty,
}

/// Inputs the planner decides on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootLinkInputs {
    /// A previous build of this instance produced the current output
    pub is_rebuild: bool,
    /// The projected source directory exists
    pub input_exists: bool,
    pub allow_empty: bool,
    /// Outcome of the previous build
    pub last: RootLinkState,
}

/// Transition a root-link build performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RootLinkAction {
    /// Link the namespace to the source root
    Link,
    /// Create the empty namespace directory
    CreateEmpty,
    /// Clear a stale namespace, then link it to the source root
    Relink,
    /// Clear the link, then create the empty namespace directory
    ResetToEmpty,
    /// Clear the link and leave nothing behind
    Clear,
    /// Output already matches
    Nothing,
}

impl RootLinkAction {
    /// State of the output once the action has run
    pub fn outcome(self, last: RootLinkState) -> RootLinkState {
        match self {
            RootLinkAction::Link | RootLinkAction::Relink => RootLinkState::Linked,
            RootLinkAction::CreateEmpty | RootLinkAction::ResetToEmpty => RootLinkState::Empty,
            RootLinkAction::Clear => RootLinkState::Unlinked,
            RootLinkAction::Nothing => last,
        }
    }

    pub fn is_noop(self) -> bool {
        self == RootLinkAction::Nothing
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RootLinkAction::Link => "link",
            RootLinkAction::CreateEmpty => "create_empty",
            RootLinkAction::Relink => "relink",
            RootLinkAction::ResetToEmpty => "reset_to_empty",
            RootLinkAction::Clear => "clear",
            RootLinkAction::Nothing => "nothing",
        }
    }
}

impl fmt::Display for RootLinkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decide the transition for one build
///
/// A first build without source fails unless empty output is allowed. A
/// rebuild without source and without `allow_empty` clears a link but does
/// not fail.
pub fn plan(inputs: RootLinkInputs, src_dir: &str) -> Result<RootLinkAction> {
    use RootLinkAction::*;

    let action = match (inputs.is_rebuild, inputs.input_exists, inputs.allow_empty) {
        (false, true, _) => Link,
        (false, false, true) => CreateEmpty,
        (false, false, false) => {
            return Err(FunnelError::MissingSource {
                src_dir: src_dir.to_string(),
            })
        }
        (true, true, _) => match inputs.last {
            RootLinkState::Linked => Nothing,
            _ => Relink,
        },
        (true, false, true) => match inputs.last {
            RootLinkState::Empty => Nothing,
            _ => ResetToEmpty,
        },
        (true, false, false) => match inputs.last {
            RootLinkState::Linked => Clear,
            _ => Nothing,
        },
    };

    Ok(action)
}

/// True when the output holds neither a root link nor any entry
pub fn is_fresh_output<O: OutputTree>(output: &O) -> Result<bool> {
    if output.is_root_linked() {
        return Ok(false);
    }
    if !output.exists("") {
        return Ok(true);
    }
    Ok(output.read_dir("")?.is_empty())
}

/// Remove whatever a previous build left in the output
pub fn clear_output<O: OutputTree>(output: &mut O) -> Result<()> {
    if output.is_root_linked() {
        output.undo_root_symlink()
    } else if output.exists("") {
        output.empty("")
    } else {
        Ok(())
    }
}

/// True when the namespace holds nothing a previous build left behind
///
/// A namespace at the tree root owns the whole output. Any other namespace
/// only looks at its own directory, so sibling namespaces never make it
/// stale.
pub fn is_fresh_namespace<O: OutputTree>(output: &O, dest_dir: &str) -> Result<bool> {
    if is_root(dest_dir) {
        return is_fresh_output(output);
    }
    if output.is_root_linked() {
        return Ok(false);
    }
    if !output.exists(dest_dir) {
        return Ok(true);
    }
    if !output.is_dir(dest_dir) {
        return Ok(false);
    }
    Ok(output.read_dir(dest_dir)?.is_empty())
}

/// Remove whatever a previous build left in the namespace, leaving siblings alone
pub fn clear_namespace<O: OutputTree>(output: &mut O, dest_dir: &str) -> Result<()> {
    if is_root(dest_dir) || output.is_root_linked() {
        return clear_output(output);
    }
    if !output.exists(dest_dir) {
        return Ok(());
    }
    if output.is_dir(dest_dir) {
        output.empty(dest_dir)
    } else {
        output.unlink(dest_dir)
    }
}

/// Perform `action` against `output`, returning the new state
pub fn execute<V, O>(
    action: RootLinkAction,
    view: &V,
    output: &mut O,
    dest_dir: &str,
    last: RootLinkState,
) -> Result<RootLinkState>
where
    V: SourceView + ?Sized,
    O: OutputTree,
{
    match action {
        RootLinkAction::Link => link_into(view, "", output, dest_dir)?,
        RootLinkAction::Relink => {
            clear_output(output)?;
            link_into(view, "", output, dest_dir)?;
        }
        RootLinkAction::CreateEmpty => create_namespace(output, dest_dir)?,
        RootLinkAction::ResetToEmpty => {
            clear_output(output)?;
            create_namespace(output, dest_dir)?;
        }
        RootLinkAction::Clear => clear_output(output)?,
        RootLinkAction::Nothing => {}
    }

    Ok(action.outcome(last))
}

fn create_namespace<O: OutputTree>(output: &mut O, dest_dir: &str) -> Result<()> {
    if is_root(dest_dir) || output.exists(dest_dir) {
        return Ok(());
    }
    output.mkdirp(dest_dir)
}
