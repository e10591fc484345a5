//! Linking a source path into the output tree

use funnel_core::path::{is_root, parent};
use funnel_core::{OutputTree, Result, SourceView};

/// Make `dest_path` in `output` a link to `source_path` in `view`
///
/// Missing parent directories are created and whatever sits at `dest_path`
/// is replaced. Linking the tree root turns the whole output into one link.
pub fn link_into<V, O>(view: &V, source_path: &str, output: &mut O, dest_path: &str) -> Result<()>
where
    V: SourceView + ?Sized,
    O: OutputTree,
{
    let dir = parent(dest_path);
    if !output.exists(dir) {
        output.mkdirp(dir)?;
    }

    if !is_root(dest_path) && output.exists(dest_path) {
        output.unlink(dest_path)?;
    }

    output.symlink_to_view(view, source_path, dest_path)
}
