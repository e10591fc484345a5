//! Disk-backed output trees for funnel
//!
//! [`DiskOutput`] implements `OutputTree` on top of `std::fs`. Entries are
//! symlinks into source views; the output root itself can become a single
//! link when a whole source tree is projected unchanged.

use funnel_core::path::{is_root, normalize};
use funnel_core::{FunnelError, OutputTree, Result, SourceView};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Output tree rooted at a directory on disk
#[derive(Debug)]
pub struct DiskOutput {
    /// Output directory (or, when root linked, the link standing in for it)
    root: PathBuf,

    /// True while `root` is a link into a source tree
    root_linked: bool,
}

impl DiskOutput {
    /// Open an output tree at `root`, creating the directory if needed
    ///
    /// An existing link at `root` is adopted as a root link.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        let root_linked = match fs::symlink_metadata(&root) {
            Ok(meta) => meta.file_type().is_symlink(),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(&root).map_err(|err| FunnelError::io(&root, err))?;
                false
            }
            Err(err) => return Err(FunnelError::io(&root, err)),
        };

        Ok(Self { root, root_linked })
    }

    /// Output directory path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a tree-relative path
    pub fn full_path(&self, path: &str) -> PathBuf {
        let path = normalize(path);
        if path.is_empty() {
            self.root.clone()
        } else {
            self.root.join(path)
        }
    }

    /// Refuse writes below a root link; they would land in the source tree
    fn guard(&self, path: &str) -> Result<PathBuf> {
        if self.root_linked && !is_root(path) {
            return Err(FunnelError::consistency(
                path,
                "output root is linked into a source tree",
            ));
        }
        Ok(self.full_path(path))
    }

    /// Replace the output root with a link to `target`
    fn link_root(&mut self, target: &Path) -> Result<()> {
        match fs::symlink_metadata(&self.root) {
            Ok(meta) if meta.file_type().is_symlink() => {
                remove_link(&self.root).map_err(|err| FunnelError::io(&self.root, err))?;
            }
            Ok(meta) if meta.is_dir() => {
                if !self.read_dir("")?.is_empty() {
                    return Err(FunnelError::consistency(
                        "",
                        "cannot link output root over a non-empty directory",
                    ));
                }
                fs::remove_dir(&self.root).map_err(|err| FunnelError::io(&self.root, err))?;
            }
            Ok(_) => {
                return Err(FunnelError::consistency("", "output root is a file"));
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(FunnelError::io(&self.root, err)),
        }

        create_symlink(target, &self.root).map_err(|err| FunnelError::io(&self.root, err))?;
        self.root_linked = true;
        Ok(())
    }
}

impl OutputTree for DiskOutput {
    fn exists(&self, path: &str) -> bool {
        fs::symlink_metadata(self.full_path(path)).is_ok()
    }

    fn read_dir(&self, path: &str) -> Result<Vec<String>> {
        let dir = self.full_path(path);
        let listing = fs::read_dir(&dir).map_err(|err| FunnelError::io(&dir, err))?;

        let mut names = Vec::new();
        for entry in listing {
            let entry = entry.map_err(|err| FunnelError::io(&dir, err))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }

        names.sort();
        Ok(names)
    }

    fn is_dir(&self, path: &str) -> bool {
        fs::symlink_metadata(self.full_path(path))
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }

    fn is_root_linked(&self) -> bool {
        self.root_linked
    }

    fn mkdirp(&mut self, path: &str) -> Result<()> {
        let full = self.guard(path)?;
        trace!("mkdirp {}", full.display());
        fs::create_dir_all(&full).map_err(|err| FunnelError::io(&full, err))
    }

    fn mkdir(&mut self, path: &str) -> Result<()> {
        let full = self.guard(path)?;
        trace!("mkdir {}", full.display());
        fs::create_dir(&full).map_err(|err| FunnelError::io(&full, err))
    }

    fn rmdir(&mut self, path: &str) -> Result<()> {
        let full = self.guard(path)?;
        trace!("rmdir {}", full.display());
        fs::remove_dir(&full).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => FunnelError::consistency(path, "no directory to remove"),
            _ => FunnelError::io(&full, err),
        })
    }

    fn unlink(&mut self, path: &str) -> Result<()> {
        let full = self.guard(path)?;
        trace!("unlink {}", full.display());
        remove_link(&full).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => FunnelError::consistency(path, "nothing to unlink"),
            _ => FunnelError::io(&full, err),
        })
    }

    fn symlink_to_view<V: SourceView + ?Sized>(
        &mut self,
        view: &V,
        source_path: &str,
        dest_path: &str,
    ) -> Result<()> {
        let target = view.disk_path(source_path);

        if is_root(dest_path) {
            trace!("link root {} -> {}", self.root.display(), target.display());
            return self.link_root(&target);
        }

        let full = self.guard(dest_path)?;
        trace!("link {} -> {}", full.display(), target.display());
        create_symlink(&target, &full).map_err(|err| FunnelError::io(&full, err))
    }

    fn undo_root_symlink(&mut self) -> Result<()> {
        if !self.root_linked {
            return Ok(());
        }

        trace!("undo root link {}", self.root.display());
        remove_link(&self.root).map_err(|err| FunnelError::io(&self.root, err))?;
        fs::create_dir_all(&self.root).map_err(|err| FunnelError::io(&self.root, err))?;
        self.root_linked = false;
        Ok(())
    }

    fn empty(&mut self, path: &str) -> Result<()> {
        // Emptying a linked root must never reach into the source tree
        if self.root_linked && is_root(path) {
            return self.undo_root_symlink();
        }

        let dir = self.guard(path)?;
        trace!("empty {}", dir.display());
        let listing = fs::read_dir(&dir).map_err(|err| FunnelError::io(&dir, err))?;

        for entry in listing {
            let entry = entry.map_err(|err| FunnelError::io(&dir, err))?;
            let child = entry.path();
            let file_type = entry
                .file_type()
                .map_err(|err| FunnelError::io(&child, err))?;

            let removed = if file_type.is_dir() {
                fs::remove_dir_all(&child)
            } else {
                remove_link(&child)
            };
            removed.map_err(|err| FunnelError::io(&child, err))?;
        }

        Ok(())
    }
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    if target.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}

/// Remove a file or link without following it
#[cfg(unix)]
fn remove_link(path: &Path) -> io::Result<()> {
    fs::remove_file(path)
}

/// Remove a file or link without following it
///
/// Directory links are directories as far as Windows is concerned.
#[cfg(windows)]
fn remove_link(path: &Path) -> io::Result<()> {
    let meta = fs::symlink_metadata(path)?;
    if meta.file_type().is_symlink() && fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false) {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use funnel_core::{ProjectionConfig, SourceTree};
    use funnel_tree::{DiskSource, Projection};
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        source: PathBuf,
        view: Projection,
        output: DiskOutput,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src");
        fs::create_dir_all(source.join("sub")).unwrap();
        fs::write(source.join("a.txt"), b"a").unwrap();
        fs::write(source.join("sub/b.txt"), b"b").unwrap();

        let view = DiskSource::new(&source)
            .project(ProjectionConfig::default())
            .unwrap();
        let output = DiskOutput::open(temp.path().join("out")).unwrap();

        Fixture {
            _temp: temp,
            source,
            view,
            output,
        }
    }

    #[test]
    fn test_open_creates_root() {
        let f = fixture();
        assert!(f.output.root().is_dir());
        assert!(!f.output.is_root_linked());
        assert!(f.output.exists(""));
        assert!(f.output.read_dir("").unwrap().is_empty());
    }

    #[test]
    fn test_symlink_file() {
        let mut f = fixture();
        f.output.symlink_to_view(&f.view, "a.txt", "renamed.txt").unwrap();

        let link = f.output.full_path("renamed.txt");
        assert_eq!(fs::read_link(&link).unwrap(), f.source.join("a.txt"));
        assert_eq!(fs::read(&link).unwrap(), b"a");
    }

    #[test]
    fn test_unlink_missing_is_consistency_error() {
        let mut f = fixture();
        let err = f.output.unlink("nope.txt").unwrap_err();
        assert!(matches!(err, FunnelError::Consistency { ref path, .. } if path == "nope.txt"));
    }

    #[test]
    fn test_dangling_link_exists() {
        let mut f = fixture();
        f.output.symlink_to_view(&f.view, "a.txt", "a.txt").unwrap();
        fs::remove_file(f.source.join("a.txt")).unwrap();

        assert!(f.output.exists("a.txt"));
        f.output.unlink("a.txt").unwrap();
        assert!(!f.output.exists("a.txt"));
    }

    #[test]
    fn test_root_link_and_undo() {
        let mut f = fixture();
        f.output.symlink_to_view(&f.view, "", "").unwrap();

        assert!(f.output.is_root_linked());
        assert_eq!(f.output.read_dir("").unwrap(), vec!["a.txt", "sub"]);
        assert!(fs::symlink_metadata(f.output.root()).unwrap().file_type().is_symlink());

        // Writes below a linked root are refused
        assert!(f.output.mkdir("new").is_err());

        f.output.undo_root_symlink().unwrap();
        assert!(!f.output.is_root_linked());
        assert!(f.output.root().is_dir());
        assert!(f.output.read_dir("").unwrap().is_empty());

        // Source untouched
        assert!(f.source.join("sub/b.txt").exists());
    }

    #[test]
    fn test_root_link_refuses_non_empty_dir() {
        let mut f = fixture();
        f.output.mkdir("stale").unwrap();

        let err = f.output.symlink_to_view(&f.view, "", "").unwrap_err();
        assert!(matches!(err, FunnelError::Consistency { .. }));
        assert!(!f.output.is_root_linked());
    }

    #[test]
    fn test_open_adopts_existing_root_link() {
        let mut f = fixture();
        f.output.symlink_to_view(&f.view, "", "").unwrap();

        let reopened = DiskOutput::open(f.output.root()).unwrap();
        assert!(reopened.is_root_linked());
    }

    #[test]
    fn test_empty_removes_links_and_dirs() {
        let mut f = fixture();
        f.output.mkdirp("x/y").unwrap();
        f.output.symlink_to_view(&f.view, "sub", "x/y/sub").unwrap();
        f.output.symlink_to_view(&f.view, "a.txt", "a.txt").unwrap();

        f.output.empty("").unwrap();
        assert!(f.output.read_dir("").unwrap().is_empty());

        // Link targets survive
        assert!(f.source.join("sub/b.txt").exists());
        assert!(f.source.join("a.txt").exists());
    }

    #[test]
    fn test_empty_on_linked_root_unlinks() {
        let mut f = fixture();
        f.output.symlink_to_view(&f.view, "", "").unwrap();

        f.output.empty("").unwrap();
        assert!(!f.output.is_root_linked());
        assert!(f.source.join("a.txt").exists());
    }

    #[test]
    fn test_is_dir_does_not_follow_links() {
        let mut f = fixture();
        f.output.mkdirp("d").unwrap();
        f.output.symlink_to_view(&f.view, "sub", "linked").unwrap();
        f.output.symlink_to_view(&f.view, "a.txt", "a.txt").unwrap();

        assert!(f.output.is_dir(""));
        assert!(f.output.is_dir("d"));
        assert!(!f.output.is_dir("linked"));
        assert!(!f.output.is_dir("a.txt"));
        assert!(!f.output.is_dir("missing"));
    }

    #[test]
    fn test_rmdir() {
        let mut f = fixture();
        f.output.mkdirp("d").unwrap();
        f.output.rmdir("d").unwrap();
        assert!(!f.output.exists("d"));
        assert!(matches!(
            f.output.rmdir("d"),
            Err(FunnelError::Consistency { .. })
        ));
    }
}
