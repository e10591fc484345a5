//! The funnel engine

use crate::options::{DynamicFiles, FunnelOptions, ResolvedOptions};
use crate::patch::{ApplyStats, PatchApplier};
use crate::rename_index::RenameIndex;
use crate::resolver::DestinationPathResolver;
use crate::root_link::{self, RootLinkAction, RootLinkInputs, RootLinkState};
use funnel_core::path::is_root;
use funnel_core::{Change, FunnelError, OutputTree, ProjectionConfig, Result, SourceTree, SourceView};
use funnel_output::DiskOutput;
use funnel_tree::{DiskSource, Projection};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};

/// Name used in logs when no annotation is set
const DEFAULT_NAME: &str = "Funnel";

/// Summary of one build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    /// Debug name of the funnel
    pub name: String,
    /// 1-based build counter
    pub build: u64,
    /// True when the build ran in rebuild mode
    pub rebuild: bool,
    /// True when the whole tree was handled as a single root link
    pub linked_roots: bool,
    /// Root-link transition, in root-link mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_link: Option<RootLinkAction>,
    /// Number of changes in the change-list, in per-file mode
    pub patches: usize,
    pub stats: ApplyStats,
    /// Projected source directory
    pub input_root: PathBuf,
    /// Namespace in the output
    pub dest_dir: String,
    pub elapsed_ms: u64,
}

/// Projects a source tree into an output tree, one build at a time
///
/// Each call to [`Funnel::build`] brings the output in line with the
/// source. When nothing filters or renames the projection, the namespace
/// becomes a single link to the source directory. Otherwise every file is
/// linked on its own and only the changes since the previous build are
/// applied.
pub struct Funnel<V: SourceView, O: OutputTree> {
    view: V,
    output: O,
    options: ResolvedOptions,
    dynamic_files: Option<DynamicFiles>,
    resolver: DestinationPathResolver,
    rename_index: RenameIndex,

    /// A previous build produced the current output
    is_rebuild: bool,
    root_state: RootLinkState,
    builds: u64,
}

/// Funnel over disk-backed trees
pub type DiskFunnel = Funnel<Projection, DiskOutput>;

impl DiskFunnel {
    /// Funnel from the directory `source` into the directory `output`
    pub fn open(source: &Path, output: &Path, options: FunnelOptions) -> Result<Self> {
        let source = DiskSource::new(source);
        let output = DiskOutput::open(output)?;
        Funnel::new(&source, output, options)
    }
}

impl<V: SourceView, O: OutputTree> Funnel<V, O> {
    /// Create a funnel projecting `source` into `output`
    pub fn new<S>(source: &S, output: O, options: FunnelOptions) -> Result<Self>
    where
        S: SourceTree<View = V>,
    {
        let mut options = options.resolve()?;
        let dynamic_files = options.dynamic_files.take();
        let rename = options.get_destination_path.take();

        // Dynamic lists start empty; the callback fills them before each build
        let files = match dynamic_files {
            Some(_) => Some(Vec::new()),
            None => options.files.clone(),
        };

        let view = source.project(ProjectionConfig {
            cwd: options.src_dir.clone(),
            files,
            include: options.include.clone(),
            exclude: options.exclude.clone(),
        })?;

        let should_link_roots = options.is_passthrough() && rename.is_none() && dynamic_files.is_none();
        debug!(
            funnel = options.annotation.as_deref().unwrap_or(DEFAULT_NAME),
            src_dir = %options.src_dir,
            dest_dir = %options.dest_dir,
            link_roots = should_link_roots,
            "created funnel"
        );

        Ok(Self {
            view,
            output,
            resolver: DestinationPathResolver::new(&options.dest_dir, rename),
            rename_index: RenameIndex::new(&options.dest_dir),
            options,
            dynamic_files,
            is_rebuild: false,
            root_state: RootLinkState::default(),
            builds: 0,
        })
    }

    /// Name used in logs (the annotation, else `Funnel`)
    pub fn debug_name(&self) -> &str {
        self.options.annotation.as_deref().unwrap_or(DEFAULT_NAME)
    }

    /// True when the namespace is handled as a single root link
    pub fn should_link_roots(&self) -> bool {
        self.options.is_passthrough()
            && self.dynamic_files.is_none()
            && !self.resolver.has_rename()
    }

    /// Bring the output in line with the source
    pub fn build(&mut self) -> Result<BuildReport> {
        let started = Instant::now();
        self.builds += 1;

        let linked_roots = self.should_link_roots();
        let (rebuild, root_link, patches, stats) = if linked_roots {
            let (rebuild, action) = self.build_root_link()?;
            (rebuild, Some(action), 0, ApplyStats::default())
        } else {
            let rebuild = self.is_rebuild;
            let (patches, stats) = self.build_patches()?;
            (rebuild, None, patches, stats)
        };

        let report = BuildReport {
            name: self.debug_name().to_string(),
            build: self.builds,
            rebuild,
            linked_roots,
            root_link,
            patches,
            stats,
            input_root: self.view.root().to_path_buf(),
            dest_dir: self.options.dest_dir.clone(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        };

        debug!(
            funnel = %report.name,
            build = report.build,
            linked_roots = report.linked_roots,
            patches = report.patches,
            mutations = report.stats.mutations(),
            elapsed_ms = report.elapsed_ms,
            input_root = %report.input_root.display(),
            dest_dir = %report.dest_dir,
            "build finished"
        );

        Ok(report)
    }

    /// Returns whether the build ran as a rebuild, and what it did
    fn build_root_link(&mut self) -> Result<(bool, RootLinkAction)> {
        // A wiped output starts over as a first build
        if self.is_rebuild && root_link::is_fresh_output(&self.output)? {
            debug!(funnel = %self.debug_name(), "output is fresh, building from scratch");
            self.is_rebuild = false;
        }

        let inputs = RootLinkInputs {
            is_rebuild: self.is_rebuild,
            input_exists: self.view.exists(""),
            allow_empty: self.options.allow_empty,
            last: self.root_state,
        };
        let action = root_link::plan(inputs, &self.options.src_dir)?;
        let rebuild = self.is_rebuild;

        if !rebuild {
            self.reset_stale_output()?;
        }

        self.root_state = root_link::execute(
            action,
            &self.view,
            &mut self.output,
            &self.options.dest_dir,
            self.root_state,
        )?;
        self.is_rebuild = true;

        debug!(funnel = %self.debug_name(), ?action, state = ?self.root_state, "root link");
        Ok((rebuild, action))
    }

    fn build_patches(&mut self) -> Result<(usize, ApplyStats)> {
        if let Some(files) = self.dynamic_files.as_mut() {
            let list = (*files)();
            self.view.set_files(Some(list));
        }

        if !self.is_rebuild {
            if !self.options.allow_empty && !self.view.exists("") {
                return Err(FunnelError::MissingSource {
                    src_dir: self.options.src_dir.clone(),
                });
            }
            self.reset_stale_output()?;
        }

        let dest_dir = &self.options.dest_dir;
        if !is_root(dest_dir) && !self.output.exists(dest_dir) {
            self.output.mkdirp(dest_dir)?;
        }

        let mut changes = self.view.changes()?;

        // The view already moved past this change-list. If it is not fully
        // applied, the next build has to start over from the whole view.
        let stats = match self.apply_changes(&mut changes) {
            Ok(stats) => stats,
            Err(err) => {
                warn!(funnel = %self.debug_name(), error = %err, "patching failed, next build starts over");
                self.view.reset();
                self.is_rebuild = false;
                return Err(err);
            }
        };

        self.is_rebuild = true;
        Ok((changes.len(), stats))
    }

    /// Resolve destinations for `changes` and apply them to the output
    fn apply_changes(&mut self, changes: &mut [Change]) -> Result<ApplyStats> {
        self.rename_index.clear();
        for change in changes.iter_mut() {
            if change.destination.is_none() {
                continue;
            }
            let destination = self.resolver.resolve(&change.entry);
            if !change.entry.is_directory() && destination == self.resolver.namespace() {
                return Err(FunnelError::Configuration(format!(
                    "`{}` resolves to the namespace root; a file cannot replace it",
                    change.entry.relative_path
                )));
            }
            self.rename_index
                .insert(destination.clone(), change.entry.relative_path.clone());
            change.destination = Some(destination);
        }

        let mut applier = PatchApplier::new(&self.view, &mut self.output, &self.rename_index);
        applier.apply(changes)?;
        Ok(applier.into_stats())
    }

    /// Clear what an earlier instance or failed build left in the namespace
    fn reset_stale_output(&mut self) -> Result<()> {
        let dest_dir = &self.options.dest_dir;
        if root_link::is_fresh_namespace(&self.output, dest_dir)? {
            return Ok(());
        }
        debug!(funnel = %self.debug_name(), dest_dir = %dest_dir, "clearing stale namespace");
        root_link::clear_namespace(&mut self.output, dest_dir)?;
        self.root_state = RootLinkState::Unlinked;
        Ok(())
    }

    pub fn is_rebuild(&self) -> bool {
        self.is_rebuild
    }

    pub fn root_state(&self) -> RootLinkState {
        self.root_state
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Destination -> source table of the latest per-file build
    pub fn rename_index(&self) -> &RenameIndex {
        &self.rename_index
    }

    pub fn src_dir(&self) -> &str {
        &self.options.src_dir
    }

    pub fn dest_dir(&self) -> &str {
        &self.options.dest_dir
    }

    pub fn into_output(self) -> O {
        self.output
    }
}
