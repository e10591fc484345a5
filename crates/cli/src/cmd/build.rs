//! Run one build

use anyhow::{Context, Result};
use clap::Args;
use funnel::{BuildReport, DiskFunnel, FunnelConfig, RenameRule};
use owo_colors::OwoColorize;
use std::env;
use std::path::PathBuf;
use tracing::debug;

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Source directory
    pub source: PathBuf,

    /// Output directory
    pub output: PathBuf,

    /// TOML config file; flags override its values
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Sub-directory of SOURCE to project
    #[arg(long, value_name = "DIR")]
    pub src_dir: Option<String>,

    /// Namespace in OUTPUT the projection lands under
    #[arg(long, value_name = "DIR")]
    pub dest_dir: Option<String>,

    /// Keep files matching the glob (repeatable)
    #[arg(long, value_name = "GLOB")]
    pub include: Vec<String>,

    /// Drop files and directories matching the glob (repeatable)
    #[arg(long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Keep exactly this relative path (repeatable)
    #[arg(long = "files", value_name = "PATH")]
    pub files: Vec<String>,

    /// Rewrite a leading FROM of file paths into TO (repeatable, first match wins)
    #[arg(long, value_name = "FROM=TO")]
    pub rename: Vec<String>,

    /// Treat a missing source directory as empty
    #[arg(long)]
    pub allow_empty: bool,

    /// Name used in logs and the summary
    #[arg(long)]
    pub annotation: Option<String>,

    /// Print the build report as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: BuildArgs) -> Result<()> {
    debug!(?args, "build");
    let config = merge_config(&args)?;

    // Link targets must not depend on where the output sits
    let cwd = env::current_dir().context("Failed to read current directory")?;
    let source = cwd.join(&args.source);
    let output = cwd.join(&args.output);

    let mut funnel = DiskFunnel::open(&source, &output, config.into_options())
        .context("Failed to set up funnel")?;
    let report = funnel.build().context("Build failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

/// Config file (if any) with command line flags applied on top
fn merge_config(args: &BuildArgs) -> Result<FunnelConfig> {
    let mut config = match &args.config {
        Some(path) => FunnelConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => FunnelConfig::default(),
    };

    if let Some(ref src_dir) = args.src_dir {
        config.src_dir = src_dir.clone();
    }
    if let Some(ref dest_dir) = args.dest_dir {
        config.dest_dir = dest_dir.clone();
    }
    if !args.include.is_empty() {
        config.include = Some(args.include.clone());
    }
    if !args.exclude.is_empty() {
        config.exclude = Some(args.exclude.clone());
    }
    if !args.files.is_empty() {
        config.files = Some(args.files.clone());
    }
    if !args.rename.is_empty() {
        let mut rules = args
            .rename
            .iter()
            .map(|spec| RenameRule::parse(spec))
            .collect::<funnel::Result<Vec<_>>>()?;
        // Flag rules are tried before the file's
        rules.append(&mut config.rename);
        config.rename = rules;
    }
    if args.allow_empty {
        config.allow_empty = true;
    }
    if args.annotation.is_some() {
        config.annotation = args.annotation.clone();
    }

    Ok(config)
}

fn print_report(report: &BuildReport) {
    println!(
        "{} {} {}",
        "✓".green(),
        report.name.bold(),
        format!("build #{} in {}ms", report.build, report.elapsed_ms).dimmed()
    );
    println!("  Input:    {}", report.input_root.display().to_string().cyan());
    let dest = if report.dest_dir.is_empty() {
        "(output root)".to_string()
    } else {
        report.dest_dir.clone()
    };
    println!("  Output:   {}", dest.cyan());

    if let Some(action) = report.root_link {
        println!("  Mode:     {}", "root link".yellow());
        println!("  Action:   {}", action);
        return;
    }

    println!("  Mode:     {}", "per file".yellow());
    println!("  Patches:  {}", report.patches);
    let stats = &report.stats;
    println!(
        "  {}",
        format!(
            "mkdir {}  rmdir {}  unlink {}  create {}  change {}  linked {}",
            stats.mkdir, stats.rmdir, stats.unlink, stats.create, stats.change, stats.linked
        )
        .dimmed()
    );
}
