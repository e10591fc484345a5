//! Funnel CLI - funnel command

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;

/// Funnel - project a source tree into an output tree with symlinks
#[derive(Parser)]
#[command(name = "funnel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log more (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one build from SOURCE into OUTPUT
    Build(cmd::build::BuildArgs),
    /// Show configuration
    Config {
        /// Config file to validate and print (default: built-in defaults)
        file: Option<PathBuf>,

        /// Print a commented example instead
        #[arg(long)]
        example: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Build(args) => cmd::build::run(args),
        Commands::Config { file, example } => cmd::config::run(file.as_deref(), example),
    }
}
