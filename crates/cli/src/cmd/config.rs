//! Configuration command
//!
//! Prints the built-in defaults, a validated config file, or a commented
//! example to start from.

use anyhow::{Context, Result};
use funnel::{example_config, FunnelConfig};
use owo_colors::OwoColorize;
use std::path::Path;

pub fn run(file: Option<&Path>, example: bool) -> Result<()> {
    if example {
        print!("{}", example_config());
        return Ok(());
    }

    let config = match file {
        Some(path) => FunnelConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => FunnelConfig::default(),
    };

    match file {
        Some(path) => eprintln!("{}: {}", "Location".dimmed(), path.display()),
        None => eprintln!("{}", "Built-in defaults".dimmed()),
    }
    print!("{}", config.to_toml().context("Failed to render config")?);

    Ok(())
}
