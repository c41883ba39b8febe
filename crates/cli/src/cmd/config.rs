//! Configuration management command
//!
//! Provides CLI interface to view and edit the config file.

use crate::system_config::{self, SystemConfig, KEYS};
use anyhow::Result;
use owo_colors::OwoColorize;
use std::path::Path;

/// List all configuration values
pub fn run_list(path: &Path) -> Result<()> {
    let config = system_config::load_from(path)?;

    println!("{}", "Timeline Configuration".bold());
    println!(
        "{}: {}{}\n",
        "Location".dimmed(),
        path.display().dimmed(),
        if path.exists() { "" } else { " (not created, using defaults)" }
    );

    let mut section = "";
    for &key in KEYS {
        let (prefix, name) = key.split_once('.').unwrap_or(("", key));
        if prefix != section {
            if !section.is_empty() {
                println!();
            }
            println!("{}", format!("[{}]", prefix).yellow());
            section = prefix;
        }
        println!("  {} = {}", name.cyan(), config.get(key)?);
    }

    Ok(())
}

/// Get a single configuration value
pub fn run_get(path: &Path, key: &str) -> Result<()> {
    let config = system_config::load_from(path)?;
    println!("{}", config.get(key)?);
    Ok(())
}

/// Set a configuration value
pub fn run_set(path: &Path, key: &str, value: &str) -> Result<()> {
    let mut config = system_config::load_from(path)?;
    config.set(key, value)?;
    system_config::save_to(&config, path)?;

    println!("{} {} = {}", "✓".green(), key.cyan(), config.get(key)?);
    Ok(())
}

/// Print the config file location, optionally writing defaults there
pub fn run_path(path: &Path, create: bool) -> Result<()> {
    if create && !path.exists() {
        system_config::save_to(&SystemConfig::default(), path)?;
        println!("{} Created {}", "✓".green(), path.display());
    } else {
        println!("{}", path.display());
    }
    Ok(())
}

/// Print an annotated example config
pub fn run_example() -> Result<()> {
    print!("{}", system_config::example_config());
    Ok(())
}
