//! Execute a session script

use crate::session::Session;
use crate::system_config::SystemConfig;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::fs;
use std::io;
use std::path::Path;

/// Run every line of `script`, stopping at the first failure unless `keep_going`
pub fn run(config: &SystemConfig, script: &Path, keep_going: bool) -> Result<()> {
    let text = fs::read_to_string(script)
        .with_context(|| format!("Failed to read script {}", script.display()))?;

    let mut session = Session::new(config, io::stdout().lock())?;
    let mut failures = 0usize;

    for (i, line) in text.lines().enumerate() {
        match session.run_line(i + 1, line) {
            Ok(()) => {}
            Err(e) if keep_going => {
                failures += 1;
                eprintln!("{} {:#}", "Error:".red().bold(), e);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Script {} failed", script.display()));
            }
        }
    }

    tracing::info!(failures, version = session.controller().version(), "script finished");

    if failures > 0 {
        anyhow::bail!("{} command(s) failed in {}", failures, script.display());
    }
    Ok(())
}
