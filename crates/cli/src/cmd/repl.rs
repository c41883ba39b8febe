//! Interactive session over stdin

use crate::session::Session;
use crate::system_config::SystemConfig;
use anyhow::Result;
use owo_colors::OwoColorize;
use std::io::{self, BufRead, Write};

const PROMPT: &str = "tl> ";

/// Read commands until EOF, `quit` or `exit`; errors are printed and skipped
pub fn run(config: &SystemConfig) -> Result<()> {
    let stdin = io::stdin();
    let mut session = Session::new(config, io::stdout())?;

    print_prompt()?;
    for (i, line) in stdin.lock().lines().enumerate() {
        let line = line?;
        if matches!(line.trim(), "quit" | "exit") {
            break;
        }

        if let Err(e) = session.run_line(i + 1, &line) {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
        }
        print_prompt()?;
    }

    Ok(())
}

fn print_prompt() -> Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "{}", PROMPT)?;
    stdout.flush()?;
    Ok(())
}
