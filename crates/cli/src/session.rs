//! Line-oriented session language over a version controller
//!
//! One command per line. Blank lines and lines starting with `#` are skipped.

use crate::system_config::SystemConfig;
use crate::util::{self, Palette};
use anyhow::{anyhow, bail, Context, Result};
use std::io::{self, Write};
use timeline_core::Value;
use timeline_debug::Debugger;
use timeline_journal::VersionController;

/// Debugger category for session commands
pub const CATEGORY: &str = "session";

/// A parsed session command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Set { name: String, value: Value },
    Push { name: String, value: Value },
    Del { name: String },
    Get { name: String },
    Show,
    Commit { label: Option<String> },
    Undo,
    Redo,
    Versions,
    Diff { from: usize, to: usize },
    Status,
}

impl Command {
    /// Parse one line; `Ok(None)` for blank lines and comments
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (verb, rest) = split_word(line);
        let command = match verb {
            "set" => {
                let (name, value) = name_and_value(verb, rest)?;
                Command::Set { name, value }
            }
            "push" => {
                let (name, value) = name_and_value(verb, rest)?;
                Command::Push { name, value }
            }
            "del" => Command::Del {
                name: single_name(verb, rest)?,
            },
            "get" => Command::Get {
                name: single_name(verb, rest)?,
            },
            "show" => no_args(verb, rest, Command::Show)?,
            "commit" => Command::Commit {
                label: (!rest.is_empty()).then(|| rest.to_string()),
            },
            "undo" => no_args(verb, rest, Command::Undo)?,
            "redo" => no_args(verb, rest, Command::Redo)?,
            "versions" => no_args(verb, rest, Command::Versions)?,
            "diff" => {
                let (from, rest) = split_word(rest);
                let (to, extra) = split_word(rest);
                if to.is_empty() || !extra.is_empty() {
                    bail!("Usage: diff <from> <to>");
                }
                Command::Diff {
                    from: parse_version(from)?,
                    to: parse_version(to)?,
                }
            }
            "status" => no_args(verb, rest, Command::Status)?,
            _ => bail!("Unknown command '{}'", verb),
        };
        Ok(Some(command))
    }
}

fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(end) => (&text[..end], text[end..].trim()),
        None => (text, ""),
    }
}

fn name_and_value(verb: &str, rest: &str) -> Result<(String, Value)> {
    let (name, literal) = split_word(rest);
    if name.is_empty() || literal.is_empty() {
        bail!("Usage: {} <name> <json>", verb);
    }
    let json: serde_json::Value = serde_json::from_str(literal)
        .with_context(|| format!("Invalid JSON value: {}", literal))?;
    Ok((name.to_string(), util::value_from_json(json)))
}

fn single_name(verb: &str, rest: &str) -> Result<String> {
    let (name, extra) = split_word(rest);
    if name.is_empty() || !extra.is_empty() {
        bail!("Usage: {} <name>", verb);
    }
    Ok(name.to_string())
}

fn no_args(verb: &str, rest: &str, command: Command) -> Result<Command> {
    if !rest.is_empty() {
        bail!("'{}' takes no arguments", verb);
    }
    Ok(command)
}

fn parse_version(text: &str) -> Result<usize> {
    text.parse()
        .with_context(|| format!("Invalid version number '{}'", text))
}

/// A controller plus the output and debugging around it
pub struct Session<W: Write> {
    controller: VersionController,
    debugger: Debugger<io::Stderr>,
    palette: Palette,
    timestamps: bool,
    out: W,
}

impl<W: Write> Session<W> {
    pub fn new(config: &SystemConfig, out: W) -> Result<Self> {
        let debugger = Debugger::with_writer(config.debug.clone(), io::stderr())
            .context("Failed to start debugger")?;
        Ok(Self {
            controller: VersionController::new(),
            debugger,
            palette: Palette::new(config.display.color),
            timestamps: config.display.timestamps,
            out,
        })
    }

    pub fn controller(&self) -> &VersionController {
        &self.controller
    }

    /// The output sink
    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.out
    }

    /// Parse and execute one line, reporting failures with its line number
    pub fn run_line(&mut self, line_no: usize, line: &str) -> Result<()> {
        let command = Command::parse(line).with_context(|| format!("line {}", line_no))?;
        let Some(command) = command else {
            return Ok(());
        };

        self.debugger.log_start(line.trim(), &[CATEGORY])?;
        let result = self.execute(command);
        self.debugger.log_end(&[CATEGORY])?;

        result.with_context(|| format!("line {}", line_no))
    }

    /// Execute a parsed command
    pub fn execute(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Set { name, value } => {
                self.controller.set(name, value);
            }
            Command::Push { name, value } => {
                let list = self
                    .controller
                    .get(&name)
                    .ok_or_else(|| anyhow!("No attribute named '{}'", name))?
                    .as_list()
                    .ok_or_else(|| anyhow!("Attribute '{}' is not a list", name))?;
                list.push(value);
            }
            Command::Del { name } => {
                if self.controller.remove(&name).is_none() {
                    bail!("No attribute named '{}'", name);
                }
            }
            Command::Get { name } => {
                let value = self
                    .controller
                    .get(&name)
                    .ok_or_else(|| anyhow!("No attribute named '{}'", name))?;
                writeln!(self.out, "{} = {}", self.palette.name(&name), value)?;
            }
            Command::Show => self.show()?,
            Command::Commit { label } => {
                let checkpoint = match label {
                    Some(label) => self.controller.commit_labeled(label),
                    None => self.controller.commit(),
                };
                let id = util::short_id(&checkpoint.id);
                let changes = checkpoint.meta.changes();
                let version = self.controller.version();
                writeln!(
                    self.out,
                    "Committed version {} {} ({} changes)",
                    version,
                    self.palette.dimmed(&id),
                    changes
                )?;
            }
            Command::Undo => {
                self.controller.undo()?;
                writeln!(self.out, "Now at version {}", self.controller.version())?;
            }
            Command::Redo => {
                self.controller.redo()?;
                writeln!(self.out, "Now at version {}", self.controller.version())?;
            }
            Command::Versions => self.versions()?,
            Command::Diff { from, to } => {
                let diff = self.controller.diff(from, to).ok_or_else(|| {
                    anyhow!(
                        "Version out of range: history has versions 0..={}",
                        self.controller.len() - 1
                    )
                })?;
                if diff.is_empty() {
                    writeln!(self.out, "No differences")?;
                } else {
                    write!(self.out, "{}", self.palette.diff(&diff))?;
                }
            }
            Command::Status => self.status()?,
        }
        Ok(())
    }

    fn show(&mut self) -> Result<()> {
        if self.controller.attributes().next().is_none() {
            writeln!(self.out, "{}", self.palette.dimmed("(no attributes)"))?;
            return Ok(());
        }
        for (name, value) in self.controller.attributes() {
            writeln!(self.out, "{} = {}", self.palette.name(name), value)?;
        }
        Ok(())
    }

    fn versions(&mut self) -> Result<()> {
        let history = self.controller.history();
        for (index, checkpoint) in history.iter().enumerate() {
            let line = history.describe_line(index).unwrap_or_default();
            let mut rendered = if index == history.cursor() {
                self.palette.current(&line)
            } else {
                line
            };
            if self.timestamps {
                let time = util::format_absolute_time(checkpoint.ts_unix_ms);
                rendered.push_str(&format!("  {}", self.palette.dimmed(&time)));
            }
            writeln!(self.out, "{}", rendered)?;
        }
        Ok(())
    }

    fn status(&mut self) -> Result<()> {
        let current = self.controller.current();
        writeln!(
            self.out,
            "Version {} of {} (committed {})",
            self.controller.version(),
            self.controller.len() - 1,
            util::format_relative_time(current.ts_unix_ms)
        )?;

        let pending = self.controller.pending_changes();
        if pending.is_empty() {
            writeln!(self.out, "No uncommitted changes")?;
        } else {
            writeln!(self.out, "Uncommitted changes:")?;
            write!(self.out, "{}", self.palette.diff(&pending))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session<Vec<u8>> {
        let mut config = SystemConfig::default();
        config.display.color = false;
        Session::new(&config, Vec::new()).unwrap()
    }

    fn run(session: &mut Session<Vec<u8>>, script: &str) -> Result<()> {
        for (i, line) in script.lines().enumerate() {
            session.run_line(i + 1, line)?;
        }
        Ok(())
    }

    fn output(session: &Session<Vec<u8>>) -> String {
        String::from_utf8_lossy(session.output()).into_owned()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("   ").unwrap(), None);
        assert_eq!(Command::parse("# note").unwrap(), None);
        assert_eq!(
            Command::parse("set a 1").unwrap(),
            Some(Command::Set {
                name: "a".to_string(),
                value: Value::Int(1)
            })
        );
        assert_eq!(
            Command::parse("set s  \"two words\"").unwrap(),
            Some(Command::Set {
                name: "s".to_string(),
                value: Value::from("two words")
            })
        );
        assert_eq!(
            Command::parse("commit first try").unwrap(),
            Some(Command::Commit {
                label: Some("first try".to_string())
            })
        );
        assert_eq!(
            Command::parse("diff 0 2").unwrap(),
            Some(Command::Diff { from: 0, to: 2 })
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(Command::parse("frobnicate").is_err());
        assert!(Command::parse("set a").is_err());
        assert!(Command::parse("set a {oops").is_err());
        assert!(Command::parse("get").is_err());
        assert!(Command::parse("undo now").is_err());
        assert!(Command::parse("diff 1").is_err());
        assert!(Command::parse("diff one 2").is_err());
    }

    #[test]
    fn test_script_session() {
        let mut s = session();
        run(
            &mut s,
            "set a 1\ncommit\nset b 2\ncommit\nundo\nundo\nredo\nset c 3\ncommit\nversions",
        )
        .unwrap();

        assert_eq!(s.controller().version(), 2);
        let text = output(&s);
        assert!(text.ends_with("version 0: {}\nversion 1: {a: 1}\n+version 2: {a: 1, c: 3}\n"));
        assert!(text.contains("Now at version 0\n"));
    }

    #[test]
    fn test_push_isolated_from_history() {
        let mut s = session();
        run(&mut s, "set items [1]\ncommit\npush items 2\nstatus").unwrap();

        let text = output(&s);
        assert!(text.contains("~ items: [1] -> [1, 2]\n"));
        assert_eq!(
            s.controller().current().snapshot().get("items").unwrap().to_string(),
            "[1]"
        );
    }

    #[test]
    fn test_errors_report_line_number() {
        let mut s = session();
        let err = run(&mut s, "set a 1\n\nundo").unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.starts_with("line 3"), "unexpected: {}", message);
        assert!(message.contains("no earlier checkpoint"), "unexpected: {}", message);

        let err = s.run_line(7, "push a 2").unwrap_err();
        assert!(format!("{:#}", err).contains("not a list"));
    }

    #[test]
    fn test_versions_with_timestamps_and_multiline_label() {
        let mut config = SystemConfig::default();
        config.display.color = false;
        config.display.timestamps = true;
        let mut s = Session::new(&config, Vec::new()).unwrap();

        s.run_line(1, "set a 1").unwrap();
        s.controller.commit_labeled("first\nsecond");
        s.run_line(3, "versions").unwrap();

        let text = output(&s);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("version 0: {}  "));
        assert!(lines[1].starts_with("+version 1: {a: 1} [first second]  "));
        for line in lines {
            let stamp = line.rsplit("  ").next().unwrap();
            assert_eq!(stamp.len(), "2024-01-03 14:30:00".len(), "line: {:?}", line);
        }
    }

    #[test]
    fn test_get_show_and_diff() {
        let mut s = session();
        run(&mut s, "show\nset a 1\nset _tmp true\nget _tmp\ncommit\nset a 2\ncommit\ndiff 1 2\ndel a\nshow").unwrap();

        let text = output(&s);
        assert!(text.starts_with("(no attributes)\n"));
        assert!(text.contains("_tmp = true\n"));
        assert!(text.contains("~ a: 1 -> 2\n"));
        assert!(s.run_line(1, "diff 0 9").is_err());
        assert!(s.run_line(1, "del a").is_err());
    }
}
