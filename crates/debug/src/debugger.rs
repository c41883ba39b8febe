//! Structured console debugger with nested timing regions

use crate::{CallerLocation, DebugConfig, DebugError, Result};
use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Description of the region opened on construction
pub const INIT_REGION: &str = "Debugger init";

/// Console debugger
///
/// Lines are indented by one tab per open region. `log` reports the time
/// elapsed since the innermost open region started; `log_end` reports the
/// lifetime of the region it closes. A region named [`INIT_REGION`] is opened
/// on construction, and any regions still open are closed on drop.
///
/// Regions are tracked even when output is disabled or filtered out.
pub struct Debugger<W: Write = io::Stdout> {
    config: DebugConfig,
    /// Open regions, outermost first
    regions: Vec<Region>,
    writer: W,
}

struct Region {
    desc: String,
    started: Instant,
}

impl Debugger<io::Stdout> {
    /// Create a debugger writing to stdout
    #[track_caller]
    pub fn new(config: DebugConfig) -> Result<Self> {
        Self::with_writer(config, io::stdout())
    }
}

impl<W: Write> Debugger<W> {
    /// Create a debugger writing to `writer`
    #[track_caller]
    pub fn with_writer(config: DebugConfig, writer: W) -> Result<Self> {
        let location = CallerLocation::caller();
        let mut debugger = Self {
            config,
            regions: Vec::new(),
            writer,
        };
        debugger.open_region(INIT_REGION, &[], location)?;
        Ok(debugger)
    }

    /// Log an event with the time since the innermost open region started
    #[track_caller]
    pub fn log(&mut self, desc: &str, categories: &[&str]) -> Result<()> {
        let location = CallerLocation::caller();
        let elapsed = self.regions.last().map(|region| region.started.elapsed());
        if self.config.accepts(categories) {
            self.emit(self.regions.len(), location, desc, elapsed)?;
        }
        Ok(())
    }

    /// Open a named region; later lines are indented one level deeper
    #[track_caller]
    pub fn log_start(&mut self, desc: &str, categories: &[&str]) -> Result<()> {
        let location = CallerLocation::caller();
        self.open_region(desc, categories, location)
    }

    /// Close the innermost region and report how long it was open
    #[track_caller]
    pub fn log_end(&mut self, categories: &[&str]) -> Result<()> {
        let location = CallerLocation::caller();
        let region = self
            .regions
            .pop()
            .ok_or(DebugError::NoOpenRegion { location })?;

        if self.config.accepts(categories) {
            let message = format!("{} ended", region.desc);
            self.emit(
                self.regions.len(),
                location,
                &message,
                Some(region.started.elapsed()),
            )?;
        }
        Ok(())
    }

    /// Number of open regions
    pub fn depth(&self) -> usize {
        self.regions.len()
    }

    pub fn config(&self) -> &DebugConfig {
        &self.config
    }

    /// The output sink
    pub fn writer(&self) -> &W {
        &self.writer
    }

    fn open_region(
        &mut self,
        desc: &str,
        categories: &[&str],
        location: CallerLocation,
    ) -> Result<()> {
        if self.config.accepts(categories) {
            let message = format!("{} started", desc);
            self.emit(self.regions.len(), location, &message, None)?;
        }
        self.regions.push(Region {
            desc: desc.to_string(),
            started: Instant::now(),
        });
        Ok(())
    }

    fn emit(
        &mut self,
        depth: usize,
        location: CallerLocation,
        message: &str,
        elapsed: Option<Duration>,
    ) -> Result<()> {
        if !self.config.textual {
            return Ok(());
        }

        let line = format_line(
            depth,
            &location.tag(self.config.show_file, self.config.show_line),
            message,
            elapsed,
        );
        tracing::debug!(depth, location = %location, "{}", line.trim_start());
        writeln!(self.writer, "{}", line)?;
        Ok(())
    }
}

impl<W: Write> Drop for Debugger<W> {
    fn drop(&mut self) {
        let location = CallerLocation::caller();
        while let Some(region) = self.regions.pop() {
            let message = format!("{} ended", region.desc);
            let depth = self.regions.len();
            if let Err(e) = self.emit(depth, location, &message, Some(region.started.elapsed())) {
                tracing::warn!("Failed to close debugger region: {}", e);
                break;
            }
        }
        let _ = self.writer.flush();
    }
}

/// Tabs for depth, then the non-empty parts among tag, message and time
fn format_line(depth: usize, tag: &str, message: &str, elapsed: Option<Duration>) -> String {
    let time = elapsed.map(|d| format!("time = {:.4}", d.as_secs_f64()));
    let parts: Vec<&str> = [Some(tag), Some(message), time.as_deref()]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect();

    format!("{}{}", "\t".repeat(depth), parts.join(" "))
}
