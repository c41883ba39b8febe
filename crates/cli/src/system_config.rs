//! System-wide configuration for the `tl` binary
//!
//! Stored as TOML at `<config dir>/timeline/config.toml`. A missing file
//! yields the defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use timeline_debug::DebugConfig;

/// Every key accepted by `tl config get/set`
pub const KEYS: &[&str] = &[
    "debug.textual",
    "debug.categories",
    "debug.show_file",
    "debug.show_line",
    "display.color",
    "display.timestamps",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SystemConfig {
    pub debug: DebugConfig,
    pub display: DisplayConfig,
}

/// Terminal rendering options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    /// Colorize session output
    pub color: bool,
    /// Append commit times to `versions` output
    pub timestamps: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: true,
            timestamps: false,
        }
    }
}

impl SystemConfig {
    /// Read a single value by dotted key
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "debug.textual" => self.debug.textual.to_string(),
            "debug.categories" => self.debug.categories.join(","),
            "debug.show_file" => self.debug.show_file.to_string(),
            "debug.show_line" => self.debug.show_line.to_string(),
            "display.color" => self.display.color.to_string(),
            "display.timestamps" => self.display.timestamps.to_string(),
            _ => anyhow::bail!(
                "Unknown config key: {}. Use 'tl config list' to see available keys.",
                key
            ),
        };
        Ok(value)
    }

    /// Set a single value by dotted key
    ///
    /// `debug.categories` takes a comma-separated list; an empty string clears it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "debug.textual" => self.debug.textual = parse_bool(value)?,
            "debug.categories" => {
                self.debug.categories = value
                    .split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            "debug.show_file" => self.debug.show_file = parse_bool(value)?,
            "debug.show_line" => self.debug.show_line = parse_bool(value)?,
            "display.color" => self.display.color = parse_bool(value)?,
            "display.timestamps" => self.display.timestamps = parse_bool(value)?,
            _ => anyhow::bail!(
                "Unknown config key: {}. Use 'tl config list' to see available keys.",
                key
            ),
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    value
        .parse()
        .with_context(|| format!("Invalid value '{}': must be 'true' or 'false'", value))
}

/// Default location of the config file
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("timeline").join("config.toml"))
}

/// Use `explicit` when given, otherwise the default location
pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => config_file_path().context("Could not determine config file path"),
    }
}

/// Load the config, falling back to defaults when the file does not exist
pub fn load_from(path: &Path) -> Result<SystemConfig> {
    if !path.exists() {
        return Ok(SystemConfig::default());
    }

    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&text)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// Write the config, creating parent directories as needed
pub fn save_to(config: &SystemConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let text = toml::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}

/// Annotated config with every key at a useful value
pub fn example_config() -> &'static str {
    r#"# Timeline configuration

[debug]
# Print session debugger output to stderr
textual = false
# Only calls tagged with one of these categories are shown
categories = ["session"]
# Tag lines with the caller's file name and line number
show_file = false
show_line = false

[display]
color = true
# Append commit times to `versions`
timestamps = false
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_from(&temp.path().join("absent.toml")).unwrap();
        assert_eq!(config, SystemConfig::default());
        assert!(config.display.color);
        assert!(!config.debug.textual);
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        let mut config = SystemConfig::default();
        config.set("debug.textual", "true").unwrap();
        config.set("debug.categories", "session, io").unwrap();
        save_to(&config, &path).unwrap();

        let loaded = load_from(&path).unwrap();
        assert!(loaded.debug.textual);
        assert_eq!(loaded.get("debug.categories").unwrap(), "session,io");
    }

    #[test]
    fn test_example_config_parses() {
        let config: SystemConfig = toml::from_str(example_config()).unwrap();
        assert_eq!(config.debug.categories, vec!["session".to_string()]);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let mut config = SystemConfig::default();
        assert!(config.get("display.width").is_err());
        assert!(config.set("gc.retain_count", "5").is_err());
        assert!(config.set("display.color", "maybe").is_err());
        assert!(toml::from_str::<SystemConfig>("[display]\nwidth = 3").is_err());
    }

    #[test]
    fn test_every_key_is_readable() {
        let config = SystemConfig::default();
        for key in KEYS {
            assert!(config.get(key).is_ok(), "key {} not readable", key);
        }
    }
}
