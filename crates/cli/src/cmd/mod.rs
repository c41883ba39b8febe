//! CLI command implementations

pub mod config;
pub mod repl;
pub mod run;
