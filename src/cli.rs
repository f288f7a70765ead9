//! CLI interface for conventional-config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

pub mod check;
pub mod commitlint;
pub mod release;

/// conventional-config: inspects commit-lint and release configuration.
#[derive(Parser)]
#[command(name = "conventional-config")]
#[command(about = "Loads and validates commit-lint and release configuration", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The main command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Main command categories.
#[derive(Subcommand)]
pub enum Commands {
    /// Commit-lint configuration operations.
    Commitlint(commitlint::CommitlintCommand),
    /// Release configuration operations.
    Release(release::ReleaseCommand),
    /// Discovers and validates both configuration documents.
    Check(check::CheckCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Commitlint(cmd) => cmd.execute(),
            Commands::Release(cmd) => cmd.execute(),
            Commands::Check(cmd) => cmd.execute(),
        }
    }
}

/// Output format for printed configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// YAML format.
    #[default]
    Yaml,
    /// JSON format.
    Json,
}

impl OutputFormat {
    /// Renders `value` in this format.
    pub fn render<T: Serialize>(self, value: &T) -> Result<String> {
        match self {
            Self::Json => {
                serde_json::to_string_pretty(value).context("Failed to serialize to JSON")
            }
            Self::Yaml => serde_yaml::to_string(value).context("Failed to serialize to YAML"),
        }
    }
}

/// Uses `explicit` when given, otherwise discovers from the working directory.
fn locate(
    explicit: Option<PathBuf>,
    discover: fn(&Path) -> crate::Result<PathBuf>,
) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    discover(&cwd).context("No configuration file found")
}
