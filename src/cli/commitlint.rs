//! Commit-lint configuration CLI commands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use super::{locate, OutputFormat};
use crate::commitlint::CommitLintConfig;
use crate::discovery::discover_commitlint;

/// Commit-lint configuration operations.
#[derive(Parser)]
pub struct CommitlintCommand {
    /// Commit-lint subcommand to execute.
    #[command(subcommand)]
    pub command: CommitlintSubcommands,
}

/// Commit-lint subcommands.
#[derive(Subcommand)]
pub enum CommitlintSubcommands {
    /// Prints the normalized configuration.
    Show(ShowCommand),
}

/// Show command options.
#[derive(Parser)]
pub struct ShowCommand {
    /// Configuration file; discovered from the working directory when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the effective rules after resolving `extends`.
    #[arg(long)]
    pub resolved: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

impl CommitlintCommand {
    /// Executes the commitlint command.
    pub fn execute(self) -> Result<()> {
        match self.command {
            CommitlintSubcommands::Show(show_cmd) => show_cmd.execute(),
        }
    }
}

impl ShowCommand {
    /// Executes the show command.
    pub fn execute(self) -> Result<()> {
        let path = locate(self.config, discover_commitlint)?;
        let config = CommitLintConfig::load(&path)
            .with_context(|| format!("Failed to load {}", path.display()))?;

        let output = if self.resolved {
            let resolved = config
                .resolve()
                .with_context(|| format!("Failed to resolve extends of {}", path.display()))?;
            self.format.render(&resolved)?
        } else {
            self.format.render(&config)?
        };
        println!("{}", output.trim_end());
        Ok(())
    }
}
