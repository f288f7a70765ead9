//! Release configuration CLI commands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use super::{locate, OutputFormat};
use crate::discovery::discover_release;
use crate::release::{
    Channel, CommitAnalyzerOptions, CommitFacts, DecisionSource, Prerelease, ReleaseConfig,
};

/// Release configuration operations.
#[derive(Parser)]
pub struct ReleaseCommand {
    /// Release subcommand to execute.
    #[command(subcommand)]
    pub command: ReleaseSubcommands,
}

/// Release subcommands.
#[derive(Subcommand)]
pub enum ReleaseSubcommands {
    /// Prints the normalized configuration.
    Show(ShowCommand),
    /// Prints the release level a commit would trigger.
    Bump(BumpCommand),
    /// Reports whether a branch is release-eligible.
    Branch(BranchCommand),
}

/// Show command options.
#[derive(Parser)]
pub struct ShowCommand {
    /// Configuration file; discovered from the working directory when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

/// Bump command options.
#[derive(Parser)]
pub struct BumpCommand {
    /// Conventional commit type, e.g. `feat` or `fix`.
    #[arg(long = "type", value_name = "TYPE")]
    pub commit_type: String,

    /// Commit scope.
    #[arg(long)]
    pub scope: Option<String>,

    /// Treat the commit as a breaking change.
    #[arg(long)]
    pub breaking: bool,

    /// Treat the commit as a revert.
    #[arg(long)]
    pub revert: bool,

    /// Configuration file; discovered from the working directory when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Branch command options.
#[derive(Parser)]
pub struct BranchCommand {
    /// Branch to check; defaults to the current git branch.
    pub name: Option<String>,

    /// Configuration file; discovered from the working directory when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl ReleaseCommand {
    /// Executes the release command.
    pub fn execute(self) -> Result<()> {
        match self.command {
            ReleaseSubcommands::Show(show_cmd) => show_cmd.execute(),
            ReleaseSubcommands::Bump(bump_cmd) => bump_cmd.execute(),
            ReleaseSubcommands::Branch(branch_cmd) => branch_cmd.execute(),
        }
    }
}

fn load(explicit: Option<PathBuf>) -> Result<ReleaseConfig> {
    let path = locate(explicit, discover_release)?;
    ReleaseConfig::load(&path).with_context(|| format!("Failed to load {}", path.display()))
}

impl ShowCommand {
    /// Executes the show command.
    pub fn execute(self) -> Result<()> {
        let config = load(self.config)?;
        println!("{}", self.format.render(&config)?.trim_end());
        Ok(())
    }
}

impl BumpCommand {
    /// Executes the bump command.
    pub fn execute(self) -> Result<()> {
        let config = load(self.config)?;
        let facts = CommitFacts {
            commit_type: self.commit_type,
            scope: self.scope,
            breaking: self.breaking,
            revert: self.revert,
        };
        let defaults = CommitAnalyzerOptions::default();
        let analyzer = config.commit_analyzer().unwrap_or(&defaults);
        let decision = analyzer.release_type(&facts);

        let level = decision
            .release
            .map_or_else(|| "none".to_string(), |release| release.to_string());
        match decision.source {
            DecisionSource::ReleaseRule(index) => {
                println!("{level} (releaseRules[{index}])");
            }
            DecisionSource::Preset => println!("{level} (preset {})", analyzer.preset()),
        }
        Ok(())
    }
}

impl BranchCommand {
    /// Executes the branch command.
    pub fn execute(self) -> Result<()> {
        let config = load(self.config)?;
        let name = match self.name {
            Some(name) => name,
            None => crate::git::current_branch(".")?,
        };

        let Some(branch) = config.branch_for(&name) else {
            anyhow::bail!("Branch '{name}' is not release-eligible");
        };
        let mut line = format!("{name}: release-eligible (matches '{}')", branch.name);
        match &branch.channel {
            Some(Channel::Named(channel)) => line.push_str(&format!(", channel {channel}")),
            Some(Channel::Default) => line.push_str(", default channel"),
            None => {}
        }
        match &branch.prerelease {
            Some(Prerelease::Id(id)) => line.push_str(&format!(", prerelease {id}")),
            Some(Prerelease::Flag(true)) => line.push_str(&format!(", prerelease {name}")),
            _ => {}
        }
        println!("{line}");
        Ok(())
    }
}
