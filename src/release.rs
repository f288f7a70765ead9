//! Release configuration: eligible branches plus the ordered plugin pipeline.

pub mod analyzer;
pub mod branch;
pub mod plugin;

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{kind_of, ConfigError, Result};
use crate::source::{self, DocumentFormat};

pub use analyzer::{
    CommitAnalyzerOptions, CommitFacts, DecisionSource, ParserOptions, ReleaseDecision,
    ReleaseRule, ReleaseType, RuleRelease,
};
pub use branch::{BranchSpec, Channel, Prerelease};
pub use plugin::{PluginEntry, PluginOptions};

/// Tag format used when `tagFormat` is omitted.
pub const DEFAULT_TAG_FORMAT: &str = "v${version}";

/// A loaded release configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseConfig {
    /// Release-eligible branches, in priority order.
    pub branches: Vec<BranchSpec>,
    /// Pipeline stages, in execution order.
    pub plugins: Vec<PluginEntry>,
    /// Git tag template; must contain `${version}`.
    pub tag_format: String,
    /// Repository to publish to; defaults to the git remote.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_url: Option<String>,
    /// Skip publishing steps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
    /// Require a CI environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ci: Option<bool>,
    /// Shared plugin options, kept as written.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// File the configuration was read from.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl ReleaseConfig {
    /// Loads and validates a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let document = source::read_document(path)?;
        let mut config = Self::from_value(&document)?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parses configuration text in the given format.
    pub fn parse_str(text: &str, format: DocumentFormat) -> Result<Self> {
        Self::from_value(&source::parse_document(text, format)?)
    }

    /// Validates a raw document.
    pub fn from_value(document: &Value) -> Result<Self> {
        let mut branches = None;
        let mut plugins = None;
        let mut tag_format = None;
        let mut repository_url = None;
        let mut dry_run = None;
        let mut ci = None;
        let mut extra = Map::new();

        for (key, value) in source::root_object(document)? {
            match key.as_str() {
                "branches" => branches = Some(parse_branches(&value)?),
                "plugins" => plugins = Some(parse_plugins(&value)?),
                "tagFormat" => tag_format = Some(parse_tag_format(&value)?),
                "repositoryUrl" => repository_url = Some(expect_string(&value, "repositoryUrl")?),
                "dryRun" => dry_run = Some(expect_bool(&value, "dryRun")?),
                "ci" => ci = Some(expect_bool(&value, "ci")?),
                _ => {
                    extra.insert(key, value);
                }
            }
        }

        let config = Self {
            branches: branches.unwrap_or_else(branch::default_branches),
            plugins: match plugins {
                Some(plugins) => plugins,
                None => plugin::default_plugins()?,
            },
            tag_format: tag_format.unwrap_or_else(|| DEFAULT_TAG_FORMAT.to_string()),
            repository_url,
            dry_run,
            ci,
            extra,
            source: None,
        };
        debug!(
            branches = config.branches.len(),
            plugins = config.plugins.len(),
            "loaded release configuration"
        );
        Ok(config)
    }

    /// Returns the first branch entry covering `name`.
    pub fn branch_for(&self, name: &str) -> Option<&BranchSpec> {
        self.branches.iter().find(|branch| branch.matches(name))
    }

    /// Returns the entry for plugin `id`.
    pub fn plugin(&self, id: &str) -> Option<&PluginEntry> {
        self.plugins.iter().find(|entry| entry.id == id)
    }

    /// Analyzer options of the pipeline's commit-analyzer stage.
    pub fn commit_analyzer(&self) -> Option<&CommitAnalyzerOptions> {
        self.plugins.iter().find_map(PluginEntry::commit_analyzer)
    }

    /// Serializes to the canonical JSON form.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::syntax(e.to_string()))
    }
}

fn parse_branches(value: &Value) -> Result<Vec<BranchSpec>> {
    let entries: Vec<BranchSpec> = match value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| BranchSpec::parse(item, &format!("branches[{i}]")))
            .collect::<Result<_>>()?,
        Value::String(_) | Value::Object(_) => vec![BranchSpec::parse(value, "branches")?],
        _ => {
            return Err(ConfigError::parse(
                "branches",
                format!("expected a list of branches, found {}", kind_of(value)),
            ))
        }
    };

    for (i, entry) in entries.iter().enumerate() {
        if entries[..i].iter().any(|earlier| earlier.name == entry.name) {
            return Err(ConfigError::parse(
                format!("branches[{i}]"),
                format!("duplicate branch `{}`", entry.name),
            ));
        }
    }
    Ok(entries)
}

fn parse_plugins(value: &Value) -> Result<Vec<PluginEntry>> {
    let items = value.as_array().ok_or_else(|| {
        ConfigError::parse(
            "plugins",
            format!("expected a list of plugins, found {}", kind_of(value)),
        )
    })?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| PluginEntry::parse(item, &format!("plugins[{i}]")))
        .collect()
}

fn parse_tag_format(value: &Value) -> Result<String> {
    let format = expect_string(value, "tagFormat")?;
    if !format.contains("${version}") {
        return Err(ConfigError::parse(
            "tagFormat",
            format!("`{format}` must contain ${{version}}"),
        ));
    }
    Ok(format)
}

fn expect_string(value: &Value, field: &str) -> Result<String> {
    value.as_str().map(str::to_string).ok_or_else(|| {
        ConfigError::parse(field, format!("expected a string, found {}", kind_of(value)))
    })
}

fn expect_bool(value: &Value, field: &str) -> Result<bool> {
    value.as_bool().ok_or_else(|| {
        ConfigError::parse(field, format!("expected a boolean, found {}", kind_of(value)))
    })
}
