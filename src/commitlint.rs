//! Commit-lint configuration: base rulesets to extend plus rule definitions.

pub mod preset;
pub mod resolve;
pub mod rule;

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{kind_of, ConfigError, Result};
use crate::source::{self, DocumentFormat};

pub use resolve::ResolvedCommitLint;
pub use rule::{Applicability, CaseStyle, RuleConfig, RuleEntry, Severity};

/// A loaded commit-lint configuration.
///
/// Constructed once by [`CommitLintConfig::load`] and passed by reference to
/// whatever needs it; nothing in this crate keeps a process-wide copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommitLintConfig {
    /// Base rulesets, applied in order before the local rules.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<String>,
    /// Local rule definitions, in declaration order.
    pub rules: IndexMap<String, RuleEntry>,
    /// Other top-level settings (`helpUrl`, `parserPreset`, ...), kept as written.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// File the configuration was read from.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl CommitLintConfig {
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
        let mut config = Self::default();

        for (key, value) in source::root_object(document)? {
            match key.as_str() {
                "extends" => config.extends = source::string_list(&value, "extends")?,
                "rules" => config.rules = parse_rules(&value)?,
                _ => {
                    config.extra.insert(key, value);
                }
            }
        }

        tracing::debug!(
            extends = config.extends.len(),
            rules = config.rules.len(),
            "loaded commit-lint configuration"
        );
        Ok(config)
    }

    /// Returns the local definition of `name`, ignoring `extends`.
    pub fn rule(&self, name: &str) -> Option<&RuleEntry> {
        self.rules.get(name)
    }

    /// Directory that relative `extends` paths are resolved against.
    pub fn base_dir(&self) -> PathBuf {
        self.source
            .as_deref()
            .and_then(Path::parent)
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    }

    /// Serializes to the canonical JSON form.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::syntax(e.to_string()))
    }
}

fn parse_rules(value: &Value) -> Result<IndexMap<String, RuleEntry>> {
    let rules = value.as_object().ok_or_else(|| {
        ConfigError::parse(
            "rules",
            format!(
                "expected a mapping of rule names, found {}",
                kind_of(value)
            ),
        )
    })?;

    rules
        .iter()
        .map(|(name, raw)| RuleEntry::parse(name, raw).map(|entry| (name.clone(), entry)))
        .collect()
}
