//! Release pipeline plugin entries.

use serde::ser::SerializeTuple;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use super::analyzer::{CommitAnalyzerOptions, ReleaseNotesOptions};
use crate::error::{kind_of, ConfigError, Result};

/// Commit analysis stage.
pub const COMMIT_ANALYZER: &str = "@semantic-release/commit-analyzer";
/// Release notes stage.
pub const RELEASE_NOTES_GENERATOR: &str = "@semantic-release/release-notes-generator";
/// npm publishing stage.
pub const NPM: &str = "@semantic-release/npm";
/// GitHub release stage.
pub const GITHUB: &str = "@semantic-release/github";

/// Per-plugin options, typed for the stages whose options this crate knows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PluginOptions {
    /// Options of [`COMMIT_ANALYZER`].
    CommitAnalyzer(CommitAnalyzerOptions),
    /// Options of [`RELEASE_NOTES_GENERATOR`].
    ReleaseNotes(ReleaseNotesOptions),
    /// Options of any other plugin.
    Opaque(Map<String, Value>),
}

impl PluginOptions {
    fn parse(id: &str, options: &Map<String, Value>, field: &str) -> Result<Self> {
        Ok(match id {
            COMMIT_ANALYZER => Self::CommitAnalyzer(CommitAnalyzerOptions::parse(options, field)?),
            RELEASE_NOTES_GENERATOR => {
                Self::ReleaseNotes(ReleaseNotesOptions::parse(options, field)?)
            }
            _ => Self::Opaque(options.clone()),
        })
    }

    fn is_empty(&self) -> bool {
        match self {
            Self::CommitAnalyzer(options) => *options == CommitAnalyzerOptions::default(),
            Self::ReleaseNotes(options) => *options == ReleaseNotesOptions::default(),
            Self::Opaque(options) => options.is_empty(),
        }
    }
}

/// One stage of the release pipeline.
///
/// A bare identifier and the pair `[identifier, {}]` load to the same value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginEntry {
    /// Package identifier of the plugin.
    pub id: String,
    /// Options passed to the plugin.
    pub options: PluginOptions,
}

impl PluginEntry {
    /// An entry with empty options.
    pub fn bare(id: &str) -> Result<Self> {
        Self::with_options(id, &Map::new(), "plugins")
    }

    /// Validates one raw plugin entry.
    pub fn parse(value: &Value, field: &str) -> Result<Self> {
        match value {
            Value::String(id) => Self::with_options(id, &Map::new(), field),
            Value::Array(items) => match items.as_slice() {
                [Value::String(id), Value::Object(options)] => {
                    Self::with_options(id, options, &format!("{field}[1]"))
                }
                [Value::String(_), other] => Err(ConfigError::parse(
                    format!("{field}[1]"),
                    format!("expected an options object, found {}", kind_of(other)),
                )),
                [other, _] => Err(ConfigError::parse(
                    format!("{field}[0]"),
                    format!("expected a plugin identifier, found {}", kind_of(other)),
                )),
                _ => Err(ConfigError::parse(
                    field,
                    format!(
                        "expected a [plugin, options] pair, found {} elements",
                        items.len()
                    ),
                )),
            },
            _ => Err(ConfigError::parse(
                field,
                format!(
                    "expected a plugin identifier or a [plugin, options] pair, found {}",
                    kind_of(value)
                ),
            )),
        }
    }

    fn with_options(id: &str, options: &Map<String, Value>, field: &str) -> Result<Self> {
        if id.is_empty() {
            return Err(ConfigError::parse(field, "plugin identifier is empty"));
        }
        Ok(Self {
            id: id.to_string(),
            options: PluginOptions::parse(id, options, field)?,
        })
    }

    /// Analyzer options, when this is the commit-analyzer stage.
    pub fn commit_analyzer(&self) -> Option<&CommitAnalyzerOptions> {
        match &self.options {
            PluginOptions::CommitAnalyzer(options) => Some(options),
            _ => None,
        }
    }
}

impl Serialize for PluginEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.options.is_empty() {
            return serializer.serialize_str(&self.id);
        }
        let mut pair = serializer.serialize_tuple(2)?;
        pair.serialize_element(&self.id)?;
        pair.serialize_element(&self.options)?;
        pair.end()
    }
}

/// Plugins used when a configuration omits `plugins`.
pub fn default_plugins() -> Result<Vec<PluginEntry>> {
    [COMMIT_ANALYZER, RELEASE_NOTES_GENERATOR, NPM, GITHUB]
        .into_iter()
        .map(PluginEntry::bare)
        .collect()
}
