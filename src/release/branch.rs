//! Release-eligible branch entries.

use globset::{GlobBuilder, GlobMatcher};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::{kind_of, ConfigError, Result};

/// Whether a branch publishes prereleases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Prerelease {
    /// `true` uses the branch name as the prerelease identifier.
    Flag(bool),
    /// Explicit prerelease identifier.
    Id(String),
}

/// Distribution channel a branch publishes on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Channel {
    /// `channel: false`: the registry's default channel.
    Default,
    /// A named channel.
    Named(String),
}

impl Channel {
    /// The channel name, or `None` for the default channel.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Default => None,
            Self::Named(name) => Some(name),
        }
    }
}

impl Serialize for Channel {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Default => serializer.serialize_bool(false),
            Self::Named(name) => serializer.serialize_str(name),
        }
    }
}

/// One entry of `branches`.
#[derive(Debug, Clone)]
pub struct BranchSpec {
    /// Branch name or glob pattern.
    pub name: String,
    /// Distribution channel to publish on; `None` when not configured.
    pub channel: Option<Channel>,
    /// Prerelease setting.
    pub prerelease: Option<Prerelease>,
    /// `name` compiled once; `None` when it is not a valid glob.
    matcher: Option<GlobMatcher>,
}

impl PartialEq for BranchSpec {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.channel == other.channel
            && self.prerelease == other.prerelease
    }
}

impl Eq for BranchSpec {}

impl BranchSpec {
    /// A plain branch name or pattern.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            matcher: compile(&name).ok(),
            name,
            channel: None,
            prerelease: None,
        }
    }

    /// A branch that publishes prereleases under its own name.
    pub fn prerelease(name: impl Into<String>) -> Self {
        Self {
            prerelease: Some(Prerelease::Flag(true)),
            ..Self::named(name)
        }
    }

    /// Validates one raw branch entry.
    pub fn parse(value: &Value, field: &str) -> Result<Self> {
        let (name, channel, prerelease) = match value {
            Value::String(name) => (name.clone(), None, None),
            Value::Object(map) => {
                let name = map
                    .get("name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        ConfigError::parse(format!("{field}.name"), "branch object needs a string `name`")
                    })?
                    .to_string();
                let channel = match map.get("channel") {
                    None | Some(Value::Null) => None,
                    Some(Value::Bool(false)) => Some(Channel::Default),
                    Some(Value::String(channel)) => Some(Channel::Named(channel.clone())),
                    Some(other) => {
                        return Err(ConfigError::parse(
                            format!("{field}.channel"),
                            format!("expected a string or false, found {}", kind_of(other)),
                        ))
                    }
                };
                let prerelease = match map.get("prerelease") {
                    None | Some(Value::Null) => None,
                    Some(Value::Bool(flag)) => Some(Prerelease::Flag(*flag)),
                    Some(Value::String(id)) => Some(Prerelease::Id(id.clone())),
                    Some(other) => {
                        return Err(ConfigError::parse(
                            format!("{field}.prerelease"),
                            format!("expected a boolean or a string, found {}", kind_of(other)),
                        ))
                    }
                };
                (name, channel, prerelease)
            }
            _ => {
                return Err(ConfigError::parse(
                    field,
                    format!("expected a branch name or object, found {}", kind_of(value)),
                ))
            }
        };

        if name.is_empty() {
            return Err(ConfigError::parse(field, "branch name is empty"));
        }
        let matcher = compile(&name)
            .map_err(|e| ConfigError::parse(field, format!("invalid branch pattern: {e}")))?;
        Ok(Self {
            name,
            channel,
            prerelease,
            matcher: Some(matcher),
        })
    }

    /// Whether `branch` is covered by this entry's name pattern.
    pub fn matches(&self, branch: &str) -> bool {
        match &self.matcher {
            Some(matcher) => matcher.is_match(branch),
            None => self.name == branch,
        }
    }

    /// The configured channel name, if any.
    pub fn channel_name(&self) -> Option<&str> {
        self.channel.as_ref().and_then(Channel::name)
    }

    /// Whether this entry publishes prereleases.
    pub fn is_prerelease(&self) -> bool {
        matches!(self.prerelease, Some(Prerelease::Flag(true) | Prerelease::Id(_)))
    }

    fn is_plain(&self) -> bool {
        self.channel.is_none() && self.prerelease.is_none()
    }
}

impl Serialize for BranchSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        if self.is_plain() {
            return serializer.serialize_str(&self.name);
        }
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("name", &self.name)?;
        if let Some(channel) = &self.channel {
            map.serialize_entry("channel", channel)?;
        }
        if let Some(prerelease) = &self.prerelease {
            map.serialize_entry("prerelease", prerelease)?;
        }
        map.end()
    }
}

/// Branches used when a configuration omits `branches`.
pub fn default_branches() -> Vec<BranchSpec> {
    vec![
        BranchSpec::named("[0-9]*.x"),
        BranchSpec::named("master"),
        BranchSpec::named("main"),
        BranchSpec::named("next"),
        BranchSpec::named("next-major"),
        BranchSpec::prerelease("beta"),
        BranchSpec::prerelease("alpha"),
    ]
}

/// `*` and `?` stop at `/`, like the release tool's own matcher.
fn compile(pattern: &str) -> std::result::Result<GlobMatcher, globset::Error> {
    Ok(GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()?
        .compile_matcher())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_string_and_object_forms() {
        assert_eq!(
            BranchSpec::parse(&json!("main"), "branches[0]").unwrap(),
            BranchSpec::named("main")
        );
        let beta = BranchSpec::parse(
            &json!({ "name": "beta", "channel": "beta", "prerelease": true }),
            "branches[1]",
        )
        .unwrap();
        assert_eq!(beta.channel_name(), Some("beta"));
        assert!(beta.is_prerelease());

        let rc = BranchSpec::parse(&json!({ "name": "next", "prerelease": "rc" }), "b").unwrap();
        assert_eq!(rc.prerelease, Some(Prerelease::Id("rc".to_string())));
    }

    #[test]
    fn rejects_malformed_entries() {
        let err = BranchSpec::parse(&json!(3), "branches[2]").unwrap_err();
        assert_eq!(err.field(), Some("branches[2]"));

        let err = BranchSpec::parse(&json!({ "channel": "x" }), "branches[0]").unwrap_err();
        assert_eq!(err.field(), Some("branches[0].name"));

        let err = BranchSpec::parse(&json!({ "name": "n", "prerelease": 1 }), "branches[0]")
            .unwrap_err();
        assert_eq!(err.field(), Some("branches[0].prerelease"));

        assert!(BranchSpec::parse(&json!("release/[a-"), "branches[0]").is_err());
    }

    #[test]
    fn glob_patterns_match_branch_names() {
        let maintenance = BranchSpec::named("[0-9]*.x");
        assert!(maintenance.matches("1.x"));
        assert!(maintenance.matches("1.2.x"));
        assert!(!maintenance.matches("main"));

        let releases = BranchSpec::named("release/*");
        assert!(releases.matches("release/2024"));
        assert!(!releases.matches("release/2024/hotfix"));

        assert!(BranchSpec::named("main").matches("main"));
        assert!(!BranchSpec::named("main").matches("maintenance"));
    }

    #[test]
    fn serializes_plain_entries_as_strings() {
        assert_eq!(serde_json::to_value(BranchSpec::named("main")).unwrap(), json!("main"));
        assert_eq!(
            serde_json::to_value(BranchSpec::prerelease("beta")).unwrap(),
            json!({ "name": "beta", "prerelease": true })
        );
    }

    #[test]
    fn channel_false_is_kept_apart_from_absent() {
        let default = BranchSpec::parse(&json!({ "name": "main", "channel": false }), "b").unwrap();
        assert_eq!(default.channel, Some(Channel::Default));
        assert_eq!(default.channel_name(), None);
        assert_eq!(
            serde_json::to_value(&default).unwrap(),
            json!({ "name": "main", "channel": false })
        );

        let absent = BranchSpec::parse(&json!({ "name": "main", "channel": null }), "b").unwrap();
        assert_eq!(absent.channel, None);
        assert_eq!(serde_json::to_value(&absent).unwrap(), json!("main"));
        assert_ne!(default, absent);
    }

    #[test]
    fn parsed_and_named_entries_match_alike() {
        let parsed = BranchSpec::parse(&json!("release/*"), "b").unwrap();
        let named = BranchSpec::named("release/*");
        assert_eq!(parsed, named);
        for branch in ["release/1", "release/1/x", "main"] {
            assert_eq!(parsed.matches(branch), named.matches(branch), "{branch}");
        }
    }

    #[test]
    fn invalid_pattern_built_directly_matches_literally() {
        let spec = BranchSpec::named("release/[a-");
        assert!(spec.matches("release/[a-"));
        assert!(!spec.matches("release/a"));
    }

    #[test]
    fn defaults_include_prerelease_channels() {
        let defaults = default_branches();
        assert!(defaults.iter().any(|b| b.name == "main" && !b.is_prerelease()));
        assert!(defaults.iter().any(|b| b.name == "beta" && b.is_prerelease()));
    }
}
