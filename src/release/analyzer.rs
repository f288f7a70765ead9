//! Options of the commit-analyzer and release-notes-generator stages.
//!
//! The analyzer decides the release level of a commit from its type, scope
//! and breaking flag. Custom `releaseRules` are consulted first, in listed
//! order, and the first matching rule wins; when none matches, the preset's
//! default rules apply. Parsing commit messages into those facts is the
//! caller's job.

use std::fmt;

use globset::{Glob, GlobMatcher};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{kind_of, ConfigError, Result};

/// Preset used when `preset` is omitted.
pub const DEFAULT_PRESET: &str = "angular";

/// Footer keywords marking a breaking change when `noteKeywords` is omitted.
pub const DEFAULT_NOTE_KEYWORDS: [&str; 2] = ["BREAKING CHANGE", "BREAKING CHANGES"];

/// Semantic version component to bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    /// `x.y.Z`
    Patch,
    /// `x.Y.0`
    Minor,
    /// `X.0.0`
    Major,
}

impl ReleaseType {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "patch" => Some(Self::Patch),
            "minor" => Some(Self::Minor),
            "major" => Some(Self::Major),
            _ => None,
        }
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Patch => write!(f, "patch"),
            Self::Minor => write!(f, "minor"),
            Self::Major => write!(f, "major"),
        }
    }
}

/// What the commits of one kind contribute to the next release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleRelease {
    /// Bump this component.
    Bump(ReleaseType),
    /// Matching commits never trigger a release (`release: false`).
    Skip,
}

impl RuleRelease {
    /// The bump level, if any.
    pub const fn release_type(self) -> Option<ReleaseType> {
        match self {
            Self::Bump(level) => Some(level),
            Self::Skip => None,
        }
    }
}

impl Serialize for RuleRelease {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Bump(level) => level.serialize(serializer),
            Self::Skip => serializer.serialize_bool(false),
        }
    }
}

/// Matcher keys this crate evaluates.
const RULE_KEYS: [&str; 5] = ["type", "scope", "breaking", "revert", "release"];

/// One `releaseRules` override.
///
/// Every matcher that is present must hold for the rule to apply. A rule that
/// carries matchers on other commit fields is kept but never matches.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseRule {
    /// Commit type to match.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub commit_type: Option<String>,
    /// Commit scope to match; glob patterns allowed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Breaking flag to match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breaking: Option<bool>,
    /// Revert flag to match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revert: Option<bool>,
    /// Release produced by a match.
    pub release: RuleRelease,
    /// Matchers on other commit fields (`subject`, `notes`, ...), kept as written.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// `scope` compiled once at parse time.
    #[serde(skip)]
    scope_matcher: Option<GlobMatcher>,
}

impl PartialEq for ReleaseRule {
    fn eq(&self, other: &Self) -> bool {
        self.commit_type == other.commit_type
            && self.scope == other.scope
            && self.breaking == other.breaking
            && self.revert == other.revert
            && self.release == other.release
            && self.extra == other.extra
    }
}

impl Eq for ReleaseRule {}

impl ReleaseRule {
    /// A rule matching a commit type only.
    pub fn for_type(commit_type: impl Into<String>, release: RuleRelease) -> Self {
        Self {
            commit_type: Some(commit_type.into()),
            scope: None,
            breaking: None,
            revert: None,
            release,
            extra: Map::new(),
            scope_matcher: None,
        }
    }

    /// Validates one raw rule object.
    pub fn parse(value: &Value, field: &str) -> Result<Self> {
        let map = value.as_object().ok_or_else(|| {
            ConfigError::parse(
                field,
                format!("expected a {{ type, release }} object, found {}", kind_of(value)),
            )
        })?;

        let release = match map.get("release") {
            Some(Value::String(level)) => ReleaseType::parse(level)
                .map(RuleRelease::Bump)
                .ok_or_else(|| {
                    ConfigError::parse(
                        format!("{field}.release"),
                        format!("expected patch, minor, major or false, found \"{level}\""),
                    )
                })?,
            Some(Value::Bool(false)) => RuleRelease::Skip,
            Some(other) => {
                return Err(ConfigError::parse(
                    format!("{field}.release"),
                    format!("expected patch, minor, major or false, found {other}"),
                ))
            }
            None => return Err(ConfigError::parse(field, "rule has no `release`")),
        };

        let scope = optional_str(map, "scope", field)?;
        let scope_matcher = scope
            .as_deref()
            .map(|pattern| {
                Glob::new(pattern).map(|glob| glob.compile_matcher()).map_err(|e| {
                    ConfigError::parse(format!("{field}.scope"), format!("invalid scope pattern: {e}"))
                })
            })
            .transpose()?;

        let extra: Map<String, Value> = map
            .iter()
            .filter(|(key, _)| !RULE_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        if !extra.is_empty() {
            debug!(
                %field,
                matchers = ?extra.keys().collect::<Vec<_>>(),
                "release rule has matchers that are not evaluated; it will never match"
            );
        }

        Ok(Self {
            commit_type: optional_str(map, "type", field)?,
            scope,
            breaking: optional_bool(map, "breaking", field)?,
            revert: optional_bool(map, "revert", field)?,
            release,
            extra,
            scope_matcher,
        })
    }

    /// Whether this rule applies to `commit`.
    pub fn matches(&self, commit: &CommitFacts) -> bool {
        if !self.extra.is_empty() {
            return false;
        }
        if self
            .commit_type
            .as_ref()
            .is_some_and(|t| *t != commit.commit_type)
        {
            return false;
        }
        if let Some(pattern) = &self.scope {
            let Some(scope) = commit.scope.as_deref() else {
                return false;
            };
            let matched = self
                .scope_matcher
                .as_ref()
                .map_or(pattern == scope, |matcher| matcher.is_match(scope));
            if !matched {
                return false;
            }
        }
        self.breaking.map_or(true, |b| b == commit.breaking)
            && self.revert.map_or(true, |r| r == commit.revert)
    }
}

/// The default rules every preset falls back to, highest level first.
pub fn preset_rules() -> Vec<ReleaseRule> {
    vec![
        ReleaseRule {
            commit_type: None,
            scope: None,
            breaking: Some(true),
            revert: None,
            release: RuleRelease::Bump(ReleaseType::Major),
            extra: Map::new(),
            scope_matcher: None,
        },
        ReleaseRule {
            commit_type: None,
            scope: None,
            breaking: None,
            revert: Some(true),
            release: RuleRelease::Bump(ReleaseType::Patch),
            extra: Map::new(),
            scope_matcher: None,
        },
        ReleaseRule::for_type("feat", RuleRelease::Bump(ReleaseType::Minor)),
        ReleaseRule::for_type("fix", RuleRelease::Bump(ReleaseType::Patch)),
        ReleaseRule::for_type("perf", RuleRelease::Bump(ReleaseType::Patch)),
    ]
}

/// Facts about one already-parsed commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitFacts {
    /// Conventional commit type (`feat`, `fix`, ...).
    pub commit_type: String,
    /// Scope, if the header had one.
    pub scope: Option<String>,
    /// Whether the commit is marked as breaking.
    pub breaking: bool,
    /// Whether the commit reverts an earlier one.
    pub revert: bool,
}

impl CommitFacts {
    /// Facts for a plain commit of `commit_type`.
    pub fn of_type(commit_type: impl Into<String>) -> Self {
        Self {
            commit_type: commit_type.into(),
            ..Self::default()
        }
    }
}

/// Where a release decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionSource {
    /// The custom `releaseRules` entry at this index.
    ReleaseRule(usize),
    /// The named preset's defaults.
    Preset,
}

/// Outcome of evaluating the analyzer options against one commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseDecision {
    /// Bump level, or `None` when the commit does not trigger a release.
    pub release: Option<ReleaseType>,
    /// Which rule set decided.
    pub source: DecisionSource,
}

/// `parserOpts` shared by the analyzer and the notes generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParserOptions {
    /// Breaking-change footer keywords; `None` means the defaults.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_keywords: Option<Vec<String>>,
    /// Other parser settings, kept as written.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ParserOptions {
    fn parse(value: &Value, field: &str) -> Result<Self> {
        let map = value.as_object().ok_or_else(|| {
            ConfigError::parse(field, format!("expected an object, found {}", kind_of(value)))
        })?;

        let mut options = Self::default();
        for (key, item) in map {
            if key == "noteKeywords" {
                let keywords = crate::source::string_list(item, &format!("{field}.noteKeywords"))?;
                let mut unique: Vec<String> = Vec::with_capacity(keywords.len());
                for keyword in keywords {
                    if !unique.contains(&keyword) {
                        unique.push(keyword);
                    }
                }
                options.note_keywords = Some(unique);
            } else {
                options.extra.insert(key.clone(), item.clone());
            }
        }
        Ok(options)
    }

    /// Effective breaking-change keywords.
    pub fn note_keywords(&self) -> Vec<&str> {
        match &self.note_keywords {
            Some(keywords) => keywords.iter().map(String::as_str).collect(),
            None => DEFAULT_NOTE_KEYWORDS.to_vec(),
        }
    }

    /// Whether a footer line opens a breaking-change note.
    ///
    /// The keyword may be preceded by whitespace or `*` and must be followed
    /// by `:` or whitespace.
    pub fn is_breaking_footer(&self, line: &str) -> bool {
        let line = line.trim_start_matches(|c: char| c.is_whitespace() || c == '*');
        self.note_keywords().into_iter().any(|keyword| {
            line.strip_prefix(keyword)
                .and_then(|rest| rest.chars().next())
                .is_some_and(|next| next == ':' || next.is_whitespace())
        })
    }
}

/// Options of `@semantic-release/commit-analyzer`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitAnalyzerOptions {
    /// Commit convention preset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    /// Custom rules, consulted before the preset.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub release_rules: Vec<ReleaseRule>,
    /// Commit parser settings.
    #[serde(skip_serializing_if = "ParserOptions::is_empty")]
    pub parser_opts: ParserOptions,
    /// Other options, kept as written.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CommitAnalyzerOptions {
    /// Validates the options object of an analyzer plugin entry.
    pub fn parse(options: &Map<String, Value>, field: &str) -> Result<Self> {
        let mut parsed = Self::default();
        for (key, value) in options {
            let key_field = format!("{field}.{key}");
            match key.as_str() {
                "preset" => parsed.preset = Some(expect_str(value, &key_field)?.to_string()),
                "releaseRules" => {
                    let rules = value.as_array().ok_or_else(|| {
                        ConfigError::parse(
                            &key_field,
                            format!("expected a list of rules, found {}", kind_of(value)),
                        )
                    })?;
                    parsed.release_rules = rules
                        .iter()
                        .enumerate()
                        .map(|(i, rule)| ReleaseRule::parse(rule, &format!("{key_field}[{i}]")))
                        .collect::<Result<_>>()?;
                }
                "parserOpts" => parsed.parser_opts = ParserOptions::parse(value, &key_field)?,
                _ => {
                    parsed.extra.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(parsed)
    }

    /// Effective preset name.
    pub fn preset(&self) -> &str {
        self.preset.as_deref().unwrap_or(DEFAULT_PRESET)
    }

    /// Decides the release level for one commit.
    pub fn release_type(&self, commit: &CommitFacts) -> ReleaseDecision {
        if let Some((index, rule)) = self
            .release_rules
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.matches(commit))
        {
            debug!(commit_type = %commit.commit_type, index, "release rule matched");
            return ReleaseDecision {
                release: rule.release.release_type(),
                source: DecisionSource::ReleaseRule(index),
            };
        }

        let release = preset_rules()
            .into_iter()
            .find(|rule| rule.matches(commit))
            .and_then(|rule| rule.release.release_type());
        debug!(commit_type = %commit.commit_type, preset = self.preset(), ?release, "preset decided");
        ReleaseDecision {
            release,
            source: DecisionSource::Preset,
        }
    }
}

/// Options of `@semantic-release/release-notes-generator`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseNotesOptions {
    /// Commit convention preset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    /// Commit parser settings.
    #[serde(skip_serializing_if = "ParserOptions::is_empty")]
    pub parser_opts: ParserOptions,
    /// Writer and other options, kept as written.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ReleaseNotesOptions {
    /// Validates the options object of a notes generator plugin entry.
    pub fn parse(options: &Map<String, Value>, field: &str) -> Result<Self> {
        let mut parsed = Self::default();
        for (key, value) in options {
            let key_field = format!("{field}.{key}");
            match key.as_str() {
                "preset" => parsed.preset = Some(expect_str(value, &key_field)?.to_string()),
                "parserOpts" => parsed.parser_opts = ParserOptions::parse(value, &key_field)?,
                _ => {
                    parsed.extra.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(parsed)
    }
}

impl ParserOptions {
    fn is_empty(&self) -> bool {
        self.note_keywords.is_none() && self.extra.is_empty()
    }
}

fn expect_str<'a>(value: &'a Value, field: &str) -> Result<&'a str> {
    value.as_str().ok_or_else(|| {
        ConfigError::parse(field, format!("expected a string, found {}", kind_of(value)))
    })
}

fn optional_str(map: &Map<String, Value>, key: &str, field: &str) -> Result<Option<String>> {
    map.get(key)
        .map(|value| expect_str(value, &format!("{field}.{key}")).map(str::to_string))
        .transpose()
}

fn optional_bool(map: &Map<String, Value>, key: &str, field: &str) -> Result<Option<bool>> {
    map.get(key)
        .map(|value| {
            value.as_bool().ok_or_else(|| {
                ConfigError::parse(
                    format!("{field}.{key}"),
                    format!("expected a boolean, found {}", kind_of(value)),
                )
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn analyzer(options: Value) -> CommitAnalyzerOptions {
        let Value::Object(map) = options else {
            panic!("options must be an object");
        };
        CommitAnalyzerOptions::parse(&map, "plugins[0][1]").unwrap()
    }

    fn docs_style_patch() -> CommitAnalyzerOptions {
        analyzer(json!({
            "preset": "angular",
            "releaseRules": [
                { "type": "docs", "release": "patch" },
                { "type": "refactor", "release": "patch" },
                { "type": "style", "release": "patch" },
                { "type": "patch", "release": "patch" }
            ],
            "parserOpts": { "noteKeywords": ["BREAKING CHANGE", "BREAKING CHANGES"] }
        }))
    }

    #[test]
    fn custom_rule_decides_listed_type() {
        let decision = docs_style_patch().release_type(&CommitFacts::of_type("docs"));
        assert_eq!(
            decision,
            ReleaseDecision {
                release: Some(ReleaseType::Patch),
                source: DecisionSource::ReleaseRule(0),
            }
        );
        let style = docs_style_patch().release_type(&CommitFacts::of_type("style"));
        assert_eq!(style.source, DecisionSource::ReleaseRule(2));
    }

    #[test]
    fn absent_type_falls_back_to_preset() {
        let decision = docs_style_patch().release_type(&CommitFacts::of_type("feat"));
        assert_eq!(decision.release, Some(ReleaseType::Minor));
        assert_eq!(decision.source, DecisionSource::Preset);

        let chore = docs_style_patch().release_type(&CommitFacts::of_type("chore"));
        assert_eq!(chore.release, None);
        assert_eq!(chore.source, DecisionSource::Preset);
    }

    #[test]
    fn breaking_commit_is_major_through_preset() {
        let commit = CommitFacts {
            breaking: true,
            ..CommitFacts::of_type("fix")
        };
        assert_eq!(docs_style_patch().release_type(&commit).release, Some(ReleaseType::Major));
    }

    #[test]
    fn first_matching_rule_wins() {
        let options = analyzer(json!({
            "releaseRules": [
                { "type": "docs", "scope": "README", "release": "minor" },
                { "type": "docs", "release": false },
                { "type": "docs", "release": "major" }
            ]
        }));

        let readme = CommitFacts {
            scope: Some("README".to_string()),
            ..CommitFacts::of_type("docs")
        };
        assert_eq!(options.release_type(&readme).release, Some(ReleaseType::Minor));

        let other = options.release_type(&CommitFacts::of_type("docs"));
        assert_eq!(other.release, None);
        assert_eq!(other.source, DecisionSource::ReleaseRule(1));
    }

    #[test]
    fn scope_patterns_are_globs() {
        let rule = ReleaseRule::parse(
            &json!({ "scope": "api-*", "release": "minor" }),
            "r",
        )
        .unwrap();
        let mut commit = CommitFacts::of_type("refactor");
        assert!(!rule.matches(&commit));
        commit.scope = Some("api-users".to_string());
        assert!(rule.matches(&commit));
        commit.scope = Some("web".to_string());
        assert!(!rule.matches(&commit));
    }

    #[test]
    fn rules_with_unevaluated_matchers_never_match() {
        let options = analyzer(json!({
            "releaseRules": [
                { "type": "docs", "subject": "README*", "release": "minor" },
                { "type": "docs", "release": "patch" }
            ]
        }));
        let decision = options.release_type(&CommitFacts::of_type("docs"));
        assert_eq!(decision.release, Some(ReleaseType::Patch));
        assert_eq!(decision.source, DecisionSource::ReleaseRule(1));

        let kept = &options.release_rules[0];
        assert_eq!(kept.extra["subject"], "README*");
        assert_eq!(
            serde_json::to_value(kept).unwrap(),
            json!({ "type": "docs", "release": "minor", "subject": "README*" })
        );
    }

    #[test]
    fn unevaluated_matcher_alone_falls_back_to_preset() {
        let options = analyzer(json!({
            "releaseRules": [{ "type": "feat", "subject": "wip*", "release": false }]
        }));
        let decision = options.release_type(&CommitFacts::of_type("feat"));
        assert_eq!(decision.source, DecisionSource::Preset);
        assert_eq!(decision.release, Some(ReleaseType::Minor));
    }

    #[test]
    fn malformed_rules_are_rejected() {
        let err = ReleaseRule::parse(&json!({ "type": "docs", "release": "huge" }), "r[0]").unwrap_err();
        assert_eq!(err.field(), Some("r[0].release"));

        let err = ReleaseRule::parse(&json!({ "type": "docs" }), "r[0]").unwrap_err();
        assert!(err.to_string().contains("no `release`"));

        let err = ReleaseRule::parse(&json!(["docs", "patch"]), "r[0]").unwrap_err();
        assert_eq!(err.field(), Some("r[0]"));

        let err = ReleaseRule::parse(&json!({ "breaking": "yes", "release": "major" }), "r[0]")
            .unwrap_err();
        assert_eq!(err.field(), Some("r[0].breaking"));
    }

    #[test]
    fn release_rules_must_be_a_list() {
        let Value::Object(map) = json!({ "releaseRules": { "type": "docs" } }) else {
            unreachable!()
        };
        let err = CommitAnalyzerOptions::parse(&map, "plugins[0][1]").unwrap_err();
        assert_eq!(err.field(), Some("plugins[0][1].releaseRules"));
    }

    #[test]
    fn note_keywords_default_and_custom() {
        let defaults = ParserOptions::default();
        assert_eq!(defaults.note_keywords(), DEFAULT_NOTE_KEYWORDS.to_vec());
        assert!(defaults.is_breaking_footer("BREAKING CHANGE: drop node 16"));
        assert!(defaults.is_breaking_footer("  * BREAKING CHANGES: several"));
        assert!(defaults.is_breaking_footer("BREAKING CHANGE drop node 16"));
        assert!(!defaults.is_breaking_footer("BREAKING CHANGE"));
        assert!(!defaults.is_breaking_footer("BREAKING CHANGEX: nope"));
        assert!(!defaults.is_breaking_footer("Refs: #12"));

        let custom = docs_style_patch().parser_opts;
        assert!(custom.is_breaking_footer("BREAKING CHANGES: gone"));
        let only_major =
            ParserOptions::parse(&json!({ "noteKeywords": ["MAJOR", "MAJOR"] }), "p").unwrap();
        assert_eq!(only_major.note_keywords(), ["MAJOR"]);
        assert!(!only_major.is_breaking_footer("BREAKING CHANGE: x"));
    }

    #[test]
    fn default_preset_is_angular() {
        assert_eq!(CommitAnalyzerOptions::default().preset(), "angular");
        assert_eq!(docs_style_patch().preset(), "angular");
    }

    #[test]
    fn serializes_without_defaults() {
        assert_eq!(
            serde_json::to_value(CommitAnalyzerOptions::default()).unwrap(),
            json!({})
        );
        let rule = ReleaseRule::for_type("docs", RuleRelease::Skip);
        assert_eq!(
            serde_json::to_value(rule).unwrap(),
            json!({ "type": "docs", "release": false })
        );
    }

    #[test]
    fn notes_generator_keeps_writer_options() {
        let Value::Object(map) = json!({
            "preset": "conventionalcommits",
            "writerOpts": { "commitsSort": ["subject"] }
        }) else {
            unreachable!()
        };
        let options = ReleaseNotesOptions::parse(&map, "plugins[1][1]").unwrap();
        assert_eq!(options.preset.as_deref(), Some("conventionalcommits"));
        assert!(options.extra.contains_key("writerOpts"));
    }
}
