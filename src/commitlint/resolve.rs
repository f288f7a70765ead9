//! Resolution of `extends` into an effective rule set.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use super::{preset, CommitLintConfig, RuleEntry};
use crate::error::{ConfigError, Result};

/// Maximum depth of file-based `extends` chains.
const MAX_EXTENDS_DEPTH: usize = 10;

/// Effective rules after every base ruleset has been layered in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedCommitLint {
    /// Rulesets that contributed, in application order.
    pub applied: Vec<String>,
    /// Effective rules; later layers replace earlier definitions.
    pub rules: IndexMap<String, RuleEntry>,
}

impl ResolvedCommitLint {
    /// Returns the effective definition of `name`.
    pub fn rule(&self, name: &str) -> Option<&RuleEntry> {
        self.rules.get(name)
    }
}

impl CommitLintConfig {
    /// Resolves `extends` relative to the directory the config was loaded from.
    pub fn resolve(&self) -> Result<ResolvedCommitLint> {
        self.resolve_from(&self.base_dir())
    }

    /// Resolves `extends` relative to `base_dir`.
    pub fn resolve_from(&self, base_dir: &Path) -> Result<ResolvedCommitLint> {
        let mut resolved = ResolvedCommitLint::default();
        let mut visiting = Vec::new();
        layer(self, base_dir, &mut visiting, &mut resolved)?;
        Ok(resolved)
    }
}

/// Applies `config`'s bases and then its own rules onto `out`.
fn layer(
    config: &CommitLintConfig,
    base_dir: &Path,
    visiting: &mut Vec<PathBuf>,
    out: &mut ResolvedCommitLint,
) -> Result<()> {
    for name in &config.extends {
        if let Some(document) = preset::builtin(name) {
            debug!(extends = %name, "applying built-in ruleset");
            let base = CommitLintConfig::from_value(&document)?;
            layer(&base, base_dir, visiting, out)?;
            out.applied.push(name.clone());
        } else if is_path(name) {
            let path = base_dir.join(name);
            if !path.is_file() {
                return Err(ConfigError::unknown_extends(name));
            }
            let canonical = path.canonicalize().unwrap_or_else(|_| path.clone());

            if visiting.contains(&canonical) {
                return Err(ConfigError::parse(
                    "extends",
                    format!("circular extends through {}", canonical.display()),
                ));
            }
            if visiting.len() >= MAX_EXTENDS_DEPTH {
                return Err(ConfigError::parse(
                    "extends",
                    format!("extends chain is deeper than {MAX_EXTENDS_DEPTH} levels"),
                ));
            }

            debug!(extends = %canonical.display(), "applying ruleset file");
            let base = CommitLintConfig::load(&path)?;
            visiting.push(canonical);
            let result = layer(&base, &base.base_dir(), visiting, out);
            visiting.pop();
            result?;
            out.applied.push(name.clone());
        } else {
            return Err(ConfigError::unknown_extends(name));
        }
    }

    for (name, rule) in &config.rules {
        out.rules.insert(name.clone(), rule.clone());
    }
    Ok(())
}

/// Whether an `extends` entry names a file rather than a package.
///
/// Absolute paths are passed through unchanged by `Path::join`.
fn is_path(name: &str) -> bool {
    name.starts_with("./") || name.starts_with("../") || Path::new(name).is_absolute()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commitlint::rule::{HEADER_MAX_LENGTH, SUBJECT_CASE, TYPE_ENUM};
    use crate::commitlint::{Applicability, RuleConfig, Severity};
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn config(value: serde_json::Value) -> CommitLintConfig {
        CommitLintConfig::from_value(&value).unwrap()
    }

    #[test]
    fn local_rules_override_preset() {
        let local = config(json!({
            "extends": ["@commitlint/config-conventional"],
            "rules": { "header-max-length": [2, 128] }
        }));
        let resolved = local.resolve_from(Path::new(".")).unwrap();

        assert_eq!(resolved.applied, ["@commitlint/config-conventional"]);
        assert_eq!(
            resolved.rule(HEADER_MAX_LENGTH),
            Some(&RuleEntry::HeaderMaxLength(RuleConfig::always(Severity::Error, 128)))
        );
        assert_eq!(
            resolved.rule(SUBJECT_CASE).map(RuleEntry::applicability),
            Some(Applicability::Never)
        );
        let Some(RuleEntry::TypeEnum(types)) = resolved.rule(TYPE_ENUM) else {
            panic!("type-enum missing");
        };
        assert!(types.value.as_ref().unwrap().contains("feat"));
    }

    #[test]
    fn overridden_rule_keeps_preset_position() {
        let local = config(json!({
            "extends": "conventional",
            "rules": { "body-leading-blank": [2, "always"] }
        }));
        let resolved = local.resolve_from(Path::new(".")).unwrap();
        let first = resolved.rules.get_index(0).unwrap();
        assert_eq!(first.0, "body-leading-blank");
        assert_eq!(first.1.severity(), Severity::Error);
    }

    #[test]
    fn unknown_package_is_reported() {
        let local = config(json!({ "extends": ["@acme/commitlint-config"] }));
        let err = local.resolve_from(Path::new(".")).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownExtendsTarget { ref name } if name == "@acme/commitlint-config"
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let local = config(json!({ "extends": ["./missing.json"] }));
        let err = local.resolve_from(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownExtendsTarget { .. }));
    }

    #[test]
    fn file_chain_resolves_relative_to_each_file() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("shared")).unwrap();
        fs::write(
            dir.path().join("shared/base.yaml"),
            "extends: ./types.json\nrules:\n  header-max-length: [1, always, 90]\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("shared/types.json"),
            r#"{ "rules": { "type-enum": [2, "always", ["feat", "fix"]] } }"#,
        )
        .unwrap();
        fs::write(
            dir.path().join(".commitlintrc.json"),
            r#"{ "extends": ["./shared/base.yaml"], "rules": { "header-max-length": [2, 120] } }"#,
        )
        .unwrap();

        let local = CommitLintConfig::load(dir.path().join(".commitlintrc.json")).unwrap();
        let resolved = local.resolve().unwrap();

        assert_eq!(resolved.applied, ["./types.json", "./shared/base.yaml"]);
        assert_eq!(
            resolved.rule(HEADER_MAX_LENGTH),
            Some(&RuleEntry::HeaderMaxLength(RuleConfig::always(Severity::Error, 120)))
        );
        assert!(resolved.rule(TYPE_ENUM).is_some());
    }

    #[test]
    fn circular_extends_is_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.json"), r#"{ "extends": "./b.json" }"#).unwrap();
        fs::write(dir.path().join("b.json"), r#"{ "extends": "./a.json" }"#).unwrap();

        let local = config(json!({ "extends": "./a.json" }));
        let err = local.resolve_from(dir.path()).unwrap_err();
        assert!(err.to_string().contains("circular"));
    }

    /// Writes `chain-1.json` .. `chain-<len>.json`, each extending the next.
    fn write_chain(dir: &Path, len: usize) {
        for i in 1..=len {
            let body = if i < len {
                format!(r#"{{ "extends": "./chain-{}.json" }}"#, i + 1)
            } else {
                r#"{ "rules": { "header-max-length": [2, 80] } }"#.to_string()
            };
            fs::write(dir.join(format!("chain-{i}.json")), body).unwrap();
        }
    }

    #[test]
    fn chain_at_depth_limit_resolves() {
        let dir = TempDir::new().unwrap();
        write_chain(dir.path(), MAX_EXTENDS_DEPTH);

        let local = config(json!({ "extends": "./chain-1.json" }));
        let resolved = local.resolve_from(dir.path()).unwrap();
        assert_eq!(resolved.applied.len(), MAX_EXTENDS_DEPTH);
        assert!(resolved.rule(HEADER_MAX_LENGTH).is_some());
    }

    #[test]
    fn chain_beyond_depth_limit_is_rejected() {
        let dir = TempDir::new().unwrap();
        write_chain(dir.path(), MAX_EXTENDS_DEPTH + 1);

        let local = config(json!({ "extends": "./chain-1.json" }));
        let err = local.resolve_from(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(err.field(), Some("extends"));
        assert!(err.to_string().contains("deeper than 10"));
    }

    #[test]
    fn no_extends_is_local_rules_only() {
        let local = config(json!({ "rules": { "type-enum": [0] } }));
        let resolved = local.resolve_from(Path::new(".")).unwrap();
        assert!(resolved.applied.is_empty());
        assert_eq!(resolved.rules.len(), 1);
    }
}
