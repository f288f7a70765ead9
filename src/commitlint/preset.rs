//! Built-in base rulesets that `extends` can name without a file.

use serde_json::{json, Value};

/// Identifier of the conventional-commits base ruleset.
pub const CONFIG_CONVENTIONAL: &str = "@commitlint/config-conventional";

/// Commit types allowed by the conventional ruleset.
pub const CONVENTIONAL_TYPES: [&str; 11] = [
    "build", "chore", "ci", "docs", "feat", "fix", "perf", "refactor", "revert", "style", "test",
];

/// Returns the raw document for a built-in ruleset, if `name` is one.
///
/// Short names are accepted the way the linter expands them, so
/// `conventional` and `@commitlint/conventional` both name
/// `@commitlint/config-conventional`.
pub fn builtin(name: &str) -> Option<Value> {
    match canonical_name(name) {
        CONFIG_CONVENTIONAL => Some(config_conventional()),
        _ => None,
    }
}

fn canonical_name(name: &str) -> &str {
    match name {
        "conventional" | "config-conventional" | "@commitlint/conventional" => CONFIG_CONVENTIONAL,
        other => other,
    }
}

fn config_conventional() -> Value {
    json!({
        "rules": {
            "body-leading-blank": [1, "always"],
            "body-max-line-length": [2, "always", 100],
            "footer-leading-blank": [1, "always"],
            "footer-max-line-length": [2, "always", 100],
            "header-max-length": [2, "always", 100],
            "header-trim": [2, "always"],
            "subject-case": [
                2,
                "never",
                ["sentence-case", "start-case", "pascal-case", "upper-case"]
            ],
            "subject-empty": [2, "never"],
            "subject-full-stop": [2, "never", "."],
            "type-case": [2, "always", "lower-case"],
            "type-empty": [2, "never"],
            "type-enum": [2, "always", CONVENTIONAL_TYPES]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conventional_by_full_and_short_name() {
        assert!(builtin(CONFIG_CONVENTIONAL).is_some());
        assert_eq!(builtin("conventional"), builtin(CONFIG_CONVENTIONAL));
        assert_eq!(builtin("@commitlint/conventional"), builtin(CONFIG_CONVENTIONAL));
    }

    #[test]
    fn unknown_name_is_none() {
        assert!(builtin("@commitlint/config-angular-typo").is_none());
    }

    #[test]
    fn conventional_header_limit() {
        let doc = builtin(CONFIG_CONVENTIONAL).unwrap();
        assert_eq!(doc["rules"]["header-max-length"], json!([2, "always", 100]));
    }
}
