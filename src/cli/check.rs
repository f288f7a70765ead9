//! Validation of both configuration documents.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use crate::commitlint::CommitLintConfig;
use crate::discovery::{discover_commitlint, discover_release};
use crate::release::ReleaseConfig;

/// Check command options.
#[derive(Parser)]
pub struct CheckCommand {
    /// Directory to search from; defaults to the working directory.
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

/// Outcome of checking one document.
#[derive(Debug)]
pub struct CheckOutcome {
    /// Document label.
    pub label: &'static str,
    /// Discovered file, if any.
    pub path: Option<PathBuf>,
    /// Failure message, if the document is missing or invalid.
    pub error: Option<String>,
}

impl CheckOutcome {
    /// Whether the document loaded and validated.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl CheckCommand {
    /// Executes the check command.
    pub fn execute(self) -> Result<()> {
        let dir = match self.dir {
            Some(dir) => dir,
            None => std::env::current_dir().context("Failed to read current directory")?,
        };

        let outcomes = check_dir(&dir);
        for outcome in &outcomes {
            match (&outcome.path, &outcome.error) {
                (Some(path), None) => println!("✅ {}: {}", outcome.label, path.display()),
                (Some(path), Some(error)) => {
                    println!("❌ {}: {}: {error}", outcome.label, path.display());
                }
                (None, Some(error)) => println!("❌ {}: {error}", outcome.label),
                (None, None) => {}
            }
        }

        let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
        if failed > 0 {
            anyhow::bail!("{failed} configuration document(s) failed validation");
        }
        Ok(())
    }
}

/// Discovers and validates both documents starting from `dir`.
pub fn check_dir(dir: &Path) -> Vec<CheckOutcome> {
    vec![
        check_one("commitlint", discover_commitlint(dir), |path| {
            CommitLintConfig::load(path)?.resolve().map(drop)
        }),
        check_one("release", discover_release(dir), |path| {
            ReleaseConfig::load(path).map(drop)
        }),
    ]
}

fn check_one(
    label: &'static str,
    discovered: crate::Result<PathBuf>,
    validate: impl FnOnce(&Path) -> crate::Result<()>,
) -> CheckOutcome {
    match discovered {
        Ok(path) => {
            let error = validate(&path).err().map(|e| e.to_string());
            CheckOutcome {
                label,
                path: Some(path),
                error,
            }
        }
        Err(e) => CheckOutcome {
            label,
            path: None,
            error: Some(e.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn valid_documents_pass() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".commitlintrc.json"),
            r#"{ "extends": ["@commitlint/config-conventional"], "rules": {} }"#,
        )
        .unwrap();
        fs::write(dir.path().join(".releaserc.yml"), "branches: [main]\n").unwrap();

        let outcomes = check_dir(dir.path());
        assert!(outcomes.iter().all(CheckOutcome::is_ok), "{outcomes:?}");
    }

    #[test]
    fn invalid_document_is_reported_with_field() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".commitlintrc.json"),
            r#"{ "rules": { "header-max-length": [2, "always", "128"] } }"#,
        )
        .unwrap();
        fs::write(dir.path().join(".releaserc.json"), "{}").unwrap();

        let outcomes = check_dir(dir.path());
        assert!(!outcomes[0].is_ok());
        assert!(outcomes[0]
            .error
            .as_deref()
            .unwrap()
            .contains("rules.header-max-length[2]"));
        assert!(outcomes[1].is_ok());
    }

    #[test]
    fn unknown_extends_fails_the_check() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".commitlintrc.json"),
            r#"{ "extends": ["@acme/missing"] }"#,
        )
        .unwrap();
        fs::write(dir.path().join(".releaserc.json"), "{}").unwrap();

        let outcomes = check_dir(dir.path());
        assert!(outcomes[0].error.as_deref().unwrap().contains("@acme/missing"));
    }
}
