//! # conventional-config
//!
//! Typed loading and validation of commit-lint and release configuration.
//!
//! ## Features
//!
//! - Commit-lint documents with typed rules and `extends` resolution
//! - Release documents with branches, plugin pipelines and analyzer options
//! - JSON, YAML and data-only ES module sources
//! - Discovery of configuration files from a working directory
//!
//! ## Quick Start
//!
//! ```rust
//! use conventional_config::{CommitLintConfig, DocumentFormat, Severity};
//!
//! let config = CommitLintConfig::parse_str(
//!     r#"{ "rules": { "header-max-length": [2, "always", 128] } }"#,
//!     DocumentFormat::Json,
//! )
//! .unwrap();
//! let rule = config.rule("header-max-length").unwrap();
//! assert_eq!(rule.severity(), Severity::Error);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod cli;
pub mod commitlint;
pub mod discovery;
pub mod error;
pub mod git;
pub mod release;
pub mod source;

pub use crate::cli::Cli;
pub use crate::commitlint::{CommitLintConfig, ResolvedCommitLint, RuleEntry, Severity};
pub use crate::error::{ConfigError, Result};
pub use crate::release::{ReleaseConfig, ReleaseType};
pub use crate::source::DocumentFormat;

/// The current version of conventional-config.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
