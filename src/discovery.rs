//! Locating configuration files on disk.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ConfigError, Result};

/// File names searched for a commit-lint configuration, in priority order.
pub const COMMITLINT_FILES: &[&str] = &[
    ".commitlintrc",
    ".commitlintrc.json",
    ".commitlintrc.yaml",
    ".commitlintrc.yml",
    ".commitlintrc.js",
    ".commitlintrc.mjs",
    ".commitlintrc.cjs",
    "commitlint.config.js",
    "commitlint.config.mjs",
    "commitlint.config.cjs",
    ".github/configs/commitlint.config.mjs",
];

/// File names searched for a release configuration, in priority order.
pub const RELEASE_FILES: &[&str] = &[
    ".releaserc",
    ".releaserc.json",
    ".releaserc.yaml",
    ".releaserc.yml",
    ".releaserc.js",
    ".releaserc.mjs",
    ".releaserc.cjs",
    "release.config.js",
    "release.config.mjs",
    "release.config.cjs",
    ".github/configs/release.config.mjs",
];

/// Finds the commit-lint configuration nearest to `start`.
pub fn discover_commitlint(start: &Path) -> Result<PathBuf> {
    discover(start, COMMITLINT_FILES)
}

/// Finds the release configuration nearest to `start`.
pub fn discover_release(start: &Path) -> Result<PathBuf> {
    discover(start, RELEASE_FILES)
}

/// Searches `start` and its ancestors, then the home directory, for the
/// first existing file among `candidates`.
///
/// A relative `start` is taken from the working directory, so its real
/// parents are searched too.
pub fn discover(start: &Path, candidates: &[&str]) -> Result<PathBuf> {
    let start = std::path::absolute(start).map_err(|source| ConfigError::Io {
        path: start.to_path_buf(),
        source,
    })?;
    let home = dirs::home_dir();
    let search = start
        .ancestors()
        .map(Path::to_path_buf)
        .chain(home.filter(|home| !start.starts_with(home)));

    for dir in search {
        if let Some(found) = candidates
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
        {
            debug!(path = %found.display(), "discovered configuration file");
            return Ok(found);
        }
    }

    Err(ConfigError::NotFound {
        searched: candidates.iter().map(|name| (*name).to_string()).collect(),
    })
}
