//! Git repository queries.

use std::path::Path;

use anyhow::{Context, Result};
use git2::{ErrorCode, Repository};
use tracing::debug;

/// Returns the branch checked out in the repository containing `path`.
///
/// A freshly initialised repository with no commits reports the branch HEAD
/// points at.
pub fn current_branch<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let repo = Repository::discover(path)
        .with_context(|| format!("Not in a git repository: {}", path.display()))?;

    let branch = match repo.head() {
        Ok(head) => match head.shorthand() {
            Some(name) if name != "HEAD" && head.is_branch() => name.to_string(),
            _ => anyhow::bail!("Repository is in detached HEAD state"),
        },
        Err(e) if e.code() == ErrorCode::UnbornBranch => {
            let head = repo
                .find_reference("HEAD")
                .context("Failed to read HEAD reference")?;
            head.symbolic_target()
                .and_then(|target| target.strip_prefix("refs/heads/"))
                .map(str::to_string)
                .context("HEAD does not point at a branch")?
        }
        Err(e) => return Err(e).context("Failed to get HEAD reference"),
    };

    debug!(%branch, "resolved current branch");
    Ok(branch)
}
