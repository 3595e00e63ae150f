//! Repository discovery and diff selection.

use std::path::Path;

use git2::Repository;
use tracing::debug;

use crate::error::GitError;
use crate::git::diff::{StagedDiff, collect_staged_diff, resolve_head_tree};

/// Diff text used when the repository has no commits yet.
pub const INITIAL_COMMIT_PLACEHOLDER: &str = "[Initial commit detected; no diff available]";

/// A discovered git repository.
pub struct WhisperRepo {
    repo: Repository,
}

impl WhisperRepo {
    /// Find the repository containing `path`, searching parent directories.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self, GitError> {
        let repo = Repository::discover(path.as_ref()).map_err(GitError::NotARepository)?;
        debug!("Discovered repository at {}", repo.path().display());
        Ok(Self { repo })
    }

    pub fn inner(&self) -> &Repository {
        &self.repo
    }

    /// Working tree root, or `None` for bare repositories.
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    /// Whether HEAD has no commit yet (unborn branch).
    pub fn is_initial_commit(&self) -> Result<bool, GitError> {
        Ok(resolve_head_tree(&self.repo)?.is_none())
    }

    /// Staged changes against HEAD.
    pub fn staged_diff(&self) -> Result<StagedDiff, GitError> {
        collect_staged_diff(&self.repo)
    }

    /// The diff text to summarize.
    ///
    /// Without a prior commit this is [`INITIAL_COMMIT_PLACEHOLDER`]; otherwise
    /// the staged diff, which must not be empty.
    pub fn diff_for_generation(&self) -> Result<String, GitError> {
        if self.is_initial_commit()? {
            debug!("No commits yet; using initial commit placeholder");
            return Ok(INITIAL_COMMIT_PLACEHOLDER.to_string());
        }

        let diff = self.staged_diff()?;
        if diff.is_empty() {
            return Err(GitError::NoStagedChanges);
        }

        debug!(
            "Staged diff: {} files ({}), {} bytes, truncated={}",
            diff.files_changed(),
            diff.files.join(", "),
            diff.text.len(),
            diff.truncated
        );
        Ok(diff.text)
    }
}
