//! Staged diff collection using git2.

use git2::{Diff, DiffFormat, ErrorCode, Repository, Tree};
use tracing::warn;

use crate::error::GitError;

/// Maximum bytes of unified diff text before truncation.
pub const MAX_DIFF_LENGTH: usize = 30_000;

/// The staged changes of a repository in unified patch format.
#[derive(Debug, Clone)]
pub struct StagedDiff {
    pub text: String,
    /// Paths of the staged files, new path for renames.
    pub files: Vec<String>,
    pub truncated: bool,
}

impl StagedDiff {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.text.trim().is_empty()
    }

    pub fn files_changed(&self) -> usize {
        self.files.len()
    }
}

/// Resolve the HEAD tree, or `Ok(None)` on an unborn branch.
///
/// Corrupt HEADs and missing objects are `Err(GitError::DiffFailed)`.
pub(crate) fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, GitError> {
    let head = match repo.head() {
        Ok(head) => head,
        Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
            return Ok(None);
        }
        Err(e) => return Err(GitError::DiffFailed(e)),
    };

    head.peel_to_tree().map(Some).map_err(GitError::DiffFailed)
}

/// Collect the staged diff (HEAD tree against the index), like `git diff --staged`.
pub fn collect_staged_diff(repo: &Repository) -> Result<StagedDiff, GitError> {
    let head_tree = resolve_head_tree(repo)?;

    let diff = repo
        .diff_tree_to_index(head_tree.as_ref(), None, None)
        .map_err(GitError::DiffFailed)?;

    let files = staged_paths(&diff);
    let (text, truncated) = patch_text(&diff, MAX_DIFF_LENGTH)?;

    if truncated {
        warn!(
            "Staged diff exceeds {} bytes and was truncated; the message may miss some changes",
            MAX_DIFF_LENGTH
        );
    }

    Ok(StagedDiff {
        text,
        files,
        truncated,
    })
}

fn staged_paths(diff: &Diff<'_>) -> Vec<String> {
    diff.deltas()
        .filter_map(|delta| {
            delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .map(|p| p.to_string_lossy().into_owned())
        })
        .collect()
}

/// Render a diff as unified patch text, stopping before `max_len` bytes.
///
/// Returns the text and whether it was cut short.
fn patch_text(diff: &Diff<'_>, max_len: usize) -> Result<(String, bool), GitError> {
    let mut text = String::new();
    let mut full = false;

    let printed = diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        let content = String::from_utf8_lossy(line.content());
        let origin = line.origin();
        let marker = matches!(origin, '+' | '-' | ' ');

        if text.len() + usize::from(marker) + content.len() > max_len {
            full = true;
            return false;
        }

        if marker {
            text.push(origin);
        }
        text.push_str(&content);
        true
    });

    let truncated = print_outcome(printed, full)?;
    Ok((text, truncated))
}

/// Interpret the result of `Diff::print`.
///
/// Stopping from the callback surfaces as a `User` error, which only means
/// the size cap was hit. Any other error is a real failure.
fn print_outcome(printed: Result<(), git2::Error>, full: bool) -> Result<bool, GitError> {
    match printed {
        Ok(()) => Ok(false),
        Err(e) if full && e.code() == ErrorCode::User => Ok(true),
        Err(e) => Err(GitError::DiffFailed(e)),
    }
}
