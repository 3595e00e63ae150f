//! Creating the commit through the system `git` binary.
//!
//! Shelling out (rather than committing through git2) runs the user's hooks
//! and honors signing and other commit-time configuration.

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::GitError;

/// Split a message into its subject line and optional body.
///
/// The first line (trimmed) is the subject and must be non-empty. A single
/// blank separator line after it is dropped; a blank body becomes `None`.
pub fn split_message(message: &str) -> Result<(String, Option<String>), GitError> {
    let mut lines = message.lines();

    let subject = lines.next().unwrap_or("").trim().to_string();
    if subject.is_empty() {
        return Err(GitError::EmptySubject);
    }

    let mut rest: Vec<&str> = lines.collect();
    if rest.first().is_some_and(|l| l.trim().is_empty()) {
        rest.remove(0);
    }

    let body = rest.join("\n");
    let body = if body.trim().is_empty() {
        None
    } else {
        Some(body.trim_end().to_string())
    };

    Ok((subject, body))
}

/// Commit the staged changes in `workdir` with `message`.
///
/// Runs `git commit -m <subject> [-m <body>]`.
pub fn commit_staged(workdir: &Path, message: &str) -> Result<(), GitError> {
    let (subject, body) = split_message(message)?;

    let mut args = vec!["commit", "-m", subject.as_str()];
    if let Some(body) = body.as_deref() {
        args.extend(["-m", body]);
    }

    debug!("Running git commit in {}", workdir.display());
    run_git(workdir, &args)
}

/// Run a git command and return success or a descriptive error.
fn run_git(workdir: &Path, args: &[&str]) -> Result<(), GitError> {
    let output = Command::new("git")
        .args(args)
        .current_dir(workdir)
        .output()
        .map_err(|e| GitError::CommitFailed(format!("failed to run git: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let detail = if stderr.trim().is_empty() {
            stdout.trim().to_string()
        } else {
            stderr.trim().to_string()
        };
        return Err(GitError::CommitFailed(format!(
            "{} ({})",
            detail, output.status
        )));
    }

    Ok(())
}
