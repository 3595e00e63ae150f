//! Repository access: discovery, staged diffs and committing.

pub mod commit;
pub mod diff;
pub mod repo;

pub use commit::{commit_staged, split_message};
pub use diff::{MAX_DIFF_LENGTH, StagedDiff, collect_staged_diff};
pub use repo::{INITIAL_COMMIT_PLACEHOLDER, WhisperRepo};
