//! Error types for git-whisper modules using thiserror.

use thiserror::Error;

/// Errors from repository discovery, diffing and committing.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Not a valid Git repository: {0}")]
    NotARepository(#[source] git2::Error),

    #[error("No staged diff found; stage changes with `git add` first")]
    NoStagedChanges,

    #[error("Failed to collect staged diff: {0}")]
    DiffFailed(#[source] git2::Error),

    #[error("Commit subject (first line) is empty")]
    EmptySubject,

    #[error("git commit failed: {0}")]
    CommitFailed(String),
}

/// Errors from the chat backend (request, transport and stream decoding).
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to reach the model backend at {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Model backend returned HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Response stream was interrupted: {0}")]
    Stream(#[source] reqwest::Error),

    #[error("Model backend sent an unreadable chunk ({line}): {source}")]
    InvalidChunk {
        line: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Model backend reported an error: {0}")]
    Backend(String),
}

/// Errors from validating the accumulated model response.
#[derive(Error, Debug)]
pub enum MessageError {
    #[error("Response is not a valid commit message document: {source}. Response: {raw}")]
    InvalidJson {
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Response has an empty title")]
    EmptyTitle,
}

/// Errors from a single commit message generation call.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    InvalidResponse(#[from] MessageError),

    #[error("Failed to write streamed output: {0}")]
    Output(#[source] std::io::Error),
}

/// Errors from editing a message in the user's editor.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Failed to prepare temporary message file: {0}")]
    TempFile(#[source] std::io::Error),

    #[error("Failed to launch editor '{editor}': {source}")]
    Launch {
        editor: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Editor '{editor}' exited with status: {status}")]
    ExitStatus { editor: String, status: String },
}

/// Errors that end the review loop.
#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("Failed to read answer: {0}")]
    Input(#[source] std::io::Error),

    #[error("Failed to write to the terminal: {0}")]
    Output(#[source] std::io::Error),

    #[error(transparent)]
    Commit(#[from] GitError),
}
