//! git-whisper - Commit messages for staged changes, written by a local LLM.
//!
//! # Overview
//!
//! git-whisper reads the staged diff of a git repository, asks a locally
//! hosted Ollama model for a commit message constrained to a JSON schema
//! (a title plus a list of changes), streams the output while it is being
//! generated, and renders the validated result as a commit message.

pub mod commit;
pub mod config;
pub mod editor;
pub mod error;
pub mod git;
pub mod llm;
pub mod review;

// Re-export commonly used types
pub use commit::{CommitMessage, MessageRequest, generate, generate_commit_message};
pub use config::WhisperConfig;
pub use error::{BackendError, EditorError, GenerateError, GitError, MessageError, ReviewError};
pub use git::WhisperRepo;
pub use llm::{ChatBackend, ChatChunk, ChatRequest, OllamaBackend};
pub use review::{ReviewChoice, ReviewOutcome, review_message};
