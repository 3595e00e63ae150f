//! AI-generated commit messages: prompt, streaming generation and rendering.

pub mod generator;
pub mod message;
pub mod prompt;

pub use generator::{MessageRequest, generate, generate_commit_message};
pub use message::CommitMessage;
pub use prompt::{DEFAULT_TEMPLATE, build_commit_prompt};
