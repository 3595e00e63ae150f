//! Chat backend abstraction for streaming structured-output requests.

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::error::BackendError;

/// Lazy, single-pass sequence of response chunks.
pub type ChunkStream = BoxStream<'static, Result<ChatChunk, BackendError>>;

/// Role of a chat message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Request body for a chat completion.
///
/// Serialized as-is into the Ollama `/api/chat` body. `format` carries the
/// JSON schema the response must conform to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub format: serde_json::Value,
    pub stream: bool,
}

/// Message fragment carried by a chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChunkMessage {
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub content: String,
}

/// One incremental unit of a streamed response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChatChunk {
    #[serde(default)]
    pub message: ChunkMessage,
    #[serde(default)]
    pub done: bool,
}

impl ChatChunk {
    /// Build a chunk carrying `text` (used by fakes and tests).
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            message: ChunkMessage {
                role: Some(Role::Assistant),
                content: text.into(),
            },
            done: false,
        }
    }

    /// The text fragment of this chunk (`message.content`).
    pub fn text(&self) -> &str {
        &self.message.content
    }
}

/// Trait for issuing chat requests to a language model.
///
/// This abstraction allows replacing the network backend in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Start a chat request and return the stream of response chunks.
    async fn chat(&self, request: ChatRequest) -> Result<ChunkStream, BackendError>;
}
