//! Chat backend seam and the Ollama implementation.

pub mod backend;
pub mod ollama;

pub use backend::{ChatBackend, ChatChunk, ChatMessage, ChatRequest, ChunkMessage, ChunkStream, Role};
pub use ollama::{DEFAULT_HOST, OllamaBackend};
