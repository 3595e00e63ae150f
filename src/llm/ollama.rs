//! Ollama chat API client with NDJSON stream decoding.

use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt, TryStreamExt};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::BackendError;
use crate::llm::backend::{ChatBackend, ChatChunk, ChatRequest, ChunkMessage, ChunkStream};

/// Default address of a locally running Ollama server.
pub const DEFAULT_HOST: &str = "http://localhost:11434";

/// Maximum characters of an offending line kept in error messages.
const MAX_LINE_PREVIEW: usize = 200;

/// Chat backend talking to an Ollama server.
#[derive(Debug, Clone)]
pub struct OllamaBackend {
    client: Client,
    host: String,
}

impl OllamaBackend {
    pub fn new(host: impl Into<String>) -> Self {
        let host = host.into();
        Self {
            client: Client::new(),
            host: host.trim_end_matches('/').to_string(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.host)
    }
}

impl Default for OllamaBackend {
    fn default() -> Self {
        Self::new(DEFAULT_HOST)
    }
}

#[async_trait]
impl ChatBackend for OllamaBackend {
    async fn chat(&self, request: ChatRequest) -> Result<ChunkStream, BackendError> {
        let url = self.chat_url();
        info!("Requesting chat completion from {} (model {})", url, request.model);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|source| BackendError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::HttpStatus {
                status: status.as_u16(),
                message: error_message_from_body(&body),
            });
        }

        Ok(decode_chunks(response.bytes_stream().map_err(BackendError::Stream)))
    }
}

/// Extract the `error` field Ollama puts in error bodies, falling back to the raw body.
fn error_message_from_body(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error,
        Err(_) if body.trim().is_empty() => "(empty response body)".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

/// A single NDJSON line as Ollama sends it.
#[derive(Deserialize)]
struct WireChunk {
    #[serde(default)]
    message: Option<ChunkMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Decode one complete NDJSON line into a chunk.
fn parse_line(line: &[u8]) -> Result<ChatChunk, BackendError> {
    let wire: WireChunk =
        serde_json::from_slice(line).map_err(|source| BackendError::InvalidChunk {
            line: String::from_utf8_lossy(line)
                .chars()
                .take(MAX_LINE_PREVIEW)
                .collect(),
            source,
        })?;

    if let Some(error) = wire.error {
        return Err(BackendError::Backend(error));
    }

    Ok(ChatChunk {
        message: wire.message.unwrap_or_default(),
        done: wire.done,
    })
}

/// Buffered byte source for line splitting.
struct LineBuffer<B> {
    bytes: BoxStream<'static, Result<B, BackendError>>,
    pending: Vec<u8>,
    exhausted: bool,
    lines: usize,
}

impl<B> LineBuffer<B> {
    /// Take the next complete line, or the unterminated remainder once the source is exhausted.
    fn take_line(&mut self) -> Option<Vec<u8>> {
        if let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
            line.pop();
            return Some(line);
        }

        if self.exhausted && !self.pending.is_empty() {
            return Some(std::mem::take(&mut self.pending));
        }

        None
    }
}

/// Turn a raw byte stream of NDJSON into a stream of chunks.
///
/// Bytes are buffered until a full line is available, so lines split across
/// reads (even inside a multi-byte character) decode correctly. The stream
/// ends after the first error.
pub(crate) fn decode_chunks<S, B>(bytes: S) -> ChunkStream
where
    S: Stream<Item = Result<B, BackendError>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    let buffer = LineBuffer {
        bytes: bytes.boxed(),
        pending: Vec::new(),
        exhausted: false,
        lines: 0,
    };

    stream::try_unfold(buffer, |mut buffer| async move {
        loop {
            if let Some(line) = buffer.take_line() {
                if line.iter().all(u8::is_ascii_whitespace) {
                    continue;
                }
                buffer.lines += 1;
                return parse_line(&line).map(|chunk| Some((chunk, buffer)));
            }

            if buffer.exhausted {
                debug!("Response stream finished after {} lines", buffer.lines);
                return Ok(None);
            }

            match buffer.bytes.next().await {
                Some(Ok(bytes)) => buffer.pending.extend_from_slice(bytes.as_ref()),
                Some(Err(e)) => return Err(e),
                None => buffer.exhausted = true,
            }
        }
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn byte_stream(
        parts: Vec<&'static [u8]>,
    ) -> impl Stream<Item = Result<Vec<u8>, BackendError>> + Send + 'static {
        stream::iter(parts.into_iter().map(|p| Ok(p.to_vec())))
    }

    async fn collect_texts(stream: ChunkStream) -> Result<Vec<String>, BackendError> {
        stream
            .map_ok(|chunk| chunk.text().to_string())
            .try_collect()
            .await
    }

    #[test]
    fn test_backend_trims_trailing_slash() {
        let backend = OllamaBackend::new("http://localhost:11434/");
        assert_eq!(backend.host(), "http://localhost:11434");
        assert_eq!(backend.chat_url(), "http://localhost:11434/api/chat");
    }

    #[test]
    fn test_default_backend_uses_local_host() {
        assert_eq!(OllamaBackend::default().host(), DEFAULT_HOST);
    }

    #[test]
    fn test_error_message_from_json_body() {
        let body = r#"{"error":"model \"nope\" not found, try pulling it first"}"#;
        assert_eq!(
            error_message_from_body(body),
            "model \"nope\" not found, try pulling it first"
        );
    }

    #[test]
    fn test_error_message_from_plain_body() {
        assert_eq!(error_message_from_body("  bad gateway \n"), "bad gateway");
        assert_eq!(error_message_from_body(""), "(empty response body)");
    }

    #[tokio::test]
    async fn test_decode_whole_lines() {
        let stream = decode_chunks(byte_stream(vec![
            &b"{\"message\":{\"role\":\"assistant\",\"content\":\"Hel\"},\"done\":false}\n"[..],
            &b"{\"message\":{\"role\":\"assistant\",\"content\":\"lo\"},\"done\":false}\n"[..],
            &b"{\"done\":true}\n"[..],
        ]));

        let texts = collect_texts(stream).await.unwrap();
        assert_eq!(texts, vec!["Hel", "lo", ""]);
    }

    #[tokio::test]
    async fn test_decode_lines_split_across_reads() {
        let stream = decode_chunks(byte_stream(vec![
            &b"{\"message\":{\"content\":\"a\"}}\n{\"mess"[..],
            &b"age\":{\"content\":\"b\"}}"[..],
            &b"\n\n{\"message\":{\"content\":\"c\"},\"done\":true}"[..],
        ]));

        let texts = collect_texts(stream).await.unwrap();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_decode_multibyte_char_split_across_reads() {
        // "é" is 0xC3 0xA9 in UTF-8
        let stream = decode_chunks(byte_stream(vec![
            &b"{\"message\":{\"content\":\"caf\xC3"[..],
            &b"\xA9\"}}\n"[..],
        ]));

        let texts = collect_texts(stream).await.unwrap();
        assert_eq!(texts, vec!["café"]);
    }

    #[tokio::test]
    async fn test_decode_in_stream_error_ends_stream() {
        let stream = decode_chunks(byte_stream(vec![
            &b"{\"message\":{\"content\":\"x\"}}\n"[..],
            &b"{\"error\":\"out of memory\"}\n"[..],
            &b"{\"message\":{\"content\":\"never\"}}\n"[..],
        ]));

        let items: Vec<_> = stream.collect().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap().text(), "x");
        match &items[1] {
            Err(BackendError::Backend(msg)) => assert_eq!(msg, "out of memory"),
            other => panic!("Expected Backend error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_decode_invalid_line() {
        let stream = decode_chunks(byte_stream(vec![&b"not json\n"[..]]));
        let result = collect_texts(stream).await;
        match result {
            Err(BackendError::InvalidChunk { line, .. }) => assert_eq!(line, "not json"),
            other => panic!("Expected InvalidChunk, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_decode_propagates_transport_error() {
        let parts: Vec<Result<Vec<u8>, BackendError>> = vec![
            Ok(b"{\"message\":{\"content\":\"x\"}}\n".to_vec()),
            Err(BackendError::Backend("connection reset".to_string())),
        ];
        let stream = decode_chunks(stream::iter(parts));

        let items: Vec<_> = stream.collect().await;
        assert_eq!(items.len(), 2);
        assert!(items[1].is_err());
    }

    #[tokio::test]
    async fn test_decode_empty_body() {
        let stream = decode_chunks(byte_stream(vec![]));
        let texts = collect_texts(stream).await.unwrap();
        assert!(texts.is_empty());
    }
}
