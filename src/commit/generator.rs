//! Streaming commit message generation.

use std::io::{self, Write};

use futures::StreamExt;
use tracing::debug;

use crate::commit::message::CommitMessage;
use crate::commit::prompt::build_commit_prompt;
use crate::config::resolve_host;
use crate::error::GenerateError;
use crate::llm::{ChatBackend, ChatMessage, ChatRequest, OllamaBackend};

/// Inputs for one generation call.
#[derive(Debug, Clone, Copy)]
pub struct MessageRequest<'a> {
    pub diff_text: &'a str,
    pub model: &'a str,
    /// Custom prompt template (see [`build_commit_prompt`]).
    pub prompt_template: Option<&'a str>,
    /// Optional hint describing why the change is made.
    pub intent: Option<&'a str>,
}

impl<'a> MessageRequest<'a> {
    pub fn new(diff_text: &'a str, model: &'a str) -> Self {
        Self {
            diff_text,
            model,
            prompt_template: None,
            intent: None,
        }
    }
}

/// Generate a commit message with the default Ollama backend, streaming to stdout.
///
/// The backend host is `OLLAMA_HOST` when set, otherwise the local default.
pub async fn generate(diff_text: &str, model: &str) -> Result<String, GenerateError> {
    let backend = OllamaBackend::new(resolve_host(None));
    let mut out = io::stdout();
    generate_commit_message(&MessageRequest::new(diff_text, model), &backend, &mut out).await
}

/// Generate a commit message from a diff using `backend`.
///
/// Issues exactly one streaming request constrained to the
/// [`CommitMessage`] schema. Every fragment is written to `out` as it
/// arrives, followed by one newline once the stream ends. The accumulated
/// text is then validated and rendered as `title`, blank line, `- change`
/// lines. Backend and validation failures are returned as-is.
pub async fn generate_commit_message<B, W>(
    request: &MessageRequest<'_>,
    backend: &B,
    out: &mut W,
) -> Result<String, GenerateError>
where
    B: ChatBackend + ?Sized,
    W: Write,
{
    let prompt = build_commit_prompt(request.diff_text, request.prompt_template, request.intent);
    debug!("Commit prompt length: {} chars", prompt.len());

    let chat_request = ChatRequest {
        model: request.model.to_string(),
        messages: vec![ChatMessage::user(prompt)],
        format: CommitMessage::schema(),
        stream: true,
    };

    let mut stream = backend.chat(chat_request).await?;

    let mut raw = String::new();
    let mut chunks = 0usize;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        let text = chunk.text();
        out.write_all(text.as_bytes())
            .and_then(|()| out.flush())
            .map_err(GenerateError::Output)?;
        raw.push_str(text);
        chunks += 1;
    }

    writeln!(out)
        .and_then(|()| out.flush())
        .map_err(GenerateError::Output)?;

    debug!("Received {} chunks ({} chars)", chunks, raw.len());

    let message = CommitMessage::parse(&raw).inspect_err(|e| {
        debug!("Failed to parse response as CommitMessage: {}", e);
    })?;

    Ok(message.format())
}
