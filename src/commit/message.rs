//! Structured commit message returned by the model.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::MessageError;

/// A parsed commit message: a title plus an ordered list of changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitMessage {
    pub title: String,
    pub changes: Vec<String>,
}

impl CommitMessage {
    /// JSON schema sent as the response `format`, constraining the model's output.
    pub fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "title":   { "type": "string" },
                "changes": { "type": "array", "items": { "type": "string" } }
            },
            "required": ["title", "changes"]
        })
    }

    /// Parse and validate the fully accumulated response text.
    ///
    /// Strict: the text must be a JSON document matching [`CommitMessage::schema`]
    /// with a non-blank title. No extraction from surrounding prose.
    pub fn parse(raw: &str) -> Result<Self, MessageError> {
        let message: CommitMessage =
            serde_json::from_str(raw.trim()).map_err(|source| MessageError::InvalidJson {
                raw: raw.chars().take(500).collect(),
                source,
            })?;

        if message.title.trim().is_empty() {
            return Err(MessageError::EmptyTitle);
        }

        Ok(message)
    }

    /// Format the message for git.
    ///
    /// Produces:
    /// ```text
    /// Title line
    ///
    /// - first change
    /// - second change
    /// ```
    pub fn format(&self) -> String {
        let mut formatted = self.title.trim().to_string();

        let bullets: Vec<String> = self
            .changes
            .iter()
            .map(|change| format!("- {}", strip_bullet(change)))
            .collect();

        if !bullets.is_empty() {
            formatted.push_str("\n\n");
            formatted.push_str(&bullets.join("\n"));
        }

        formatted.trim().to_string()
    }
}

/// Drop the `- ` markers the model may already have put in front of a change.
fn strip_bullet(change: &str) -> &str {
    change.trim_start_matches("- ").trim()
}
