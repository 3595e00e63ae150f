//! Settings resolved from git config and the environment.
//!
//! ```text
//! [git-whisper]
//!     model = llama3
//!     prompt = "Summarize this diff: {diff}"
//!     host = http://localhost:11434
//! ```

use std::env;

use git2::Repository;
use tracing::{debug, warn};

use crate::llm::DEFAULT_HOST;

/// Model used when `git-whisper.model` is not set.
pub const DEFAULT_MODEL: &str = "llama3";

/// Environment variable consulted when `git-whisper.host` is not set.
pub const HOST_ENV_VAR: &str = "OLLAMA_HOST";

const MODEL_KEY: &str = "git-whisper.model";
const PROMPT_KEY: &str = "git-whisper.prompt";
const HOST_KEY: &str = "git-whisper.host";

/// Resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhisperConfig {
    pub model: String,
    pub prompt_template: Option<String>,
    pub host: String,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            prompt_template: None,
            host: resolve_host(None),
        }
    }
}

impl WhisperConfig {
    /// Load settings from the repository's (merged) git config.
    ///
    /// Any lookup failure falls back to the defaults.
    pub fn load(repo: &Repository) -> Self {
        match repo.config() {
            Ok(config) => Self::from_git_config(&config),
            Err(e) => {
                warn!("Could not read git config, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Build settings from an already opened git config.
    pub fn from_git_config(config: &git2::Config) -> Self {
        let model = read_string(config, MODEL_KEY).unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let prompt_template = read_string(config, PROMPT_KEY);
        let host = resolve_host(read_string(config, HOST_KEY));

        debug!(
            "Config: model={}, host={}, custom prompt={}",
            model,
            host,
            prompt_template.is_some()
        );

        Self {
            model,
            prompt_template,
            host,
        }
    }
}

/// Read a non-blank string value; missing keys and errors yield `None`.
fn read_string(config: &git2::Config, key: &str) -> Option<String> {
    match config.get_string(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        Ok(_) => None,
        Err(e) if e.code() == git2::ErrorCode::NotFound => None,
        Err(e) => {
            warn!("Ignoring unreadable git config value {}: {}", key, e);
            None
        }
    }
}

/// Pick the backend host: explicit value, then `OLLAMA_HOST`, then the default.
pub(crate) fn resolve_host(configured: Option<String>) -> String {
    let raw = configured
        .or_else(|| env::var(HOST_ENV_VAR).ok().filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_HOST.to_string());
    normalize_host(&raw)
}

/// Add a missing `http://` scheme and drop trailing slashes.
pub fn normalize_host(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}
