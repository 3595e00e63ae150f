//! Editing a commit message in the user's `$EDITOR`.

use std::env;
use std::io::Write;
use std::process::Command;

use tracing::debug;

use crate::error::EditorError;

/// Environment variable naming the editor command.
const EDITOR_ENV_VAR: &str = "EDITOR";

/// Open `initial` in the user's editor and return the edited text.
///
/// The text is written to a temporary file which is removed afterwards,
/// whatever the outcome. Trailing whitespace of the result is trimmed.
pub fn edit_in_editor(initial: &str) -> Result<String, EditorError> {
    let mut file = tempfile::Builder::new()
        .prefix("git-whisper-commitmsg-")
        .suffix(".txt")
        .tempfile()
        .map_err(EditorError::TempFile)?;
    file.write_all(initial.as_bytes())
        .and_then(|()| file.flush())
        .map_err(EditorError::TempFile)?;

    let (program, args) = editor_command();
    debug!("Launching editor {} {:?} on {}", program, args, file.path().display());

    let status = Command::new(&program)
        .args(&args)
        .arg(file.path())
        .status()
        .map_err(|source| EditorError::Launch {
            editor: program.clone(),
            source,
        })?;

    if !status.success() {
        return Err(EditorError::ExitStatus {
            editor: program,
            status: status.to_string(),
        });
    }

    let edited = std::fs::read_to_string(file.path()).map_err(EditorError::TempFile)?;
    Ok(edited.trim_end().to_string())
}

/// Resolve the editor program and its arguments from `$EDITOR`.
fn editor_command() -> (String, Vec<String>) {
    env::var(EDITOR_ENV_VAR)
        .ok()
        .and_then(|value| split_command(&value))
        .unwrap_or_else(default_editor)
}

/// Split a command line on whitespace into program and arguments.
fn split_command(value: &str) -> Option<(String, Vec<String>)> {
    let mut parts = value.split_whitespace();
    let program = parts.next()?.to_string();
    let args = parts.map(str::to_string).collect();
    Some((program, args))
}

fn default_editor() -> (String, Vec<String>) {
    if cfg!(windows) {
        ("notepad".to_string(), Vec::new())
    } else {
        ("vi".to_string(), Vec::new())
    }
}
