//! Accept / reject / edit review of a generated message.

use std::io::{self, BufRead, IsTerminal, Write};

use dialoguer::Input;
use tracing::debug;

use crate::error::{EditorError, GitError, ReviewError};

/// Prompt shown after the message preview.
pub const REVIEW_PROMPT: &str = "Accept this message? (Y/n/e to edit)";

/// What to do with a generated message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewChoice {
    Accept,
    Reject,
    Edit,
}

/// Parse an answer, case-insensitively. Empty input accepts.
///
/// Returns `None` for anything unrecognized so the caller can ask again.
pub fn parse_choice(input: &str) -> Option<ReviewChoice> {
    match input.trim().to_lowercase().as_str() {
        "" | "y" | "yes" => Some(ReviewChoice::Accept),
        "n" | "no" => Some(ReviewChoice::Reject),
        "e" | "edit" => Some(ReviewChoice::Edit),
        _ => None,
    }
}

/// How the review ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// The message (possibly edited) was committed.
    Committed(String),
    Rejected,
}

impl ReviewOutcome {
    /// Process exit status for this outcome.
    pub fn exit_code(&self) -> u8 {
        match self {
            ReviewOutcome::Committed(_) => 0,
            ReviewOutcome::Rejected => 1,
        }
    }
}

/// Trait for reading the user's answer to the review prompt.
///
/// This abstraction allows scripting the answers in tests.
#[cfg_attr(test, mockall::automock)]
pub trait AnswerSource {
    /// Show `prompt` and return the raw answer line.
    fn ask(&mut self, prompt: &str) -> io::Result<String>;
}

/// Answers from the terminal, or plain stdin lines when stdin is piped.
pub struct TerminalAnswers;

impl AnswerSource for TerminalAnswers {
    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        if io::stdin().is_terminal() {
            return Input::<String>::new()
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()
                .map_err(io::Error::other);
        }

        let mut stdout = io::stdout();
        write!(stdout, "{prompt} ")?;
        stdout.flush()?;
        read_answer(&mut io::stdin().lock())
    }
}

/// Read one answer line; end of input is an error so the loop cannot spin.
fn read_answer<R: BufRead>(input: &mut R) -> io::Result<String> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "no answer on stdin",
        ));
    }
    Ok(line)
}

/// Ask until the user accepts or rejects `message`.
///
/// Accepting calls `commit` with the current message. Editing calls `edit`
/// and shows the result before asking again; a failed edit is reported to
/// `out` with a hint about `$EDITOR` and the previous message is kept.
/// Unrecognized answers ask again.
pub fn review_message<A, E, C, W>(
    mut message: String,
    answers: &mut A,
    mut edit: E,
    mut commit: C,
    out: &mut W,
) -> Result<ReviewOutcome, ReviewError>
where
    A: AnswerSource + ?Sized,
    E: FnMut(&str) -> Result<String, EditorError>,
    C: FnMut(&str) -> Result<(), GitError>,
    W: Write,
{
    loop {
        let answer = answers.ask(REVIEW_PROMPT).map_err(ReviewError::Input)?;
        let choice = parse_choice(&answer);
        debug!("Review answer {:?} -> {:?}", answer.trim(), choice);

        match choice {
            Some(ReviewChoice::Accept) => {
                commit(&message)?;
                writeln!(out, "\nAccepted commit message:\n{message}").map_err(ReviewError::Output)?;
                return Ok(ReviewOutcome::Committed(message));
            }
            Some(ReviewChoice::Reject) => return Ok(ReviewOutcome::Rejected),
            Some(ReviewChoice::Edit) => match edit(&message) {
                Ok(edited) => {
                    message = edited;
                    writeln!(out, "\n[Edited commit message preview]\n\n{message}\n")
                        .map_err(ReviewError::Output)?;
                }
                Err(e) => {
                    writeln!(out, "Failed to open editor: {e}")
                        .and_then(|()| {
                            writeln!(out, "Tip: set $EDITOR (e.g. export EDITOR=\"code --wait\")")
                        })
                        .map_err(ReviewError::Output)?;
                }
            },
            None => {
                writeln!(out, "Invalid choice. Please enter 'Y', 'n', or 'e'.\n")
                    .map_err(ReviewError::Output)?;
            }
        }
    }
}
