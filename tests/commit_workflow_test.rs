//! Integration tests for the staged-diff → generate → commit workflow.
//!
//! These tests use the system `git` binary for the final commit.

mod common;

use common::{TestRepo, ndjson_body};
use git_whisper::commit::{MessageRequest, generate_commit_message};
use git_whisper::config::WhisperConfig;
use git_whisper::error::GitError;
use git_whisper::git::{INITIAL_COMMIT_PLACEHOLDER, WhisperRepo, commit_staged};
use git_whisper::llm::OllamaBackend;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_generated_message_is_committed() {
    let test_repo = TestRepo::new();
    test_repo.commit("README.md", "# demo\n", "Initial commit");
    test_repo.stage("README.md", "# demo\n\nUsage notes.\n");

    let repo = WhisperRepo::discover(test_repo.path()).unwrap();
    let diff_text = repo.diff_for_generation().unwrap();
    assert!(diff_text.contains("+Usage notes."));

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            ndjson_body(&[
                r#"{"title":"Document usage","#,
                r#""changes":["Add usage notes to README"]}"#,
            ]),
            "application/x-ndjson",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let backend = OllamaBackend::new(server.uri());
    let mut out = Vec::new();
    let message =
        generate_commit_message(&MessageRequest::new(&diff_text, "llama3"), &backend, &mut out)
            .await
            .unwrap();

    commit_staged(repo.workdir().unwrap(), &message).unwrap();

    assert_eq!(
        test_repo.head_message().trim_end(),
        "Document usage\n\n- Add usage notes to README"
    );
}

#[test]
fn test_commit_title_only_message() {
    let test_repo = TestRepo::new();
    test_repo.commit("a.txt", "a\n", "Initial commit");
    test_repo.stage("a.txt", "b\n");

    commit_staged(test_repo.path(), "Fix typo").unwrap();

    assert_eq!(test_repo.head_message().trim_end(), "Fix typo");
}

#[test]
fn test_commit_without_staged_changes_fails() {
    let test_repo = TestRepo::new();
    test_repo.commit("a.txt", "a\n", "Initial commit");

    let result = commit_staged(test_repo.path(), "Nothing here");
    assert!(matches!(result, Err(GitError::CommitFailed(_))));
}

#[test]
fn test_commit_with_empty_subject_fails_before_running_git() {
    let test_repo = TestRepo::new();
    test_repo.stage("a.txt", "a\n");

    let result = commit_staged(test_repo.path(), "\n\n- orphan change");
    assert!(matches!(result, Err(GitError::EmptySubject)));
}

#[test]
fn test_initial_commit_uses_placeholder_and_can_commit() {
    let test_repo = TestRepo::new();
    test_repo.stage("main.rs", "fn main() {}\n");

    let repo = WhisperRepo::discover(test_repo.path()).unwrap();
    assert_eq!(repo.diff_for_generation().unwrap(), INITIAL_COMMIT_PLACEHOLDER);

    commit_staged(test_repo.path(), "Initial commit\n\n- Add main").unwrap();
    assert!(test_repo.head_message().starts_with("Initial commit"));
}

#[test]
fn test_config_is_read_from_repository() {
    let test_repo = TestRepo::new();
    let mut config = test_repo.repo.config().unwrap();
    config.set_str("git-whisper.model", "qwen2.5-coder").unwrap();
    config.set_str("git-whisper.prompt", "Describe: {diff}").unwrap();
    config.set_str("git-whisper.host", "localhost:4000").unwrap();

    let repo = WhisperRepo::discover(test_repo.path()).unwrap();
    let cfg = WhisperConfig::load(repo.inner());

    assert_eq!(cfg.model, "qwen2.5-coder");
    assert_eq!(cfg.prompt_template.as_deref(), Some("Describe: {diff}"));
    assert_eq!(cfg.host, "http://localhost:4000");
}
