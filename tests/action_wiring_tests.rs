//! Action wiring tests
//!
//! Drives `action::execute` with an in-memory repository and checks the
//! step outputs written to a GITHUB_OUTPUT file.

use reqwest::Url;
use std::collections::HashMap;
use std::path::Path;
use tempfile::TempDir;
use treeskip::action::{self, ActionContext, ActionError, Inputs, OutputSink};
use treeskip::{InMemoryRunRepository, RepoError, RunConclusion, RunStatus, WorkflowRun};

fn context(run_id: u64, sha: &str) -> ActionContext {
    ActionContext {
        owner: "octo".to_string(),
        repo: "widgets".to_string(),
        workflow: "ci.yml".to_string(),
        run_id,
        sha: sha.to_string(),
        api_url: Url::parse("https://api.github.com").unwrap(),
    }
}

fn settings(check_concurrent: &str) -> action::Settings {
    Inputs {
        token: Some("ghs_test".to_string()),
        max_history: None,
        check_concurrent: Some(check_concurrent.to_string()),
    }
    .into_settings()
    .unwrap()
}

// Helper: parse heredoc entries back into name → value
fn read_outputs(path: &Path) -> HashMap<String, String> {
    let content = std::fs::read_to_string(path).unwrap();
    let mut outputs = HashMap::new();
    let mut lines = content.lines();
    while let Some(header) = lines.next() {
        let (name, delimiter) = header.split_once("<<").unwrap();
        let mut value = Vec::new();
        for line in lines.by_ref() {
            if line == delimiter {
                break;
            }
            value.push(line);
        }
        outputs.insert(name.to_string(), value.join("\n"));
    }
    outputs
}

#[tokio::test]
async fn test_duplicate_outputs() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("github_output");
    let sink = OutputSink::File(output_path.clone());

    let repo = InMemoryRunRepository::new()
        .with_tree("current", "abc")
        .with_run(WorkflowRun::new(
            100,
            12,
            "older",
            RunStatus::Completed,
            Some(RunConclusion::Success),
        ))
        .with_tree("older", "abc");

    let result = action::execute(&settings("true"), &context(105, "current"), &repo, &sink)
        .await
        .unwrap();
    assert!(result.is_duplicate());

    let outputs = read_outputs(&output_path);
    assert_eq!(outputs["tree_hash"], "abc");
    assert_eq!(outputs["is_duplicate"], "true");
    assert_eq!(
        outputs["reason"],
        "Successful run #12 (id: 100) has same tree content"
    );
    assert_eq!(outputs["matched_run_id"], "100");
}

#[tokio::test]
async fn test_unique_outputs() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("github_output");
    let sink = OutputSink::File(output_path.clone());

    let repo = InMemoryRunRepository::new()
        .with_tree("current", "abc")
        .with_run(WorkflowRun::new(90, 3, "busy", RunStatus::InProgress, None))
        .with_tree("busy", "abc");

    // Concurrent check disabled: the in-progress twin is not consulted
    let result = action::execute(&settings("false"), &context(105, "current"), &repo, &sink)
        .await
        .unwrap();
    assert!(!result.is_duplicate());

    let outputs = read_outputs(&output_path);
    assert_eq!(outputs["is_duplicate"], "false");
    assert_eq!(outputs["reason"], "No duplicate runs found");
    assert_eq!(outputs["matched_run_id"], "");
    assert_eq!(outputs.len(), 4);
}

#[tokio::test]
async fn test_current_commit_lookup_failure_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("github_output");
    let sink = OutputSink::File(output_path.clone());

    let repo = InMemoryRunRepository::new().with_failing_commit("current");

    let err = action::execute(&settings("true"), &context(105, "current"), &repo, &sink)
        .await
        .unwrap_err();

    assert!(matches!(err, ActionError::Repo(RepoError::Network(_))));
    // Nothing was decided, so nothing was written
    assert!(!output_path.exists());
    assert!(repo.queries().is_empty());
    assert!(action::failure_command(&err).starts_with("::error::Network error"));
}

#[tokio::test]
async fn test_listing_failure_keeps_tree_hash_output() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("github_output");
    let sink = OutputSink::File(output_path.clone());

    let repo = InMemoryRunRepository::new()
        .with_tree("current", "abc")
        .with_failing_listing("secondary rate limit");

    let err = action::execute(&settings("true"), &context(105, "current"), &repo, &sink)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Network error: secondary rate limit");
    let outputs = read_outputs(&output_path);
    assert_eq!(outputs["tree_hash"], "abc");
    assert!(!outputs.contains_key("is_duplicate"));
}

#[tokio::test]
async fn test_missing_token_fails_before_any_request() {
    let err = action::run_from_env(Inputs::default()).await.unwrap_err();
    assert!(matches!(err, ActionError::MissingInput("token")));
}
