//! Action entry point
//!
//! Provides:
//! - Input parsing and normalization (`inputs.rs`)
//! - Ambient run context from the runner environment (`context.rs`)
//! - Step output writing (`outputs.rs`)
//! - `run_from_env` / `execute`: resolve the current tree, detect, emit
//!
//! `main` turns any error surfacing here into a failed step. Nothing below
//! this module decides exit status.

pub mod context;
pub mod inputs;
pub mod outputs;

use tracing::info;

use crate::detect::{detect_duplicate, DetectionResult};
use crate::runs::{GitHubRunRepository, RepoError, ReqwestTransport, RunRepository};

// Re-exports
pub use context::ActionContext;
pub use inputs::{Inputs, Settings};
pub use outputs::OutputSink;

/// Action errors
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("Input required and not supplied: {0}")]
    MissingInput(&'static str),

    #[error("Missing context variable: {0}")]
    MissingContext(&'static str),

    #[error("Invalid context variable {name}: {value}")]
    InvalidContext { name: &'static str, value: String },

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Exit codes (deterministic)
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

/// Result type for action operations
pub type Result<T> = std::result::Result<T, ActionError>;

/// Run against the live GitHub API using the runner environment
pub async fn run_from_env(inputs: Inputs) -> Result<DetectionResult> {
    let settings = inputs.into_settings()?;
    let context = ActionContext::from_env()?;
    let outputs = OutputSink::from_env();

    let repo = GitHubRunRepository::new(
        ReqwestTransport::new()?,
        context.api_url.clone(),
        context.owner.clone(),
        context.repo.clone(),
        context.workflow.clone(),
        &settings.token,
    )?;

    execute(&settings, &context, &repo, &outputs).await
}

/// Resolve the current tree, run detection, write outputs
///
/// `tree_hash` is emitted before detection starts, so it is available to
/// later steps even when detection fails.
pub async fn execute<R>(
    settings: &Settings,
    context: &ActionContext,
    repo: &R,
    outputs: &OutputSink,
) -> Result<DetectionResult>
where
    R: RunRepository + ?Sized,
{
    info!("Checking for duplicate runs...");
    info!("Repository: {}/{}", context.owner, context.repo);
    info!("Workflow: {}", context.workflow);
    info!("Current SHA: {}", context.sha);

    let current = repo.tree_hash(&context.sha).await?;
    info!("Current tree hash: {}", current);
    outputs.set_output("tree_hash", current.as_str())?;

    let result = detect_duplicate(
        &current,
        context.run_id,
        settings.max_history,
        settings.check_concurrent,
        repo,
    )
    .await?;

    outputs.set_output("is_duplicate", if result.is_duplicate() { "true" } else { "false" })?;
    outputs.set_output("reason", result.reason())?;
    let matched = result
        .matched_run_id()
        .map(|id| id.to_string())
        .unwrap_or_default();
    outputs.set_output("matched_run_id", &matched)?;

    if result.is_duplicate() {
        info!("Skip: {}", result.reason());
    } else {
        info!("Run: {}", result.reason());
    }

    Ok(result)
}

/// Render an error as a workflow `::error::` command
pub fn failure_command(err: &ActionError) -> String {
    format!("::error::{}", outputs::escape_command_data(&err.to_string()))
}
