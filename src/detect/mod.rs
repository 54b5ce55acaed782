//! Duplicate detection
//!
//! Two phases, strictly sequential:
//! 1. Completed successful runs (always). Proven work wins.
//! 2. In-progress runs with a smaller id (optional). The smaller-id rule
//!    means of two concurrent runs on the same tree only the later one
//!    defers, so they can never both skip.
//!
//! A failing candidate lookup is logged and skipped. A failing listing is
//! returned to the caller.

use tracing::debug;

use crate::runs::{RepoError, RunFilter, RunRepository, TreeHash, WorkflowRun};

/// Outcome of one detection
///
/// `matched_run_id` is present iff `is_duplicate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionResult {
    is_duplicate: bool,
    reason: String,
    matched_run_id: Option<u64>,
}

impl DetectionResult {
    pub const NO_DUPLICATE_REASON: &'static str = "No duplicate runs found";

    pub fn duplicate(matched_run_id: u64, reason: impl Into<String>) -> Self {
        Self {
            is_duplicate: true,
            reason: reason.into(),
            matched_run_id: Some(matched_run_id),
        }
    }

    pub fn unique() -> Self {
        Self {
            is_duplicate: false,
            reason: Self::NO_DUPLICATE_REASON.to_string(),
            matched_run_id: None,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        self.is_duplicate
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn matched_run_id(&self) -> Option<u64> {
        self.matched_run_id
    }
}

/// Classify the current run as duplicate or not
///
/// `max_history` bounds how many successful runs phase 1 requests.
pub async fn detect_duplicate<R>(
    current_tree_hash: &TreeHash,
    current_run_id: u64,
    max_history: u32,
    check_concurrent: bool,
    repo: &R,
) -> Result<DetectionResult, RepoError>
where
    R: RunRepository + ?Sized,
{
    let successful = repo
        .workflow_runs(&RunFilter::successful(max_history))
        .await?;
    let candidates: Vec<WorkflowRun> = successful
        .into_iter()
        .filter(|run| run.id != current_run_id)
        .collect();

    if let Some(run) = first_same_tree(repo, candidates, current_tree_hash).await {
        return Ok(DetectionResult::duplicate(
            run.id,
            format!(
                "Successful run #{} (id: {}) has same tree content",
                run.run_number, run.id
            ),
        ));
    }

    if check_concurrent {
        let in_progress = repo.workflow_runs(&RunFilter::in_progress()).await?;
        // Only runs started before us
        let candidates: Vec<WorkflowRun> = in_progress
            .into_iter()
            .filter(|run| run.id < current_run_id)
            .collect();

        if let Some(run) = first_same_tree(repo, candidates, current_tree_hash).await {
            return Ok(DetectionResult::duplicate(
                run.id,
                format!(
                    "In-progress run #{} (id: {}) is processing same tree content",
                    run.run_number, run.id
                ),
            ));
        }
    }

    Ok(DetectionResult::unique())
}

/// First candidate, in order, whose tree equals `current`
async fn first_same_tree<R>(
    repo: &R,
    candidates: Vec<WorkflowRun>,
    current: &TreeHash,
) -> Option<WorkflowRun>
where
    R: RunRepository + ?Sized,
{
    for run in candidates {
        match repo.tree_hash(&run.head_sha).await {
            Ok(tree) if tree == *current => return Some(run),
            Ok(_) => {}
            Err(err) => {
                debug!(
                    "Failed to get tree hash for run #{} ({}), skipping: {}",
                    run.run_number, run.head_sha, err
                );
            }
        }
    }
    None
}
