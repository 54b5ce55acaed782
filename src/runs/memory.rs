//! In-memory run repository
//!
//! Same contract as the GitHub repository, driven by fixtures. Records every
//! query and lookup so callers can assert on what detection asked for.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

use crate::runs::types::{RepoError, RunFilter, TreeHash, WorkflowRun};
use crate::runs::RunRepository;

#[derive(Debug, Default)]
pub struct InMemoryRunRepository {
    runs: Vec<WorkflowRun>,
    trees: HashMap<String, TreeHash>,
    failing_commits: HashSet<String>,
    listing_error: Option<String>,
    queries: Mutex<Vec<RunFilter>>,
    lookups: Mutex<Vec<String>>,
}

impl InMemoryRunRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_run(mut self, run: WorkflowRun) -> Self {
        self.runs.push(run);
        self
    }

    /// Register the tree fingerprint for a commit
    pub fn with_tree(mut self, commit_sha: &str, tree: &str) -> Self {
        self.trees
            .insert(commit_sha.to_string(), TreeHash::from(tree));
        self
    }

    /// Make lookups of `commit_sha` fail with a network error
    pub fn with_failing_commit(mut self, commit_sha: &str) -> Self {
        self.failing_commits.insert(commit_sha.to_string());
        self
    }

    /// Make every listing fail with a network error
    pub fn with_failing_listing(mut self, msg: &str) -> Self {
        self.listing_error = Some(msg.to_string());
        self
    }

    /// Filters passed to `workflow_runs`, in call order
    pub fn queries(&self) -> Vec<RunFilter> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Commit SHAs passed to `tree_hash`, in call order
    pub fn lookups(&self) -> Vec<String> {
        self.lookups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl RunRepository for InMemoryRunRepository {
    async fn tree_hash(&self, commit_sha: &str) -> Result<TreeHash, RepoError> {
        self.lookups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(commit_sha.to_string());

        if self.failing_commits.contains(commit_sha) {
            return Err(RepoError::Network(format!(
                "lookup of {} failed",
                commit_sha
            )));
        }
        self.trees
            .get(commit_sha)
            .cloned()
            .ok_or_else(|| RepoError::NotFound(format!("No commit found for SHA: {}", commit_sha)))
    }

    async fn workflow_runs(&self, filter: &RunFilter) -> Result<Vec<WorkflowRun>, RepoError> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(filter.clone());

        if let Some(ref msg) = self.listing_error {
            return Err(RepoError::Network(msg.clone()));
        }

        // Most recent first, page limit before the conclusion post-filter
        let mut runs: Vec<WorkflowRun> = self
            .runs
            .iter()
            .filter(|run| filter.status.map_or(true, |status| run.status == status))
            .cloned()
            .collect();
        runs.sort_by(|a, b| b.id.cmp(&a.id));
        runs.truncate(filter.page_size() as usize);

        Ok(filter.apply_conclusion(runs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runs::types::{RunConclusion, RunStatus};

    fn completed(id: u64, conclusion: RunConclusion) -> WorkflowRun {
        WorkflowRun::new(id, id, format!("sha{}", id), RunStatus::Completed, Some(conclusion))
    }

    #[tokio::test]
    async fn test_lists_most_recent_first() {
        let repo = InMemoryRunRepository::new()
            .with_run(completed(1, RunConclusion::Success))
            .with_run(completed(3, RunConclusion::Success))
            .with_run(completed(2, RunConclusion::Success));

        let runs = repo.workflow_runs(&RunFilter::successful(10)).await.unwrap();
        let ids: Vec<u64> = runs.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_limit_applies_before_conclusion_filter() {
        let repo = InMemoryRunRepository::new()
            .with_run(completed(3, RunConclusion::Failure))
            .with_run(completed(2, RunConclusion::Success))
            .with_run(completed(1, RunConclusion::Success));

        // Page of 2 holds ids 3 and 2; only 2 survives the post-filter
        let runs = repo.workflow_runs(&RunFilter::successful(2)).await.unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].id, 2);
    }

    #[tokio::test]
    async fn test_status_filter() {
        let repo = InMemoryRunRepository::new()
            .with_run(completed(1, RunConclusion::Success))
            .with_run(WorkflowRun::new(2, 2, "sha2", RunStatus::InProgress, None))
            .with_run(WorkflowRun::new(3, 3, "sha3", RunStatus::Queued, None));

        let runs = repo.workflow_runs(&RunFilter::in_progress()).await.unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].id, 2);
    }

    #[tokio::test]
    async fn test_tree_lookup_outcomes() {
        let repo = InMemoryRunRepository::new()
            .with_tree("good", "tree1")
            .with_failing_commit("flaky");

        assert_eq!(repo.tree_hash("good").await.unwrap(), TreeHash::from("tree1"));
        assert!(matches!(
            repo.tree_hash("flaky").await,
            Err(RepoError::Network(_))
        ));
        assert!(matches!(
            repo.tree_hash("missing").await,
            Err(RepoError::NotFound(_))
        ));
        assert_eq!(repo.lookups(), vec!["good", "flaky", "missing"]);
    }

    #[tokio::test]
    async fn test_failing_listing() {
        let repo = InMemoryRunRepository::new().with_failing_listing("service unavailable");
        let result = repo.workflow_runs(&RunFilter::default()).await;
        assert!(matches!(result, Err(RepoError::Network(_))));
        assert_eq!(repo.queries().len(), 1);
    }
}
