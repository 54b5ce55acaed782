//! GitHub REST implementation of RunRepository
//!
//! - commit lookup: `GET /repos/{owner}/{repo}/git/commits/{sha}` → `tree.sha`
//! - run listing: `GET /repos/{owner}/{repo}/actions/workflows/{workflow}/runs`

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::runs::transport::{HttpTransport, ReqwestTransport};
use crate::runs::types::{RepoError, RunConclusion, RunFilter, RunStatus, TreeHash, WorkflowRun};
use crate::runs::RunRepository;

const USER_AGENT: &str = concat!("treeskip/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";

#[derive(Debug, Deserialize)]
struct CommitPayload {
    tree: TreePayload,
}

#[derive(Debug, Deserialize)]
struct TreePayload {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct RunsPage {
    workflow_runs: Vec<RunPayload>,
}

#[derive(Debug, Deserialize)]
struct RunPayload {
    id: u64,
    run_number: u64,
    head_sha: String,
    #[serde(default)]
    status: Option<RunStatus>,
    #[serde(default)]
    conclusion: Option<RunConclusion>,
}

impl From<RunPayload> for WorkflowRun {
    fn from(run: RunPayload) -> Self {
        WorkflowRun {
            id: run.id,
            run_number: run.run_number,
            head_sha: run.head_sha,
            status: run.status.unwrap_or(RunStatus::Unknown),
            conclusion: run.conclusion,
        }
    }
}

/// Run repository backed by the GitHub Actions API
///
/// Scoped to one workflow of one repository.
#[derive(Debug)]
pub struct GitHubRunRepository<T = ReqwestTransport> {
    transport: T,
    api_url: Url,
    owner: String,
    repo: String,
    workflow: String,
    authorization: String,
}

impl<T: HttpTransport> GitHubRunRepository<T> {
    /// `workflow` is a workflow file name (`ci.yml`) or numeric id
    pub fn new(
        transport: T,
        api_url: Url,
        owner: impl Into<String>,
        repo: impl Into<String>,
        workflow: impl Into<String>,
        token: &str,
    ) -> Result<Self, RepoError> {
        if api_url.cannot_be_a_base() {
            return Err(RepoError::InvalidUrl(api_url.to_string()));
        }
        Ok(Self {
            transport,
            api_url,
            owner: owner.into(),
            repo: repo.into(),
            workflow: workflow.into(),
            authorization: format!("Bearer {}", token),
        })
    }

    /// Underlying transport, for inspecting a FakeTransport's recorded requests
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn headers(&self) -> [(&str, &str); 4] {
        [
            ("Authorization", self.authorization.as_str()),
            ("Accept", "application/vnd.github+json"),
            ("X-GitHub-Api-Version", API_VERSION),
            ("User-Agent", USER_AGENT),
        ]
    }

    /// Append percent-encoded path segments to the API base
    fn endpoint(&self, segments: &[&str]) -> Result<Url, RepoError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| RepoError::InvalidUrl(self.api_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl<T: HttpTransport> RunRepository for GitHubRunRepository<T> {
    async fn tree_hash(&self, commit_sha: &str) -> Result<TreeHash, RepoError> {
        let url = self.endpoint(&[
            "repos",
            &self.owner,
            &self.repo,
            "git",
            "commits",
            commit_sha,
        ])?;

        let body = self.transport.get(url.as_str(), &self.headers()).await?;
        let commit: CommitPayload = serde_json::from_str(&body)?;
        Ok(TreeHash::from(commit.tree.sha))
    }

    async fn workflow_runs(&self, filter: &RunFilter) -> Result<Vec<WorkflowRun>, RepoError> {
        let mut url = self.endpoint(&[
            "repos",
            &self.owner,
            &self.repo,
            "actions",
            "workflows",
            &self.workflow,
            "runs",
        ])?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(status) = filter.status {
                query.append_pair("status", status.as_str());
            }
            query.append_pair("per_page", &filter.page_size().to_string());
        }

        let body = self.transport.get(url.as_str(), &self.headers()).await?;
        let page: RunsPage = serde_json::from_str(&body)?;
        let runs: Vec<WorkflowRun> = page.workflow_runs.into_iter().map(Into::into).collect();
        debug!(
            "Fetched {} runs (status={:?}, per_page={})",
            runs.len(),
            filter.status.map(|s| s.as_str()),
            filter.page_size()
        );

        Ok(filter.apply_conclusion(runs))
    }
}
