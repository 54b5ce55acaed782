//! Run data model
//!
//! Records are read-only snapshots of what the execution-history service
//! reported. Nothing here is ever written back.

use serde::Deserialize;
use std::fmt;

/// Repository errors
///
/// Every remote failure (transport, HTTP status, undecodable body) ends up
/// here. Whether it is fatal depends on the caller: a failing listing or a
/// failing lookup of the current commit aborts detection, a failing
/// candidate lookup does not.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Network error (connection refused, timeout, etc.)
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP error (non-2xx status)
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    /// Credential rejected or lacks access
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Commit, workflow or repository does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid response from the service
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// API base URL cannot carry a request path
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

impl RepoError {
    /// Map a non-2xx HTTP status onto the error taxonomy
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => RepoError::Unauthorized(message),
            404 => RepoError::NotFound(message),
            _ => RepoError::Http { status, message },
        }
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(err: serde_json::Error) -> Self {
        RepoError::InvalidResponse(err.to_string())
    }
}

impl From<reqwest::Error> for RepoError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RepoError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            RepoError::from_status(status.as_u16(), err.to_string())
        } else {
            RepoError::Network(err.to_string())
        }
    }
}

/// Run status as reported by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    InProgress,
    Queued,
    /// Any status outside the three above (waiting, requested, pending, ...)
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Completed => "completed",
            RunStatus::InProgress => "in_progress",
            RunStatus::Queued => "queued",
            RunStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final outcome of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunConclusion {
    Success,
    Failure,
    Cancelled,
    /// skipped, timed_out, neutral, action_required, stale, ...
    #[serde(other)]
    Other,
}

impl RunConclusion {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunConclusion::Success => "success",
            RunConclusion::Failure => "failure",
            RunConclusion::Cancelled => "cancelled",
            RunConclusion::Other => "other",
        }
    }
}

impl fmt::Display for RunConclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One workflow run
///
/// `id` is assigned by the service in strictly increasing creation order
/// and is the only ordering primitive used anywhere in the crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowRun {
    pub id: u64,
    /// Per-workflow display number (`#42`)
    pub run_number: u64,
    pub head_sha: String,
    pub status: RunStatus,
    /// Only present once the run has completed
    pub conclusion: Option<RunConclusion>,
}

impl WorkflowRun {
    pub fn new(
        id: u64,
        run_number: u64,
        head_sha: impl Into<String>,
        status: RunStatus,
        conclusion: Option<RunConclusion>,
    ) -> Self {
        Self {
            id,
            run_number,
            head_sha: head_sha.into(),
            status,
            conclusion,
        }
    }
}

/// Query filter for run listings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunFilter {
    /// Passed to the service
    pub status: Option<RunStatus>,
    /// Applied locally, after the page has been fetched
    pub conclusion: Option<RunConclusion>,
    /// Page size (default: 20)
    pub per_page: Option<u32>,
}

impl RunFilter {
    pub const DEFAULT_PER_PAGE: u32 = 20;

    /// Completed successful runs, at most `limit` of them
    pub fn successful(limit: u32) -> Self {
        Self {
            status: Some(RunStatus::Completed),
            conclusion: Some(RunConclusion::Success),
            per_page: Some(limit),
        }
    }

    /// In-progress runs, default page size
    pub fn in_progress() -> Self {
        Self {
            status: Some(RunStatus::InProgress),
            ..Self::default()
        }
    }

    /// Effective page size; zero means "use the default"
    pub fn page_size(&self) -> u32 {
        self.per_page
            .filter(|n| *n > 0)
            .unwrap_or(Self::DEFAULT_PER_PAGE)
    }

    /// Local conclusion post-filter
    pub fn apply_conclusion(&self, runs: Vec<WorkflowRun>) -> Vec<WorkflowRun> {
        match self.conclusion {
            Some(wanted) => runs
                .into_iter()
                .filter(|run| run.conclusion == Some(wanted))
                .collect(),
            None => runs,
        }
    }
}

/// Content fingerprint of a commit's source tree
///
/// Equal iff every tracked file is byte-identical. Compared by exact
/// string equality only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TreeHash(String);

impl TreeHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TreeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TreeHash {
    fn from(hash: String) -> Self {
        Self(hash)
    }
}

impl From<&str> for TreeHash {
    fn from(hash: &str) -> Self {
        Self(hash.to_string())
    }
}
