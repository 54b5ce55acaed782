//! Run repository: execution-history access
//!
//! Two operations, both async:
//! - `tree_hash`: commit SHA → content fingerprint
//! - `workflow_runs`: filtered run listing, most recent first
//!
//! ## Architecture
//!
//! - `types.rs`: WorkflowRun, RunFilter, TreeHash, RepoError
//! - `github.rs`: GitHub REST implementation
//! - `transport.rs`: HTTP seam used by the GitHub implementation (reqwest)
//! - `transport_fake.rs`: fixture-backed transport for tests
//! - `memory.rs`: in-memory repository for exercising detection

pub mod github;
pub mod memory;
pub mod transport;
pub mod transport_fake;
pub mod types;

use async_trait::async_trait;

// Re-export main types
pub use github::GitHubRunRepository;
pub use memory::InMemoryRunRepository;
pub use transport::{HttpTransport, ReqwestTransport};
pub use transport_fake::FakeTransport;
pub use types::{RepoError, RunConclusion, RunFilter, RunStatus, TreeHash, WorkflowRun};

/// Execution-history capability
///
/// Implementations never retry; retry and timeout policy belong to the
/// transport underneath.
#[async_trait]
pub trait RunRepository: Send + Sync {
    /// Resolve a commit to its tree fingerprint
    async fn tree_hash(&self, commit_sha: &str) -> Result<TreeHash, RepoError>;

    /// List runs matching `filter`
    ///
    /// Returns at most `filter.page_size()` runs with the requested status,
    /// then drops the ones whose conclusion does not match.
    async fn workflow_runs(&self, filter: &RunFilter) -> Result<Vec<WorkflowRun>, RepoError>;
}
