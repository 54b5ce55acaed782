//! Treeskip: skip CI runs whose source tree was already built
//!
//! Compares the git tree of the current commit against recent successful
//! runs and, optionally, against runs still in progress. Only tree content
//! matters; commit messages, authors and timestamps do not.

pub mod action;
pub mod detect;
pub mod runs;

// Re-export detection
pub use detect::{detect_duplicate, DetectionResult};

// Re-export repository types
pub use runs::{
    GitHubRunRepository, InMemoryRunRepository, RepoError, RunConclusion, RunFilter,
    RunRepository, RunStatus, TreeHash, WorkflowRun,
};
