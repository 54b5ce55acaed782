//! Ambient run context
//!
//! Resolves the repository, workflow, run and commit the check is running
//! for from the variables the Actions runner exports.
//!
//! Workflow resolution order:
//! 1. File name from `GITHUB_WORKFLOW_REF` (`o/r/.github/workflows/ci.yml@ref` → `ci.yml`)
//! 2. `GITHUB_WORKFLOW`

use reqwest::Url;

use crate::action::ActionError;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Identity of the current run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionContext {
    pub owner: String,
    pub repo: String,
    /// Workflow file name or id, as accepted by the runs listing endpoint
    pub workflow: String,
    pub run_id: u64,
    pub sha: String,
    pub api_url: Url,
}

impl ActionContext {
    /// Resolve from the process environment
    pub fn from_env() -> Result<Self, ActionError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ActionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &'static str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| var(name).ok_or(ActionError::MissingContext(name));

        let repository = require("GITHUB_REPOSITORY")?;
        let (owner, repo) = split_repository(&repository).ok_or_else(|| {
            ActionError::InvalidContext {
                name: "GITHUB_REPOSITORY",
                value: repository.clone(),
            }
        })?;

        let workflow = var("GITHUB_WORKFLOW_REF")
            .and_then(|r| workflow_from_ref(&r))
            .or_else(|| var("GITHUB_WORKFLOW"))
            .ok_or(ActionError::MissingContext("GITHUB_WORKFLOW"))?;

        let run_id_raw = require("GITHUB_RUN_ID")?;
        let run_id = run_id_raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ActionError::InvalidContext {
                name: "GITHUB_RUN_ID",
                value: run_id_raw.clone(),
            })?;

        let sha = require("GITHUB_SHA")?;

        let api_raw = var("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = Url::parse(api_raw.trim())
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https"))
            .ok_or_else(|| ActionError::InvalidContext {
                name: "GITHUB_API_URL",
                value: api_raw.clone(),
            })?;

        Ok(Self {
            owner,
            repo,
            workflow,
            run_id,
            sha: sha.trim().to_string(),
            api_url,
        })
    }
}

/// `owner/repo` → (`owner`, `repo`)
fn split_repository(full_name: &str) -> Option<(String, String)> {
    let (owner, repo) = full_name.trim().split_once('/')?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}

/// Workflow file name from a workflow ref
pub fn workflow_from_ref(workflow_ref: &str) -> Option<String> {
    let path = workflow_ref.split('@').next()?;
    let file = path.rsplit('/').next()?.trim();
    if file.is_empty() {
        None
    } else {
        Some(file.to_string())
    }
}
