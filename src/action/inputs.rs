//! Action inputs
//!
//! Read from `INPUT_<NAME>` environment variables (the Actions runner
//! convention) or from flags when run by hand. Coercion is permissive:
//! only a missing token is an error.

use clap::Parser;
use std::fmt;
use tracing::{debug, warn};

use crate::action::ActionError;

/// History bound used when `max_history` is absent or unusable
pub const DEFAULT_MAX_HISTORY: u32 = 10;

/// GitHub caps `per_page` at 100
pub const MAX_HISTORY_LIMIT: u32 = 100;

/// Raw inputs, exactly as supplied
#[derive(Parser, Clone, Default)]
#[command(name = "treeskip")]
#[command(about = "Detect CI runs whose source tree was already built")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Inputs {
    /// Token for the GitHub API
    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Number of recent successful runs to compare against
    #[arg(long = "max-history", env = "INPUT_MAX_HISTORY")]
    pub max_history: Option<String>,

    /// Also compare against in-progress runs ("false" disables)
    #[arg(long = "check-concurrent", env = "INPUT_CHECK_CONCURRENT")]
    pub check_concurrent: Option<String>,
}

/// Normalized inputs
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub token: String,
    pub max_history: u32,
    pub check_concurrent: bool,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("token", &"***")
            .field("max_history", &self.max_history)
            .field("check_concurrent", &self.check_concurrent)
            .finish()
    }
}

impl Inputs {
    pub fn into_settings(self) -> Result<Settings, ActionError> {
        let token = self
            .token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(ActionError::MissingInput("token"))?;

        Ok(Settings {
            token,
            max_history: parse_max_history(self.max_history.as_deref()),
            check_concurrent: parse_check_concurrent(self.check_concurrent.as_deref()),
        })
    }
}

/// Parse the history bound
///
/// Leading decimal digits are used (`"12abc"` → 12). Absent, non-numeric,
/// zero and negative values give the default; anything above 100 is clamped.
pub fn parse_max_history(raw: Option<&str>) -> u32 {
    let raw = raw.map(str::trim).unwrap_or("");
    let (negative, rest) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..digits_end];

    if digits.is_empty() {
        if !raw.is_empty() {
            debug!(
                "max_history '{}' is not numeric, using {}",
                raw, DEFAULT_MAX_HISTORY
            );
        }
        return DEFAULT_MAX_HISTORY;
    }

    // Overflow can only mean "very large"
    let value = digits.parse::<u64>().unwrap_or(u64::MAX);
    if value == 0 {
        return DEFAULT_MAX_HISTORY;
    }
    if negative {
        warn!(
            "max_history '{}' is negative, using {}",
            raw, DEFAULT_MAX_HISTORY
        );
        return DEFAULT_MAX_HISTORY;
    }
    if value > u64::from(MAX_HISTORY_LIMIT) {
        warn!(
            "max_history {} exceeds the page limit, using {}",
            value, MAX_HISTORY_LIMIT
        );
        return MAX_HISTORY_LIMIT;
    }
    value as u32
}

/// Only the literal `false` disables the concurrent check
pub fn parse_check_concurrent(raw: Option<&str>) -> bool {
    raw.map(str::trim) != Some("false")
}
