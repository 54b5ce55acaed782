//! Step outputs
//!
//! Appended to the file named by `GITHUB_OUTPUT` in heredoc form:
//!
//! ```text
//! name<<ghadelimiter_<uuid>
//! value
//! ghadelimiter_<uuid>
//! ```
//!
//! Without `GITHUB_OUTPUT` (local runs) outputs go to stdout as `name=value`.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use uuid::Uuid;

/// Where step outputs are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputSink {
    File(PathBuf),
    Stdout,
}

impl OutputSink {
    pub fn from_env() -> Self {
        match std::env::var_os("GITHUB_OUTPUT") {
            Some(path) if !path.is_empty() => OutputSink::File(PathBuf::from(path)),
            _ => OutputSink::Stdout,
        }
    }

    pub fn set_output(&self, name: &str, value: &str) -> io::Result<()> {
        match self {
            OutputSink::File(path) => {
                let delimiter = format!("ghadelimiter_{}", Uuid::new_v4());
                let entry = format_output(name, value, &delimiter)?;
                let mut file = OpenOptions::new().create(true).append(true).open(path)?;
                file.write_all(entry.as_bytes())?;
                file.flush()
            }
            OutputSink::Stdout => {
                let mut stdout = io::stdout().lock();
                writeln!(stdout, "{}={}", name, value)
            }
        }
    }
}

/// Render one heredoc entry
///
/// Fails if the delimiter occurs in the name or value, since the runner
/// would then cut the value short.
pub fn format_output(name: &str, value: &str, delimiter: &str) -> io::Result<String> {
    if name.contains(delimiter) || value.contains(delimiter) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Output '{}' contains the delimiter {}", name, delimiter),
        ));
    }
    Ok(format!("{}<<{}\n{}\n{}\n", name, delimiter, value, delimiter))
}

/// Escape a message for a `::error::` workflow command
pub fn escape_command_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
