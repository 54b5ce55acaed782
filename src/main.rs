//! Treeskip CLI
//!
//! Runs as a GitHub Actions step: inputs come from `INPUT_*`, context from
//! `GITHUB_*`, results go to `$GITHUB_OUTPUT`.
//!
//! EXIT: 0 when a decision was made (duplicate or not), 1 on any failure.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use treeskip::action::{self, Inputs, EXIT_FAILURE, EXIT_SUCCESS};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = init_tracing() {
        eprintln!("Logging setup failed: {}", e);
    }

    let inputs = Inputs::parse();

    let exit_code = match action::run_from_env(inputs).await {
        Ok(_) => EXIT_SUCCESS,
        Err(e) => {
            // Workflow commands are read from stdout
            println!("{}", action::failure_command(&e));
            EXIT_FAILURE
        }
    };
    std::process::exit(exit_code);
}

/// Log to stdout without targets or timestamps (the runner adds its own)
///
/// Level comes from `RUST_LOG`; otherwise `debug` when the runner has
/// debug logging enabled, `info` when it has not.
fn init_tracing() -> anyhow::Result<()> {
    let default_level = match std::env::var("RUNNER_DEBUG").as_deref() {
        Ok("1") => "debug",
        _ => "info",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stdout),
        )
        .with(filter)
        .try_init()?;
    Ok(())
}
