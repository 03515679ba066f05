//! Gitrecap server entrypoint.

use std::io::{self, Write};
use std::process::ExitCode;

use gitrecap::github::ActivityError;
use gitrecap::server::{self, AppState};
use gitrecap::RecapConfig;
use ortho_config::OrthoConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), ActivityError> {
    init_tracing();

    let config = load_config()?;
    let state = AppState::from_config(&config)?;
    server::serve(&config.resolve_bind_addr(), state).await
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`ActivityError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<RecapConfig, ActivityError> {
    RecapConfig::load().map_err(|error| ActivityError::Configuration {
        message: error.to_string(),
    })
}
