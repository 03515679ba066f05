//! Application configuration loaded from CLI, environment, and files.
//!
//! This module provides a unified configuration struct that merges values
//! from command-line arguments, environment variables, and configuration
//! files using ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.gitrecap.toml` in current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `GITRECAP_TOKEN`, or legacy `GITHUB_TOKEN`
//!    and the provider keys (`GEMINI_API_KEY`, `ANTHROPIC_API_KEY`,
//!    `GROK_API_KEY`)
//! 4. **Command-line arguments** – `--token`/`-t`, `--bind-addr`/`-b`, etc.
//!
//! # Configuration File
//!
//! Place `.gitrecap.toml` in the current directory, home directory, or XDG
//! config directory with:
//!
//! ```toml
//! token = "ghp_example"
//! bind_addr = "127.0.0.1:8080"
//! gemini_api_key = "AIza-example"
//! ```

use std::env;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::github::error::ActivityError;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Environment Variables
///
/// - `GITRECAP_TOKEN`, `GITHUB_TOKEN`, or `--token`: GitHub API token
/// - `GITRECAP_BIND_ADDR` or `--bind-addr`: listen address for the server
/// - `GITRECAP_GITHUB_API_BASE` or `--github-api-base`: GitHub API base URL
/// - `GITRECAP_GEMINI_API_KEY` or `GEMINI_API_KEY`: Gemini provider key
/// - `GITRECAP_ANTHROPIC_API_KEY` or `ANTHROPIC_API_KEY`: Anthropic key
/// - `GITRECAP_GROK_API_KEY` or `GROK_API_KEY`: Grok provider key
#[derive(Debug, Clone, Default, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "GITRECAP",
    discovery(
        dotfile_name = ".gitrecap.toml",
        config_file_name = "gitrecap.toml",
        app_name = "gitrecap"
    )
)]
pub struct RecapConfig {
    /// GitHub token used for REST and GraphQL calls.
    ///
    /// Can be provided via:
    /// - CLI: `--token <TOKEN>` or `-t <TOKEN>`
    /// - Environment: `GITRECAP_TOKEN` or `GITHUB_TOKEN` (legacy)
    /// - Config file: `token = "..."`
    #[ortho_config(cli_short = 't')]
    pub token: Option<String>,

    /// Listen address for the HTTP server.
    ///
    /// Can be provided via:
    /// - CLI: `--bind-addr <ADDR>` or `-b <ADDR>`
    /// - Environment: `GITRECAP_BIND_ADDR`
    /// - Config file: `bind_addr = "..."`
    #[ortho_config(cli_short = 'b')]
    pub bind_addr: Option<String>,

    /// GitHub API base URL, overridable for GitHub Enterprise and tests.
    ///
    /// Can be provided via:
    /// - CLI: `--github-api-base <URL>`
    /// - Environment: `GITRECAP_GITHUB_API_BASE`
    /// - Config file: `github_api_base = "..."`
    #[ortho_config()]
    pub github_api_base: Option<String>,

    /// Gemini API key; the Gemini provider joins the summary chain when set.
    #[ortho_config()]
    pub gemini_api_key: Option<String>,

    /// Anthropic API key; the Anthropic provider joins the summary chain
    /// when set.
    #[ortho_config()]
    pub anthropic_api_key: Option<String>,

    /// Grok API key; the Grok provider joins the summary chain when set.
    #[ortho_config()]
    pub grok_api_key: Option<String>,
}

impl RecapConfig {
    /// Resolves the token from configuration or the legacy `GITHUB_TOKEN`
    /// environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityError::MissingToken`] when no token source provides
    /// a value.
    pub fn resolve_token(&self) -> Result<String, ActivityError> {
        self.token
            .clone()
            .or_else(|| env::var("GITHUB_TOKEN").ok())
            .ok_or(ActivityError::MissingToken)
    }

    /// Returns the configured listen address or the default.
    #[must_use]
    pub fn resolve_bind_addr(&self) -> String {
        self.bind_addr
            .clone()
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned())
    }

    /// Returns the configured GitHub API base or the public default.
    #[must_use]
    pub fn resolve_github_api_base(&self) -> String {
        self.github_api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_GITHUB_API_BASE.to_owned())
    }

    /// Resolves the Gemini key from configuration or `GEMINI_API_KEY`.
    #[must_use]
    pub fn resolve_gemini_api_key(&self) -> Option<String> {
        self.gemini_api_key
            .clone()
            .or_else(|| env::var("GEMINI_API_KEY").ok())
    }

    /// Resolves the Anthropic key from configuration or `ANTHROPIC_API_KEY`.
    #[must_use]
    pub fn resolve_anthropic_api_key(&self) -> Option<String> {
        self.anthropic_api_key
            .clone()
            .or_else(|| env::var("ANTHROPIC_API_KEY").ok())
    }

    /// Resolves the Grok key from configuration or `GROK_API_KEY`.
    #[must_use]
    pub fn resolve_grok_api_key(&self) -> Option<String> {
        self.grok_api_key
            .clone()
            .or_else(|| env::var("GROK_API_KEY").ok())
    }
}
