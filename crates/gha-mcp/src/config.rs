//! Configuration loading and credential resolution.
//!
//! Settings come from an optional TOML file (`gha-mcp.toml` by default) plus
//! command-line flags and the `GITHUB_TOKEN` environment variable. Flags win
//! over the config file, which wins over the environment.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use gha_tools::Credentials;
use serde::Deserialize;

/// Default config file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "gha-mcp.toml";

const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// Parsed contents of `gha-mcp.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,
}

/// GitHub connection settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// Personal access token.
    pub token: Option<String>,
    /// API endpoint override for GitHub Enterprise installs.
    pub endpoint: Option<String>,
}

impl Config {
    /// Loads the config file.
    ///
    /// An explicitly given path must exist; the default path is optional and
    /// an absent file yields the default (empty) config.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit path cannot be read, or if the file
    /// contents are not valid TOML.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if !required && err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read config file: {}", path.display()));
            }
        };

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }
}

/// Shared GitHub connection flags for commands that build a client.
#[derive(Debug, clap::Args)]
pub struct GitHubArgs {
    /// GitHub personal access token. Falls back to the config file, then the
    /// `GITHUB_TOKEN` environment variable.
    #[arg(short, long)]
    pub token: Option<String>,

    /// GitHub API endpoint (for GitHub Enterprise installs).
    #[arg(short, long)]
    pub endpoint: Option<String>,

    /// Path to the config file (defaults to `gha-mcp.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl GitHubArgs {
    /// Resolves credentials from flags, the config file, and the
    /// environment, in that order.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded.
    pub fn credentials(&self) -> Result<Credentials> {
        let config = Config::load(self.config.as_deref())?;
        Ok(resolve_credentials(
            self,
            &config,
            std::env::var(TOKEN_ENV_VAR).ok(),
        ))
    }
}

/// Merges flags, config file, and environment into credentials. Flags win,
/// then the config file, then the environment.
fn resolve_credentials(
    args: &GitHubArgs,
    config: &Config,
    env_token: Option<String>,
) -> Credentials {
    let token = args
        .token
        .clone()
        .or_else(|| config.github.token.clone())
        .or(env_token)
        .filter(|token| !token.trim().is_empty());

    let endpoint = args.endpoint.clone().or_else(|| config.github.endpoint.clone());

    Credentials { token, endpoint }
}

/// Fails with a setup hint when no token is configured. Commands that hit
/// the GitHub API call this up front instead of failing on the first request.
///
/// # Errors
///
/// Returns an error naming `GITHUB_TOKEN` when the credentials carry no
/// token.
pub fn require_token(credentials: &Credentials) -> Result<()> {
    if credentials.token.is_none() {
        bail!(
            "no GitHub token configured: set {TOKEN_ENV_VAR}, pass --token, or add it to {DEFAULT_CONFIG_FILE}"
        );
    }
    Ok(())
}
