//! Invokes a tool from the command line for testing.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use gha_tools::{GitHubClient, RegistryError, github_actions_registry};

use crate::config;

#[derive(Args)]
pub struct CallArgs {
    /// Tool ID to call (e.g., `list_workflows`).
    pub tool: String,

    /// Input JSON, or @file.json to read the input from a file.
    pub input: String,

    #[command(flatten)]
    pub github: config::GitHubArgs,
}

/// Executes the call command.
///
/// Tool failures (API errors and the like) are printed as results; only
/// unusable invocations (unknown tool, malformed input) are command errors.
///
/// # Errors
///
/// Returns an error if the input cannot be read or parsed, the tool is not
/// registered, or the input does not match the tool's schema.
pub async fn run(args: &CallArgs) -> Result<()> {
    let input_json = if let Some(path) = args.input.strip_prefix('@') {
        let path = PathBuf::from(path);
        std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read input file: {}", path.display()))?
    } else {
        args.input.clone()
    };

    let input_value: serde_json::Value =
        serde_json::from_str(&input_json).context("invalid input JSON")?;

    println!(
        "{} Calling tool: {}",
        style("→").cyan(),
        style(&args.tool).bold()
    );

    let credentials = args.github.credentials()?;
    let client = GitHubClient::new(&credentials)?;
    let registry = github_actions_registry(client)?;

    match registry.call(&args.tool, input_value).await {
        Ok(output) => {
            println!("{} Result:", style("✓").green().bold());
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Err(err @ RegistryError::Invocation { .. }) => {
            println!("{} Error: {err:#}", style("✗").red().bold());
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}
