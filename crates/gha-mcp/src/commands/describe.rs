//! Displays detailed information about a specific tool.

use anyhow::Result;
use clap::Args;
use console::style;
use gha_tools::{GitHubClient, github_actions_registry};

use crate::config;

#[derive(Args)]
pub struct DescribeArgs {
    /// Tool ID to describe (e.g., `list_workflows`).
    pub tool: String,

    #[command(flatten)]
    pub github: config::GitHubArgs,
}

/// Executes the describe command.
///
/// # Errors
///
/// Returns an error if the tool is not registered or schemas cannot be
/// serialized.
pub fn run(args: &DescribeArgs) -> Result<()> {
    let credentials = args.github.credentials()?;
    let client = GitHubClient::new(&credentials)?;
    let registry = github_actions_registry(client)?;

    let Some(handle) = registry.get(&args.tool) else {
        anyhow::bail!("tool not found: {}", args.tool);
    };
    let info = handle.info();

    println!("{}", style("Tool Details").bold().underlined());
    println!();

    println!("{}: {}", style("ID").cyan(), info.name);

    if !info.display_name.is_empty() {
        println!("{}: {}", style("Name").cyan(), info.display_name);
    }

    if !info.description.is_empty() {
        println!("{}: {}", style("Description").cyan(), info.description);
    }

    if !info.tags.is_empty() {
        println!("{}: {}", style("Tags").cyan(), info.tags.join(", "));
    }

    println!();
    println!("{}", style("Input Schema").bold().underlined());
    println!("{}", serde_json::to_string_pretty(&info.input_schema)?);

    println!();
    println!("{}", style("Output Schema").bold().underlined());
    println!("{}", serde_json::to_string_pretty(&info.output_schema)?);

    Ok(())
}
