//! List the tools exposed by the server.
//!
//! Listing works entirely from registry metadata, so no GitHub token is
//! required. Supports both table and JSON output formats.

use anyhow::Result;
use clap::Args;
use console::style;
use gha_tools::{GitHubClient, ToolInfo, github_actions_registry};

use crate::config;

/// Command-line arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// Output format: "table" for human-readable output or "json" for
    /// machine-readable JSON
    #[arg(short, long, default_value = "table")]
    pub format: String,

    #[command(flatten)]
    pub github: config::GitHubArgs,
}

/// Truncates a description to fit within a 40 character table column,
/// appending "..." when the input is longer.
fn truncate_description(description: &str) -> String {
    const MAX_DESCRIPTION_CHARS: usize = 40;
    const ELLIPSIS: &str = "...";
    const TRUNCATED_CHARS: usize = MAX_DESCRIPTION_CHARS - ELLIPSIS.len();

    let mut chars = description.chars();
    let first_40: String = chars.by_ref().take(MAX_DESCRIPTION_CHARS).collect();

    if chars.next().is_none() {
        return first_40;
    }

    let prefix: String = first_40.chars().take(TRUNCATED_CHARS).collect();
    format!("{prefix}{ELLIPSIS}")
}

/// Executes the list command.
///
/// # Errors
///
/// Returns an error if the config file cannot be loaded or JSON
/// serialization fails.
pub fn run(args: &ListArgs) -> Result<()> {
    let credentials = args.github.credentials()?;
    let client = GitHubClient::new(&credentials)?;
    let registry = github_actions_registry(client)?;

    if args.format == "json" {
        let tools_json: Vec<serde_json::Value> = registry.list().map(tool_to_json).collect();
        println!("{}", serde_json::to_string_pretty(&tools_json)?);
    } else {
        println!(
            "{:<28} {:<28} {}",
            style("TOOL ID").bold(),
            style("NAME").bold(),
            style("DESCRIPTION").bold()
        );
        println!("{}", "-".repeat(96));

        for info in registry.list() {
            let desc_truncated = truncate_description(&info.description);
            println!(
                "{:<28} {:<28} {desc_truncated}",
                info.name, info.display_name
            );
        }

        println!(
            "\n{} {} tool(s) available",
            style("✓").green(),
            registry.len()
        );
    }

    Ok(())
}

/// Converts tool metadata to a JSON value with camelCase keys.
fn tool_to_json(info: &ToolInfo) -> serde_json::Value {
    serde_json::json!({
        "name": info.name,
        "displayName": info.display_name,
        "description": info.description,
        "inputSchema": info.input_schema,
        "outputSchema": info.output_schema,
        "tags": info.tags,
    })
}
