//! MCP server and CLI for GitHub Actions workflows.
//!
//! Usage:
//! ```bash
//! gha-mcp serve                     # Run MCP server on stdio
//! gha-mcp serve --http              # Run MCP server over streamable HTTP
//! gha-mcp list                      # List available tools
//! gha-mcp describe <tool>           # Show tool details
//! gha-mcp call <tool> <json>        # Invoke a tool
//! gha-mcp check <file>              # Validate a workflow file
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod server;

#[derive(Debug, Parser)]
#[command(name = "gha-mcp")]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the MCP server (stdio by default, HTTP with --http)
    Serve(commands::serve::ServeArgs),

    /// List available tools
    List(commands::list::ListArgs),

    /// Describe a specific tool
    Describe(commands::describe::DescribeArgs),

    /// Call a tool for testing
    Call(commands::call::CallArgs),

    /// Validate a workflow file
    Check(commands::check::CheckArgs),
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serve(_) => f.debug_tuple("Serve").finish(),
            Self::List(_) => f.debug_tuple("List").finish(),
            Self::Describe(_) => f.debug_tuple("Describe").finish(),
            Self::Call(_) => f.debug_tuple("Call").finish(),
            Self::Check(_) => f.debug_tuple("Check").finish(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdio transport framing on stdout stays clean.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("info".parse().context("failed to parse log directive")?),
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Command::Serve(args) => commands::serve::run(args).await,
        Command::List(args) => commands::list::run(args),
        Command::Describe(args) => commands::describe::run(args),
        Command::Call(args) => commands::call::run(args).await,
        Command::Check(args) => commands::check::run(args),
    }
}
