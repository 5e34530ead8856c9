//! MCP server command implementation.
//!
//! Runs the MCP server in one of two modes:
//!
//! - **stdio mode** (default): communicates over standard input/output,
//!   the standard transport for desktop MCP clients
//! - **HTTP mode** (`--http`): exposes a streamable HTTP endpoint on a
//!   configurable address and path
//!
//! Both modes shut down gracefully on Ctrl+C and drain in-flight tool
//! invocations before exiting.

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use gha_tools::{GitHubClient, github_actions_registry};
use rmcp::{
    service::ServiceExt,
    transport::{stdio, streamable_http_server::StreamableHttpServerConfig},
};
use tokio::signal;
use tracing::info;

use crate::{config, server::GhaServer};

/// Command-line arguments for the serve subcommand.
#[derive(Args)]
pub struct ServeArgs {
    /// Run over streamable HTTP instead of stdio.
    #[arg(long, default_value_t = false)]
    pub http: bool,

    /// Address to bind the HTTP server to (with --http).
    #[arg(short = 'a', long, default_value = "127.0.0.1:3333")]
    pub addr: String,

    /// HTTP path for the MCP endpoint (with --http).
    #[arg(long, default_value = "/mcp")]
    pub path: String,

    #[command(flatten)]
    pub github: config::GitHubArgs,
}

/// Runs the MCP server with a Ctrl+C shutdown handler.
///
/// # Errors
///
/// Returns an error if no token is configured, the registry fails to build,
/// or the chosen transport fails to start.
pub async fn run(args: &ServeArgs) -> Result<()> {
    let credentials = args.github.credentials()?;
    config::require_token(&credentials)?;

    let client = GitHubClient::new(&credentials)?;
    let server = GhaServer::new(Arc::new(github_actions_registry(client)?));

    if args.http {
        let shutdown = async {
            let _ = signal::ctrl_c().await;
            info!("Received shutdown signal");
        };
        run_http(&server, &args.addr, &args.path, shutdown).await
    } else {
        run_stdio(&server).await
    }
}

/// Runs the streamable HTTP server until the shutdown future completes.
async fn run_http<F>(server: &GhaServer, addr: &str, path: &str, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    println!("{} Starting MCP server...", style("→").cyan());
    println!(
        "{} Loaded {} tool(s)",
        style("✓").green().bold(),
        server.registry().len()
    );

    let addr: SocketAddr = addr
        .parse()
        .with_context(|| format!("invalid --addr value: {addr}"))?;
    let path = normalize_path(path);

    let service = server.streamable_http_service(StreamableHttpServerConfig {
        // Stateless mode keeps compatibility with MCP clients that don't send
        // the initialized notification after initialize.
        stateful_mode: false,
        ..Default::default()
    });
    let router = axum::Router::new().nest_service(path.as_str(), service);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind MCP server on {addr}"))?;

    info!(address = %addr, path = %path, "Starting MCP server");

    println!(
        "{} MCP server running on http://{addr}{path}",
        style("✓").green().bold()
    );
    println!("Press Ctrl+C to stop\n");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("mcp server error")?;

    info!("Draining inflight requests");
    server.registry().drain().await;

    info!("MCP server stopped");
    Ok(())
}

/// Runs the MCP server in stdio mode.
///
/// Startup messages go to stderr; stdout carries only protocol framing.
async fn run_stdio(server: &GhaServer) -> Result<()> {
    eprintln!("{} Starting MCP stdio server...", style("→").cyan());
    eprintln!(
        "{} Loaded {} tool(s)",
        style("✓").green().bold(),
        server.registry().len()
    );

    let (stdin, stdout) = stdio();
    let running = server
        .clone()
        .serve((stdin, stdout))
        .await
        .context("failed to start MCP stdio server")?;

    eprintln!("{} MCP stdio server running", style("✓").green().bold());
    eprintln!("Press Ctrl+C to stop\n");

    let cancel = running.cancellation_token();
    let mut waiting = Box::pin(running.waiting());

    tokio::select! {
        result = &mut waiting => {
            result.context("mcp stdio server exited")?;
        }
        _ = signal::ctrl_c() => {
            cancel.cancel();
            let _ = waiting.await;
        }
    }

    info!("Draining inflight requests");
    server.registry().drain().await;
    info!("MCP stdio server stopped");
    Ok(())
}

/// Normalizes an HTTP path to ensure it starts with `/`. An empty path falls
/// back to the default `/mcp`.
fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        "/mcp".to_string()
    } else if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}
