//! Validates a workflow file without touching the GitHub API.

use std::{io::Read, path::PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use console::style;
use gha_tools::{ValidationReport, validate_workflow};

#[derive(Args)]
pub struct CheckArgs {
    /// Workflow file to validate. Reads from stdin when omitted or "-".
    pub file: Option<PathBuf>,

    /// Output the validation report as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// Executes the check command.
///
/// # Errors
///
/// Returns an error if the input cannot be read, or if the workflow is
/// invalid, so the process exits non-zero for CI use.
pub fn run(args: &CheckArgs) -> Result<()> {
    let content = read_content(args.file.as_deref())?;
    let report = validate_workflow(&content);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_report(&report));
    }

    if !report.valid {
        bail!("workflow validation failed");
    }
    Ok(())
}

fn read_content(file: Option<&std::path::Path>) -> Result<String> {
    match file {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read workflow file: {}", path.display())),
        _ => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .context("failed to read workflow from stdin")?;
            Ok(content)
        }
    }
}

/// Renders a human-readable validation report.
fn render_report(report: &ValidationReport) -> String {
    let mut out = String::new();

    if report.valid {
        out.push_str(&format!("{} workflow is valid\n", style("✓").green().bold()));
    } else {
        out.push_str(&format!("{} workflow is invalid\n", style("✗").red().bold()));
    }

    for warning in &report.warnings {
        out.push_str(&format!("  {} {warning}\n", style("✗").red()));
    }
    for suggestion in &report.suggestions {
        out.push_str(&format!("  {} {suggestion}\n", style("→").cyan()));
    }

    out
}
