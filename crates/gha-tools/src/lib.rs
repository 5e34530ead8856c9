//! GitHub Actions integration for the gha toolbox.
//!
//! Provides a GitHub REST client, typed API models, a workflow YAML
//! validator, bundled workflow templates, the tool operations, and a
//! registry that exposes the tools for dispatch by name.

pub mod client;
pub mod registry;
pub mod templates;
pub mod tools;
pub mod types;
pub mod validate;

pub use client::{Credentials, GitHubClient};
pub use registry::{RegistryError, ToolHandle, ToolInfo, ToolRegistry, github_actions_registry};
pub use validate::{ValidationReport, validate_workflow};
