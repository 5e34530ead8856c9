//! Tool registry and dispatch for the GitHub Actions tools.
//!
//! The registry is built around three types:
//!
//! - [`ToolRegistry`]: Central registry owning all registered tools
//! - [`ToolHandle`]: Runtime handle for invoking a specific tool
//! - [`ToolInfo`]: Immutable metadata describing a tool's interface
//!
//! Tools are registered with typed input and output: the registry generates
//! their JSON Schemas, deserializes incoming JSON into the input type, and
//! serializes the handler's output back to JSON. Callers only deal with
//! `serde_json::Value` at the boundary.
//!
//! # Thread Safety
//!
//! Registration takes `&mut self`; register every tool before wrapping the
//! registry in [`Arc`]. Once shared, `get`, `list`, and `call` can run
//! concurrently, and the in-flight counter uses atomic operations so
//! shutdown can wait for active invocations to finish.

use std::{
    collections::BTreeMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use futures::future::BoxFuture;
use schemars::JsonSchema;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{info, instrument};

use crate::{client::GitHubClient, tools};

/// Errors that can occur during tool registry operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// No tool with the given name is registered.
    #[error("tool not found: {0}")]
    NotFound(String),

    /// Attempted to register a tool under a name that already exists.
    #[error("duplicate tool ID: {0}")]
    DuplicateId(String),

    /// The input JSON did not match the tool's input schema.
    #[error("invalid input for tool {tool}: {message}")]
    InvalidInput {
        /// Name of the tool that rejected the input.
        tool: String,
        /// Deserialization failure detail.
        message: String,
    },

    /// Tool invocation failed at runtime.
    #[error("tool {tool} failed: {source}")]
    Invocation {
        /// Name of the tool that failed.
        tool: String,
        /// Underlying failure.
        source: anyhow::Error,
    },
}

/// Immutable metadata describing a tool's interface.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Tool identifier used for dispatch (`snake_case`).
    pub name: String,
    /// Human-readable display name.
    pub display_name: String,
    /// Description of the tool's purpose.
    pub description: String,
    /// JSON Schema for input validation.
    pub input_schema: serde_json::Value,
    /// JSON Schema describing the output format.
    pub output_schema: serde_json::Value,
    /// Tags for categorization.
    pub tags: Vec<String>,
}

type ToolHandler = Box<
    dyn Fn(serde_json::Value) -> BoxFuture<'static, Result<serde_json::Value, RegistryError>>
        + Send
        + Sync,
>;

/// Runtime handle for invoking a specific tool.
///
/// Handles are shared via [`Arc`] so invocations can run concurrently on
/// different tasks.
pub struct ToolHandle {
    info: ToolInfo,
    handler: ToolHandler,
}

impl ToolHandle {
    /// Returns a reference to this tool's metadata.
    #[must_use]
    pub fn info(&self) -> &ToolInfo {
        &self.info
    }

    /// Invokes the tool with the provided JSON input.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidInput`] if the input does not match
    /// the tool's input type, or [`RegistryError::Invocation`] if the tool
    /// itself fails.
    #[instrument(skip(self, input), fields(tool = %self.info.name))]
    pub async fn call(&self, input: serde_json::Value) -> Result<serde_json::Value, RegistryError> {
        (self.handler)(input).await
    }
}

impl std::fmt::Debug for ToolHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolHandle")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

/// Central registry owning all registered tools.
///
/// Tools are keyed by name in a [`BTreeMap`], so listing order is stable
/// regardless of registration order.
#[derive(Debug)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<ToolHandle>>,
    inflight: AtomicU64,
}

/// RAII guard for tracking in-flight tool requests.
///
/// Increments the registry's in-flight counter on creation and decrements it
/// when dropped, so the count stays accurate even when an invocation fails.
#[must_use = "if unused, the in-flight request will be immediately ended"]
pub struct InflightRequestGuard<'a> {
    registry: &'a ToolRegistry,
}

impl Drop for InflightRequestGuard<'_> {
    fn drop(&mut self) {
        self.registry.end_request();
    }
}

impl ToolRegistry {
    /// Creates a new, empty tool registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
            inflight: AtomicU64::new(0),
        }
    }

    /// Registers a tool with a typed handler.
    ///
    /// The input and output JSON Schemas are generated from the handler's
    /// types. Input deserialization and output serialization happen inside
    /// the stored handler, so dispatch works on plain JSON values.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateId`] if a tool with this name is
    /// already registered.
    pub fn register<I, O, F, Fut>(
        &mut self,
        name: &str,
        display_name: &str,
        description: &str,
        tags: &[&str],
        handler: F,
    ) -> Result<(), RegistryError>
    where
        I: DeserializeOwned + JsonSchema,
        O: Serialize + JsonSchema,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<O>> + Send + 'static,
    {
        if self.tools.contains_key(name) {
            return Err(RegistryError::DuplicateId(name.to_string()));
        }

        let info = ToolInfo {
            name: name.to_string(),
            display_name: display_name.to_string(),
            description: description.to_string(),
            input_schema: schemars::schema_for!(I).to_value(),
            output_schema: schemars::schema_for!(O).to_value(),
            tags: tags.iter().map(ToString::to_string).collect(),
        };

        let handler = Arc::new(handler);
        let tool_name = name.to_string();
        let boxed: ToolHandler = Box::new(move |input: serde_json::Value| {
            let handler = Arc::clone(&handler);
            let tool = tool_name.clone();
            Box::pin(async move {
                let input: I =
                    serde_json::from_value(input).map_err(|err| RegistryError::InvalidInput {
                        tool: tool.clone(),
                        message: err.to_string(),
                    })?;
                let output = handler(input)
                    .await
                    .map_err(|source| RegistryError::Invocation {
                        tool: tool.clone(),
                        source,
                    })?;
                serde_json::to_value(output).map_err(|err| RegistryError::Invocation {
                    tool,
                    source: err.into(),
                })
            })
        });

        info!(name, "Registered tool");
        self.tools.insert(
            name.to_string(),
            Arc::new(ToolHandle {
                info,
                handler: boxed,
            }),
        );

        Ok(())
    }

    /// Gets a tool handle by name.
    ///
    /// Returns `None` if the tool is not registered.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<ToolHandle>> {
        self.tools.get(name).cloned()
    }

    /// Returns an iterator over all registered tools' metadata, in name
    /// order.
    pub fn list(&self) -> impl Iterator<Item = &ToolInfo> {
        self.tools.values().map(|handle| &handle.info)
    }

    /// Returns the number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns `true` if no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Dispatches an invocation to the named tool, tracking it as in-flight
    /// for the duration of the call.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown tool name, or the
    /// handle's own invocation errors.
    pub async fn call(
        &self,
        name: &str,
        input: serde_json::Value,
    ) -> Result<serde_json::Value, RegistryError> {
        let _guard = self.start_request_guard();
        let handle = self
            .get(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        handle.call(input).await
    }

    /// Increments the in-flight request counter.
    pub fn start_request(&self) {
        self.inflight.fetch_add(1, Ordering::Relaxed);
    }

    /// Creates a guard that tracks an in-flight request, decrementing the
    /// counter when dropped.
    #[must_use = "dropping the guard immediately will end the request"]
    pub fn start_request_guard(&self) -> InflightRequestGuard<'_> {
        self.start_request();
        InflightRequestGuard { registry: self }
    }

    /// Decrements the in-flight request counter, saturating at zero.
    pub fn end_request(&self) {
        let _ = self
            .inflight
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                Some(current.saturating_sub(1))
            });
    }

    /// Returns the current number of in-flight requests.
    #[must_use]
    pub fn inflight_count(&self) -> u64 {
        self.inflight.load(Ordering::Relaxed)
    }

    /// Waits for all in-flight requests to complete, polling the counter
    /// every 10ms. Used during shutdown.
    pub async fn drain(&self) {
        while self.inflight_count() > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the registry with the full GitHub Actions tool set.
///
/// # Errors
///
/// Returns [`RegistryError::DuplicateId`] if two tools register under the
/// same name, which indicates a bug in this function.
pub fn github_actions_registry(client: GitHubClient) -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();

    let c = client.clone();
    registry.register(
        "list_workflows",
        "List Workflows",
        "List the GitHub Actions workflows defined in a repository, with their names, paths, states, and URLs.",
        &["github", "actions", "workflows"],
        move |input: tools::ListWorkflowsInput| {
            let client = c.clone();
            async move { tools::list_workflows(&client, input).await }
        },
    )?;

    let c = client.clone();
    registry.register(
        "get_workflow",
        "Get Workflow",
        "Fetch a workflow's metadata and the raw YAML content of its file, selected by ID, name, or filename.",
        &["github", "actions", "workflows"],
        move |input: tools::GetWorkflowInput| {
            let client = c.clone();
            async move { tools::get_workflow(&client, input).await }
        },
    )?;

    let c = client.clone();
    registry.register(
        "list_workflow_runs",
        "List Workflow Runs",
        "List recent workflow runs for a repository, optionally scoped to one workflow and filtered by status.",
        &["github", "actions", "runs"],
        move |input: tools::ListWorkflowRunsInput| {
            let client = c.clone();
            async move { tools::list_workflow_runs(&client, input).await }
        },
    )?;

    let c = client.clone();
    registry.register(
        "create_or_update_workflow",
        "Create or Update Workflow",
        "Create or update a workflow file in a repository through the contents API. Content must be valid YAML.",
        &["github", "actions", "workflows", "write"],
        move |input: tools::CreateOrUpdateWorkflowInput| {
            let client = c.clone();
            async move { tools::create_or_update_workflow(&client, input).await }
        },
    )?;

    let c = client.clone();
    registry.register(
        "list_secrets",
        "List Secrets",
        "List repository secret names and timestamps. Secret values are never exposed.",
        &["github", "actions", "secrets"],
        move |input: tools::ListSecretsInput| {
            let client = c.clone();
            async move { tools::list_secrets(&client, input).await }
        },
    )?;

    let c = client.clone();
    registry.register(
        "list_environments",
        "List Environments",
        "List deployment environments with their protection settings (required reviewers, wait timer).",
        &["github", "environments"],
        move |input: tools::ListEnvironmentsInput| {
            let client = c.clone();
            async move { tools::list_environments(&client, input).await }
        },
    )?;

    let c = client.clone();
    registry.register(
        "validate_workflow",
        "Validate Workflow",
        "Validate workflow YAML content for structural problems and best-practice suggestions. Works offline.",
        &["github", "actions", "validation"],
        move |input: tools::ValidateWorkflowInput| {
            let client = c.clone();
            async move { tools::validate_workflow(&client, input).await }
        },
    )?;

    registry.register(
        "get_workflow_templates",
        "Get Workflow Templates",
        "Return bundled workflow templates for common CI/CD setups (Python, Node.js, Rust, Docker, AWS, Terraform).",
        &["github", "actions", "templates"],
        move |input: tools::GetWorkflowTemplatesInput| {
            let client = client.clone();
            async move { tools::get_workflow_templates(&client, input).await }
        },
    )?;

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::client::Credentials;

    #[derive(Debug, Deserialize, JsonSchema)]
    struct EchoInput {
        message: String,
    }

    #[derive(Debug, Serialize, JsonSchema)]
    struct EchoOutput {
        message: String,
    }

    fn echo_registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry
            .register(
                "echo",
                "Echo",
                "Echoes the input message.",
                &["test"],
                |input: EchoInput| async move {
                    Ok(EchoOutput {
                        message: input.message,
                    })
                },
            )
            .unwrap();
        registry
    }

    #[tokio::test]
    async fn test_call_dispatches_to_registered_tool() {
        let registry = echo_registry();
        let output = registry
            .call("echo", json!({ "message": "hello" }))
            .await
            .unwrap();
        assert_eq!(output, json!({ "message": "hello" }));
    }

    #[tokio::test]
    async fn test_call_unknown_tool_returns_not_found() {
        let registry = echo_registry();
        let err = registry.call("missing", json!({})).await.unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(name) if name == "missing"));
    }

    #[tokio::test]
    async fn test_call_with_bad_input_returns_invalid_input() {
        let registry = echo_registry();
        let err = registry
            .call("echo", json!({ "message": 42 }))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidInput { tool, .. } if tool == "echo"));
    }

    #[tokio::test]
    async fn test_failing_handler_returns_invocation_error() {
        let mut registry = ToolRegistry::new();
        registry
            .register(
                "fail",
                "Fail",
                "Always fails.",
                &[],
                |_input: EchoInput| async move {
                    Err::<EchoOutput, anyhow::Error>(anyhow::anyhow!("boom"))
                },
            )
            .unwrap();

        let err = registry
            .call("fail", json!({ "message": "x" }))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Invocation { ref tool, .. } if tool == "fail"));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_duplicate_registration_returns_error() {
        let mut registry = echo_registry();
        let result = registry.register(
            "echo",
            "Echo Again",
            "Duplicate.",
            &[],
            |input: EchoInput| async move {
                Ok(EchoOutput {
                    message: input.message,
                })
            },
        );
        assert!(matches!(result, Err(RegistryError::DuplicateId(name)) if name == "echo"));
    }

    #[test]
    fn test_registered_info_carries_schemas() {
        let registry = echo_registry();
        let info = registry.get("echo").unwrap().info().clone();
        assert_eq!(info.display_name, "Echo");
        assert_eq!(info.tags, vec!["test"]);
        assert_eq!(
            info.input_schema["properties"]["message"]["type"],
            json!("string")
        );
        assert_eq!(
            info.output_schema["properties"]["message"]["type"],
            json!("string")
        );
    }

    #[test]
    fn test_inflight_guard_tracks_requests() {
        let registry = echo_registry();
        assert_eq!(registry.inflight_count(), 0);
        {
            let _guard = registry.start_request_guard();
            assert_eq!(registry.inflight_count(), 1);
            let _second = registry.start_request_guard();
            assert_eq!(registry.inflight_count(), 2);
        }
        assert_eq!(registry.inflight_count(), 0);
    }

    #[test]
    fn test_end_request_saturates_at_zero() {
        let registry = echo_registry();
        registry.end_request();
        assert_eq!(registry.inflight_count(), 0);
    }

    #[tokio::test]
    async fn test_drain_returns_once_requests_finish() {
        let registry = Arc::new(echo_registry());
        registry.start_request();

        let background = Arc::clone(&registry);
        let release = tokio::spawn(async move {
            tokio::time::sleep(tokio::time::Duration::from_millis(30)).await;
            background.end_request();
        });

        registry.drain().await;
        assert_eq!(registry.inflight_count(), 0);
        release.await.unwrap();
    }

    #[test]
    fn test_github_actions_registry_registers_all_tools() {
        let client = GitHubClient::new(&Credentials::default()).unwrap();
        let registry = github_actions_registry(client).unwrap();

        let names: Vec<_> = registry.list().map(|info| info.name.clone()).collect();
        assert_eq!(
            names,
            vec![
                "create_or_update_workflow",
                "get_workflow",
                "get_workflow_templates",
                "list_environments",
                "list_secrets",
                "list_workflow_runs",
                "list_workflows",
                "validate_workflow",
            ]
        );
        assert_eq!(registry.len(), 8);
    }
}
