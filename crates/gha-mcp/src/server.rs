//! MCP server handler over the tool registry.
//!
//! `GhaServer` implements `rmcp::ServerHandler`, bridging the Model Context
//! Protocol with the in-process tool registry. It handles tool discovery,
//! metadata conversion, dispatch, and error translation between registry
//! errors and MCP error responses.

use std::{borrow::Cow, sync::Arc};

use gha_tools::{RegistryError, ToolInfo, ToolRegistry};
use rmcp::{
    ErrorData, RoleServer,
    handler::server::ServerHandler,
    model::{
        CallToolRequestParams, CallToolResult, Content, JsonObject, ListToolsResult,
        PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
    transport::streamable_http_server::{
        StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
    },
};

const INSTRUCTIONS: &str = "GitHub Actions MCP Server provides tools to interact with GitHub \
Actions workflows. This server enables you to:

- List, view, and manage GitHub Actions workflows
- Validate workflow YAML syntax
- Get workflow run history and status
- Manage GitHub Actions secrets and environments
- Generate workflow templates for common use cases

Use these tools to streamline your CI/CD pipeline management with GitHub Actions.";

/// MCP server service exposing the GitHub Actions tools.
#[derive(Clone)]
pub struct GhaServer {
    registry: Arc<ToolRegistry>,
    info: ServerInfo,
}

impl GhaServer {
    /// Creates a new server over a registry, with tools capability enabled.
    #[must_use]
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            info: default_server_info(),
        }
    }

    /// Returns the shared registry, used for draining on shutdown.
    #[must_use]
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Creates a streamable HTTP service wrapping this handler.
    #[must_use]
    pub fn streamable_http_service(
        &self,
        config: StreamableHttpServerConfig,
    ) -> StreamableHttpService<Self, LocalSessionManager> {
        let service = self.clone();
        StreamableHttpService::new(move || Ok(service.clone()), Arc::default(), config)
    }
}

impl ServerHandler for GhaServer {
    fn get_info(&self) -> ServerInfo {
        self.info.clone()
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, ErrorData>> + Send + '_ {
        let registry = Arc::clone(&self.registry);
        async move {
            let tools = registry.list().map(tool_info_to_mcp).collect();
            Ok(ListToolsResult::with_all_items(tools))
        }
    }

    fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, ErrorData>> + Send + '_ {
        let registry = Arc::clone(&self.registry);
        async move {
            let input = request
                .arguments
                .map_or_else(|| serde_json::json!({}), serde_json::Value::Object);

            match registry.call(&request.name, input).await {
                Ok(value) => Ok(CallToolResult::structured(value)),
                Err(err @ RegistryError::NotFound(_)) => {
                    Err(ErrorData::resource_not_found(err.to_string(), None))
                }
                Err(err @ RegistryError::InvalidInput { .. }) => {
                    Err(ErrorData::invalid_params(err.to_string(), None))
                }
                // Tool failures (API errors and the like) are reported as
                // results so MCP clients can surface them to the model.
                Err(err) => Ok(CallToolResult::error(vec![Content::text(err.to_string())])),
            }
        }
    }
}

/// Creates the default server info with tools capability enabled.
fn default_server_info() -> ServerInfo {
    ServerInfo {
        capabilities: ServerCapabilities::builder().enable_tools().build(),
        instructions: Some(INSTRUCTIONS.to_string()),
        ..Default::default()
    }
}

/// Converts internal tool info to MCP tool format.
fn tool_info_to_mcp(info: &ToolInfo) -> Tool {
    Tool {
        name: Cow::Owned(info.name.clone()),
        title: non_empty_string(&info.display_name),
        description: non_empty_cow(&info.description),
        input_schema: Arc::new(schema_to_object(&info.input_schema)),
        output_schema: schema_to_object_option(&info.output_schema),
        annotations: None,
        execution: None,
        icons: None,
        meta: None,
    }
}

/// Returns `Some` trimmed string if non-empty, `None` otherwise.
fn non_empty_string(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Returns `Some` Cow-ified string if non-empty, `None` otherwise.
fn non_empty_cow(value: &str) -> Option<Cow<'static, str>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(Cow::Owned(trimmed.to_string()))
    }
}

/// Extracts a `JsonObject` from a schema value, returning an empty object
/// for non-object schemas.
fn schema_to_object(value: &serde_json::Value) -> JsonObject {
    match value {
        serde_json::Value::Object(map) => map.clone(),
        _ => JsonObject::default(),
    }
}

/// Like [`schema_to_object`], but `None` for non-object schemas.
fn schema_to_object_option(value: &serde_json::Value) -> Option<Arc<JsonObject>> {
    match value {
        serde_json::Value::Object(map) => Some(Arc::new(map.clone())),
        _ => None,
    }
}
