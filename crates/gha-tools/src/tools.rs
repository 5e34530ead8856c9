//! Tool operations over the GitHub Actions API.

use anyhow::{Result, bail, ensure};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    client::GitHubClient,
    templates,
    types::{
        ContentFile, EnvironmentSummary, FileCommit, ListEnvironmentsResponse,
        ListSecretsResponse, ListWorkflowRunsResponse, ListWorkflowsResponse, ProtectionRules,
        PutContentsResponse, RepoSecret, WorkflowRunStatus, WorkflowRunSummary, WorkflowSummary,
    },
    validate::{ValidationReport, validate_workflow as run_validation},
};

const DEFAULT_COMMIT_MESSAGE: &str = "Update workflow via GitHub Actions MCP Server";

// ============================================================================
// list_workflows
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListWorkflowsInput {
    /// Repository owner (username or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Maximum number of workflows to return (1-100). Defaults to 30.
    #[serde(default)]
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ListWorkflowsOutput {
    pub workflows: Vec<WorkflowSummary>,
}

/// # List GitHub Actions Workflows
///
/// Lists the GitHub Actions workflows defined in a repository, including
/// their names, file paths, states, and URLs. Use this to discover what
/// automation a repository has before fetching or editing a workflow.
///
/// # Errors
///
/// Returns an error if:
/// - The owner or repo fields are empty or contain only whitespace
/// - The `per_page` value is outside the valid range (1-100)
/// - The GitHub API request fails or returns a non-success status code
pub async fn list_workflows(
    client: &GitHubClient,
    input: ListWorkflowsInput,
) -> Result<ListWorkflowsOutput> {
    ensure!(!input.owner.trim().is_empty(), "owner must not be empty");
    ensure!(!input.repo.trim().is_empty(), "repo must not be empty");

    let per_page = input.per_page.unwrap_or(30);
    ensure!(
        (1..=100).contains(&per_page),
        "per_page must be between 1 and 100"
    );

    let url =
        client.url_with_segments(&["repos", &input.owner, &input.repo, "actions", "workflows"])?;
    let query = [("per_page", per_page.to_string())];

    let response: ListWorkflowsResponse = client.get_json(url, &query).await?;

    Ok(ListWorkflowsOutput {
        workflows: response.workflows,
    })
}

// ============================================================================
// get_workflow
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetWorkflowInput {
    /// Repository owner (username or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Workflow selector: a numeric workflow ID, a workflow name, or a
    /// filename such as "ci.yml".
    pub workflow: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct GetWorkflowOutput {
    pub workflow: WorkflowSummary,
    /// Raw YAML content of the workflow file.
    pub content: String,
    /// Parsed YAML content, or null if the file is not valid YAML.
    pub parsed_yaml: Option<serde_json::Value>,
}

/// # Get GitHub Actions Workflow
///
/// Fetches a single workflow's metadata plus the raw content of its YAML
/// file. Non-numeric selectors are resolved by listing the repository's
/// workflows and matching the workflow name or the file path suffix.
///
/// Parsing the fetched YAML is best effort: a file that does not parse still
/// returns its raw content, with `parsed_yaml` set to null.
///
/// # Errors
///
/// Returns an error if:
/// - The owner, repo, or workflow fields are empty or contain only whitespace
/// - No workflow matches the selector
/// - The workflow file content cannot be decoded
/// - The GitHub API request fails or returns a non-success status code
pub async fn get_workflow(
    client: &GitHubClient,
    input: GetWorkflowInput,
) -> Result<GetWorkflowOutput> {
    ensure!(!input.owner.trim().is_empty(), "owner must not be empty");
    ensure!(!input.repo.trim().is_empty(), "repo must not be empty");
    ensure!(
        !input.workflow.trim().is_empty(),
        "workflow must not be empty"
    );

    let workflow = resolve_workflow(client, &input.owner, &input.repo, &input.workflow).await?;

    let url = contents_url(client, &input.owner, &input.repo, &workflow.path)?;
    let file: ContentFile = client.get_json(url, &[]).await?;
    let content = decode_file_content(&file)?;

    let parsed_yaml = serde_yaml::from_str::<serde_json::Value>(&content).ok();

    Ok(GetWorkflowOutput {
        workflow,
        content,
        parsed_yaml,
    })
}

// ============================================================================
// list_workflow_runs
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListWorkflowRunsInput {
    /// Repository owner (username or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Optional workflow selector (numeric ID, name, or filename) to scope
    /// runs to one workflow.
    #[serde(default)]
    pub workflow: Option<String>,
    /// Optional status filter (queued, `in_progress`, completed, waiting).
    #[serde(default)]
    pub status: Option<WorkflowRunStatus>,
    /// Maximum number of runs to return (1-100). Defaults to 10.
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ListWorkflowRunsOutput {
    pub runs: Vec<WorkflowRunSummary>,
}

/// # List GitHub Actions Workflow Runs
///
/// Lists recent workflow runs for a repository, optionally scoped to one
/// workflow and filtered by status. Useful for checking CI health and
/// finding failed runs to debug.
///
/// # Errors
///
/// Returns an error if:
/// - The owner or repo fields are empty or contain only whitespace
/// - The workflow selector is provided but empty, or matches no workflow
/// - The `limit` value is outside the valid range (1-100)
/// - The GitHub API request fails or returns a non-success status code
pub async fn list_workflow_runs(
    client: &GitHubClient,
    input: ListWorkflowRunsInput,
) -> Result<ListWorkflowRunsOutput> {
    ensure!(!input.owner.trim().is_empty(), "owner must not be empty");
    ensure!(!input.repo.trim().is_empty(), "repo must not be empty");

    let limit = input.limit.unwrap_or(10);
    ensure!(
        (1..=100).contains(&limit),
        "limit must be between 1 and 100"
    );

    let url = if let Some(selector) = &input.workflow {
        ensure!(
            !selector.trim().is_empty(),
            "workflow must not be empty when provided"
        );
        let workflow = resolve_workflow(client, &input.owner, &input.repo, selector).await?;
        client.url_with_segments(&[
            "repos",
            &input.owner,
            &input.repo,
            "actions",
            "workflows",
            &workflow.id.to_string(),
            "runs",
        ])?
    } else {
        client.url_with_segments(&["repos", &input.owner, &input.repo, "actions", "runs"])?
    };

    let mut query = vec![("per_page", limit.to_string())];
    if let Some(status) = input.status {
        query.push(("status", status.as_query_str().to_string()));
    }

    let response: ListWorkflowRunsResponse = client.get_json(url, &query).await?;

    let mut runs = response.workflow_runs;
    runs.truncate(usize::try_from(limit).unwrap_or(usize::MAX));

    Ok(ListWorkflowRunsOutput { runs })
}

// ============================================================================
// create_or_update_workflow
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateOrUpdateWorkflowInput {
    /// Repository owner (username or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Path of the workflow file (e.g. ".github/workflows/ci.yml").
    pub path: String,
    /// Workflow file content. Must be parseable YAML.
    pub content: String,
    /// Commit message for the change. A default is used when omitted.
    #[serde(default)]
    pub commit_message: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct CreateOrUpdateWorkflowOutput {
    /// The registered workflow, when GitHub has already picked the file up.
    pub workflow: Option<WorkflowSummary>,
    pub path: String,
    pub commit: FileCommit,
    pub message: String,
}

/// # Create or Update GitHub Actions Workflow
///
/// Writes a workflow file through the repository contents API, creating it
/// when absent and updating it (with the current blob SHA) when present.
/// After the commit the repository's workflows are re-listed to report the
/// registered workflow; a file GitHub has not processed yet is reported as
/// not yet available.
///
/// The content is required to parse as YAML before anything is written, so
/// a malformed file never reaches the repository.
///
/// # Errors
///
/// Returns an error if:
/// - The owner, repo, path, or content fields are empty or whitespace-only
/// - The content is not parseable YAML
/// - The GitHub API request fails or returns a non-success status code
pub async fn create_or_update_workflow(
    client: &GitHubClient,
    input: CreateOrUpdateWorkflowInput,
) -> Result<CreateOrUpdateWorkflowOutput> {
    ensure!(!input.owner.trim().is_empty(), "owner must not be empty");
    ensure!(!input.repo.trim().is_empty(), "repo must not be empty");
    ensure!(!input.path.trim().is_empty(), "path must not be empty");
    ensure!(
        !input.content.trim().is_empty(),
        "content must not be empty"
    );

    if let Err(err) = serde_yaml::from_str::<serde_yaml::Value>(&input.content) {
        bail!("Invalid YAML content: {err}");
    }

    let contents_url = contents_url(client, &input.owner, &input.repo, &input.path)?;

    let existing: Option<ContentFile> = client
        .get_json_optional(contents_url.clone(), &[])
        .await?;
    let updating = existing.is_some();

    let body = PutContentsRequest {
        message: input
            .commit_message
            .clone()
            .unwrap_or_else(|| DEFAULT_COMMIT_MESSAGE.to_string()),
        content: base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            input.content.as_bytes(),
        ),
        sha: existing.map(|file| file.sha),
    };

    let response: PutContentsResponse = client.put_json(contents_url, &body).await?;
    tracing::info!(path = %input.path, updating, "Committed workflow file");

    let verb = if updating { "updated" } else { "created" };

    let list_url =
        client.url_with_segments(&["repos", &input.owner, &input.repo, "actions", "workflows"])?;
    let listed: ListWorkflowsResponse = client
        .get_json(list_url, &[("per_page", "100".to_string())])
        .await?;
    let workflow = listed
        .workflows
        .into_iter()
        .find(|workflow| workflow.path == input.path);

    let message = if workflow.is_some() {
        format!("Successfully {verb} workflow file")
    } else {
        format!("Workflow file {verb}, but not yet available as a workflow")
    };

    Ok(CreateOrUpdateWorkflowOutput {
        workflow,
        path: input.path,
        commit: response.commit,
        message,
    })
}

#[derive(Debug, Serialize)]
struct PutContentsRequest {
    message: String,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<String>,
}

// ============================================================================
// list_secrets
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListSecretsInput {
    /// Repository owner (username or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ListSecretsOutput {
    pub total_count: i64,
    /// Secret names and timestamps. Values are never exposed.
    pub secrets: Vec<RepoSecret>,
}

/// # List GitHub Actions Secrets
///
/// Lists repository secret names and timestamps. Secret values cannot be
/// read through the API and are never part of the response.
///
/// # Errors
///
/// Returns an error if:
/// - The owner or repo fields are empty or contain only whitespace
/// - The GitHub API request fails or returns a non-success status code
pub async fn list_secrets(
    client: &GitHubClient,
    input: ListSecretsInput,
) -> Result<ListSecretsOutput> {
    ensure!(!input.owner.trim().is_empty(), "owner must not be empty");
    ensure!(!input.repo.trim().is_empty(), "repo must not be empty");

    let url =
        client.url_with_segments(&["repos", &input.owner, &input.repo, "actions", "secrets"])?;
    let response: ListSecretsResponse = client.get_json(url, &[]).await?;

    Ok(ListSecretsOutput {
        total_count: response.total_count,
        secrets: response.secrets,
    })
}

// ============================================================================
// list_environments
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListEnvironmentsInput {
    /// Repository owner (username or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ListEnvironmentsOutput {
    pub environments: Vec<EnvironmentSummary>,
}

/// # List GitHub Actions Environments
///
/// Lists deployment environments with their protection settings. The API's
/// raw rule list is reshaped into a flat summary: whether reviewers are
/// required and the wait timer, if any.
///
/// # Errors
///
/// Returns an error if:
/// - The owner or repo fields are empty or contain only whitespace
/// - The GitHub API request fails or returns a non-success status code
pub async fn list_environments(
    client: &GitHubClient,
    input: ListEnvironmentsInput,
) -> Result<ListEnvironmentsOutput> {
    ensure!(!input.owner.trim().is_empty(), "owner must not be empty");
    ensure!(!input.repo.trim().is_empty(), "repo must not be empty");

    let url = client.url_with_segments(&["repos", &input.owner, &input.repo, "environments"])?;
    let response: ListEnvironmentsResponse = client.get_json(url, &[]).await?;

    let environments = response
        .environments
        .into_iter()
        .map(|record| EnvironmentSummary {
            name: record.name,
            created_at: record.created_at,
            updated_at: record.updated_at,
            protection_rules: ProtectionRules {
                required_reviewers: record
                    .protection_rules
                    .iter()
                    .any(|rule| rule.rule_type == "required_reviewers"),
                wait_timer: record
                    .protection_rules
                    .iter()
                    .find(|rule| rule.rule_type == "wait_timer")
                    .and_then(|rule| rule.wait_timer),
            },
        })
        .collect();

    Ok(ListEnvironmentsOutput { environments })
}

// ============================================================================
// validate_workflow
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ValidateWorkflowInput {
    /// Workflow YAML content to validate.
    pub content: String,
}

/// # Validate GitHub Actions Workflow
///
/// Validates workflow YAML content for structural problems and best-practice
/// suggestions. Malformed input is reported in the result, never as an
/// error, so this tool can be used to check untrusted content safely.
///
/// # Errors
///
/// This function currently never fails; the `Result` keeps its signature
/// uniform with the other tools.
pub async fn validate_workflow(
    _client: &GitHubClient,
    input: ValidateWorkflowInput,
) -> Result<ValidationReport> {
    Ok(run_validation(&input.content))
}

// ============================================================================
// get_workflow_templates
// ============================================================================

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct GetWorkflowTemplatesInput {}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct WorkflowTemplate {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct GetWorkflowTemplatesOutput {
    pub templates: Vec<WorkflowTemplate>,
}

/// # Get Workflow Templates
///
/// Returns the bundled workflow templates for common CI/CD setups, in a
/// stable order. Templates are static content; no API call is made.
///
/// # Errors
///
/// This function currently never fails; the `Result` keeps its signature
/// uniform with the other tools.
pub async fn get_workflow_templates(
    _client: &GitHubClient,
    _input: GetWorkflowTemplatesInput,
) -> Result<GetWorkflowTemplatesOutput> {
    let templates = templates::workflow_templates()
        .iter()
        .map(|(name, content)| WorkflowTemplate {
            name: (*name).to_string(),
            content: (*content).to_string(),
        })
        .collect();

    Ok(GetWorkflowTemplatesOutput { templates })
}

// ============================================================================
// Helpers
// ============================================================================

/// Resolves a workflow selector to a workflow.
///
/// All-digit selectors are treated as workflow IDs and fetched directly.
/// Anything else is matched against the listed workflows by name or by file
/// path suffix, in listing order.
async fn resolve_workflow(
    client: &GitHubClient,
    owner: &str,
    repo: &str,
    selector: &str,
) -> Result<WorkflowSummary> {
    let selector = selector.trim();

    if !selector.is_empty() && selector.bytes().all(|b| b.is_ascii_digit()) {
        let url = client
            .url_with_segments(&["repos", owner, repo, "actions", "workflows", selector])?;
        return client.get_json(url, &[]).await;
    }

    let url = client.url_with_segments(&["repos", owner, repo, "actions", "workflows"])?;
    let response: ListWorkflowsResponse = client
        .get_json(url, &[("per_page", "100".to_string())])
        .await?;

    response
        .workflows
        .into_iter()
        .find(|workflow| workflow.name == selector || workflow.path.ends_with(selector))
        .ok_or_else(|| anyhow::anyhow!("workflow not found: {selector}"))
}

/// Builds a contents API URL, keeping the slashes of the file path as
/// separate URL segments.
fn contents_url(
    client: &GitHubClient,
    owner: &str,
    repo: &str,
    file_path: &str,
) -> Result<reqwest::Url> {
    let mut segments = vec!["repos", owner, repo, "contents"];
    segments.extend(file_path.split('/').filter(|part| !part.is_empty()));
    client.url_with_segments(&segments)
}

/// Decodes base64 file content from the contents API, which wraps encoded
/// data with newlines.
fn decode_file_content(file: &ContentFile) -> Result<String> {
    let Some(encoded) = &file.content else {
        bail!("file content missing from contents API response");
    };
    let compact: String = encoded.split_whitespace().collect();
    let bytes = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, compact)?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_string_contains, header, method, path, query_param},
    };

    use super::*;
    use crate::client::Credentials;

    fn test_client(endpoint: &str) -> GitHubClient {
        GitHubClient::new(&Credentials {
            token: Some("ghp_test_token_123".to_string()),
            endpoint: Some(endpoint.to_string()),
        })
        .unwrap()
    }

    fn workflows_body() -> String {
        r#"
          {
            "total_count": 2,
            "workflows": [
              {
                "id": 123,
                "node_id": "MDQ6V29ya2Zsb3cxMjM=",
                "name": "CI",
                "path": ".github/workflows/ci.yml",
                "state": "active",
                "created_at": "2024-01-01T00:00:00Z",
                "updated_at": "2024-01-01T00:00:00Z",
                "url": "https://api.github.com/repos/test-owner/test-repo/actions/workflows/123",
                "html_url": "https://github.com/test-owner/test-repo/blob/master/.github/workflows/ci.yml",
                "badge_url": "https://github.com/test-owner/test-repo/workflows/CI/badge.svg"
              },
              {
                "id": 456,
                "node_id": "MDQ6V29ya2Zsb3c0NTY=",
                "name": "Release",
                "path": ".github/workflows/release.yml",
                "state": "active",
                "created_at": "2024-01-01T00:00:00Z",
                "updated_at": "2024-01-01T00:00:00Z",
                "url": "https://api.github.com/repos/test-owner/test-repo/actions/workflows/456",
                "html_url": "https://github.com/test-owner/test-repo/blob/master/.github/workflows/release.yml",
                "badge_url": "https://github.com/test-owner/test-repo/workflows/Release/badge.svg"
              }
            ]
          }
        "#
        .to_string()
    }

    fn encode(content: &str) -> String {
        base64::Engine::encode(&base64::engine::general_purpose::STANDARD, content)
    }

    // --- list_workflows ---

    #[tokio::test]
    async fn test_list_workflows_empty_owner_returns_error() {
        let server = MockServer::start().await;
        let client = test_client(&server.uri());

        let result = list_workflows(
            &client,
            ListWorkflowsInput {
                owner: "  ".to_string(),
                repo: "test-repo".to_string(),
                per_page: None,
            },
        )
        .await;

        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("owner must not be empty")
        );
    }

    #[tokio::test]
    async fn test_list_workflows_invalid_per_page_returns_error() {
        let server = MockServer::start().await;
        let client = test_client(&server.uri());

        let result = list_workflows(
            &client,
            ListWorkflowsInput {
                owner: "test-owner".to_string(),
                repo: "test-repo".to_string(),
                per_page: Some(101),
            },
        )
        .await;

        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("per_page must be between 1 and 100")
        );
    }

    #[tokio::test]
    async fn test_list_workflows_success_returns_workflows() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/test-owner/test-repo/actions/workflows"))
            .and(header("authorization", "Bearer ghp_test_token_123"))
            .and(query_param("per_page", "30"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(workflows_body(), "application/json"),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let output = list_workflows(
            &client,
            ListWorkflowsInput {
                owner: "test-owner".to_string(),
                repo: "test-repo".to_string(),
                per_page: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(output.workflows.len(), 2);
        assert_eq!(output.workflows[0].id, 123);
        assert_eq!(output.workflows[0].name, "CI");
    }

    #[tokio::test]
    async fn test_list_workflows_api_error_returns_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/test-owner/test-repo/actions/workflows"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_raw(r#"{"message":"Bad credentials"}"#, "application/json"),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = list_workflows(
            &client,
            ListWorkflowsInput {
                owner: "test-owner".to_string(),
                repo: "test-repo".to_string(),
                per_page: None,
            },
        )
        .await;

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("401"));
    }

    // --- get_workflow ---

    #[tokio::test]
    async fn test_get_workflow_resolves_filename_and_decodes_content() {
        let server = MockServer::start().await;
        let content = "name: CI\non: push\njobs:\n  build:\n    runs-on: ubuntu-latest\n";

        Mock::given(method("GET"))
            .and(path("/repos/test-owner/test-repo/actions/workflows"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(workflows_body(), "application/json"),
            )
            .mount(&server)
            .await;

        // The contents API wraps base64 with newlines; the decoder must cope.
        let mut encoded = encode(content);
        encoded.insert(8, '\n');
        let contents_body = format!(
            r#"{{"name":"ci.yml","path":".github/workflows/ci.yml","sha":"abc123","content":"{}","encoding":"base64"}}"#,
            encoded.replace('\n', "\\n")
        );

        Mock::given(method("GET"))
            .and(path(
                "/repos/test-owner/test-repo/contents/.github/workflows/ci.yml",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_raw(contents_body, "application/json"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let output = get_workflow(
            &client,
            GetWorkflowInput {
                owner: "test-owner".to_string(),
                repo: "test-repo".to_string(),
                workflow: "ci.yml".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(output.workflow.id, 123);
        assert_eq!(output.content, content);
        let parsed = output.parsed_yaml.unwrap();
        assert_eq!(parsed["name"], "CI");
    }

    #[tokio::test]
    async fn test_get_workflow_numeric_selector_fetches_by_id() {
        let server = MockServer::start().await;

        let workflow_body = r#"
          {
            "id": 123,
            "node_id": "MDQ6V29ya2Zsb3cxMjM=",
            "name": "CI",
            "path": ".github/workflows/ci.yml",
            "state": "active",
            "url": "https://api.github.com/repos/test-owner/test-repo/actions/workflows/123",
            "html_url": "https://github.com/test-owner/test-repo/blob/master/.github/workflows/ci.yml",
            "badge_url": "https://github.com/test-owner/test-repo/workflows/CI/badge.svg"
          }
        "#;

        Mock::given(method("GET"))
            .and(path("/repos/test-owner/test-repo/actions/workflows/123"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(workflow_body, "application/json"))
            .mount(&server)
            .await;

        let contents_body = format!(
            r#"{{"name":"ci.yml","path":".github/workflows/ci.yml","sha":"abc123","content":"{}","encoding":"base64"}}"#,
            encode("name: CI\n")
        );
        Mock::given(method("GET"))
            .and(path(
                "/repos/test-owner/test-repo/contents/.github/workflows/ci.yml",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_raw(contents_body, "application/json"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let output = get_workflow(
            &client,
            GetWorkflowInput {
                owner: "test-owner".to_string(),
                repo: "test-repo".to_string(),
                workflow: "123".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(output.workflow.id, 123);
        assert_eq!(output.content, "name: CI\n");
    }

    #[tokio::test]
    async fn test_get_workflow_unknown_selector_returns_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/test-owner/test-repo/actions/workflows"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(workflows_body(), "application/json"),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = get_workflow(
            &client,
            GetWorkflowInput {
                owner: "test-owner".to_string(),
                repo: "test-repo".to_string(),
                workflow: "nope.yml".to_string(),
            },
        )
        .await;

        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("workflow not found: nope.yml")
        );
    }

    #[tokio::test]
    async fn test_get_workflow_bad_yaml_still_returns_content() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/test-owner/test-repo/actions/workflows"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(workflows_body(), "application/json"),
            )
            .mount(&server)
            .await;

        let contents_body = format!(
            r#"{{"name":"ci.yml","path":".github/workflows/ci.yml","sha":"abc123","content":"{}","encoding":"base64"}}"#,
            encode("name: [unclosed")
        );
        Mock::given(method("GET"))
            .and(path(
                "/repos/test-owner/test-repo/contents/.github/workflows/ci.yml",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_raw(contents_body, "application/json"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let output = get_workflow(
            &client,
            GetWorkflowInput {
                owner: "test-owner".to_string(),
                repo: "test-repo".to_string(),
                workflow: "CI".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(output.content, "name: [unclosed");
        assert!(output.parsed_yaml.is_none());
    }

    // --- list_workflow_runs ---

    fn runs_body(count: usize) -> String {
        let runs: Vec<String> = (0..count)
            .map(|i| {
                format!(
                    r#"{{
                      "id": {id},
                      "name": "CI",
                      "status": "completed",
                      "conclusion": "success",
                      "workflow_id": 123,
                      "head_branch": "main",
                      "head_sha": "abc123",
                      "run_number": {id},
                      "event": "push",
                      "created_at": "2024-01-01T00:00:00Z",
                      "updated_at": "2024-01-01T00:05:00Z",
                      "html_url": "https://github.com/test-owner/test-repo/actions/runs/{id}",
                      "path": ".github/workflows/ci.yml@main"
                    }}"#,
                    id = 1000 + i
                )
            })
            .collect();
        format!(
            r#"{{"total_count": {count}, "workflow_runs": [{}]}}"#,
            runs.join(",")
        )
    }

    #[tokio::test]
    async fn test_list_workflow_runs_defaults_to_limit_10() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/test-owner/test-repo/actions/runs"))
            .and(query_param("per_page", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(runs_body(3), "application/json"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let output = list_workflow_runs(
            &client,
            ListWorkflowRunsInput {
                owner: "test-owner".to_string(),
                repo: "test-repo".to_string(),
                workflow: None,
                status: None,
                limit: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(output.runs.len(), 3);
        assert_eq!(output.runs[0].id, 1000);
    }

    #[tokio::test]
    async fn test_list_workflow_runs_truncates_to_limit() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/test-owner/test-repo/actions/runs"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(runs_body(5), "application/json"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let output = list_workflow_runs(
            &client,
            ListWorkflowRunsInput {
                owner: "test-owner".to_string(),
                repo: "test-repo".to_string(),
                workflow: None,
                status: None,
                limit: Some(2),
            },
        )
        .await
        .unwrap();

        assert_eq!(output.runs.len(), 2);
    }

    #[tokio::test]
    async fn test_list_workflow_runs_sends_status_filter() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/test-owner/test-repo/actions/runs"))
            .and(query_param("status", "in_progress"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(runs_body(1), "application/json"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let output = list_workflow_runs(
            &client,
            ListWorkflowRunsInput {
                owner: "test-owner".to_string(),
                repo: "test-repo".to_string(),
                workflow: None,
                status: Some(WorkflowRunStatus::InProgress),
                limit: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(output.runs.len(), 1);
    }

    #[tokio::test]
    async fn test_list_workflow_runs_scopes_to_resolved_workflow() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/test-owner/test-repo/actions/workflows"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(workflows_body(), "application/json"),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(
                "/repos/test-owner/test-repo/actions/workflows/123/runs",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_raw(runs_body(1), "application/json"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let output = list_workflow_runs(
            &client,
            ListWorkflowRunsInput {
                owner: "test-owner".to_string(),
                repo: "test-repo".to_string(),
                workflow: Some("ci.yml".to_string()),
                status: None,
                limit: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(output.runs.len(), 1);
    }

    // --- create_or_update_workflow ---

    #[tokio::test]
    async fn test_create_or_update_workflow_rejects_bad_yaml() {
        let server = MockServer::start().await;
        let client = test_client(&server.uri());

        let result = create_or_update_workflow(
            &client,
            CreateOrUpdateWorkflowInput {
                owner: "test-owner".to_string(),
                repo: "test-repo".to_string(),
                path: ".github/workflows/ci.yml".to_string(),
                content: "name: [unclosed".to_string(),
                commit_message: None,
            },
        )
        .await;

        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Invalid YAML content")
        );
    }

    #[tokio::test]
    async fn test_create_or_update_workflow_updates_existing_file_with_sha() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(
                "/repos/test-owner/test-repo/contents/.github/workflows/ci.yml",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"name":"ci.yml","path":".github/workflows/ci.yml","sha":"oldsha123"}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        Mock::given(method("PUT"))
            .and(path(
                "/repos/test-owner/test-repo/contents/.github/workflows/ci.yml",
            ))
            .and(body_string_contains("\"sha\":\"oldsha123\""))
            .and(body_string_contains(DEFAULT_COMMIT_MESSAGE))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"content":{"sha":"newsha"},"commit":{"sha":"commitsha456","html_url":"https://github.com/test-owner/test-repo/commit/commitsha456"}}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/repos/test-owner/test-repo/actions/workflows"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(workflows_body(), "application/json"),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let output = create_or_update_workflow(
            &client,
            CreateOrUpdateWorkflowInput {
                owner: "test-owner".to_string(),
                repo: "test-repo".to_string(),
                path: ".github/workflows/ci.yml".to_string(),
                content: "name: CI\non: push\njobs:\n  a:\n    runs-on: x\n".to_string(),
                commit_message: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(output.message, "Successfully updated workflow file");
        assert_eq!(output.workflow.unwrap().id, 123);
        assert_eq!(output.commit.sha, "commitsha456");
    }

    #[tokio::test]
    async fn test_create_or_update_workflow_creates_new_file_without_sha() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(
                "/repos/test-owner/test-repo/contents/.github/workflows/new.yml",
            ))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_raw(r#"{"message":"Not Found"}"#, "application/json"),
            )
            .mount(&server)
            .await;

        Mock::given(method("PUT"))
            .and(path(
                "/repos/test-owner/test-repo/contents/.github/workflows/new.yml",
            ))
            .and(body_string_contains("custom message"))
            .respond_with(ResponseTemplate::new(201).set_body_raw(
                r#"{"content":{"sha":"newsha"},"commit":{"sha":"commitsha789"}}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        // GitHub has not registered the new file as a workflow yet.
        Mock::given(method("GET"))
            .and(path("/repos/test-owner/test-repo/actions/workflows"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(workflows_body(), "application/json"),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let output = create_or_update_workflow(
            &client,
            CreateOrUpdateWorkflowInput {
                owner: "test-owner".to_string(),
                repo: "test-repo".to_string(),
                path: ".github/workflows/new.yml".to_string(),
                content: "name: New\non: push\njobs:\n  a:\n    runs-on: x\n".to_string(),
                commit_message: Some("custom message".to_string()),
            },
        )
        .await
        .unwrap();

        assert_eq!(
            output.message,
            "Workflow file created, but not yet available as a workflow"
        );
        assert!(output.workflow.is_none());
        assert_eq!(output.commit.sha, "commitsha789");

        // The PUT body for a new file must not carry a sha.
        let requests = server.received_requests().await.unwrap();
        let put = requests
            .iter()
            .find(|req| req.method.as_str() == "PUT")
            .unwrap();
        let body = String::from_utf8_lossy(&put.body);
        assert!(!body.contains("\"sha\""));
    }

    // --- list_secrets ---

    #[tokio::test]
    async fn test_list_secrets_returns_names_and_count() {
        let server = MockServer::start().await;

        let body = r#"
          {
            "total_count": 2,
            "secrets": [
              { "name": "AWS_ACCESS_KEY_ID", "created_at": "2024-01-01T00:00:00Z", "updated_at": "2024-01-02T00:00:00Z" },
              { "name": "DEPLOY_TOKEN", "created_at": "2024-01-03T00:00:00Z", "updated_at": "2024-01-03T00:00:00Z" }
            ]
          }
        "#;

        Mock::given(method("GET"))
            .and(path("/repos/test-owner/test-repo/actions/secrets"))
            .and(header("authorization", "Bearer ghp_test_token_123"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let output = list_secrets(
            &client,
            ListSecretsInput {
                owner: "test-owner".to_string(),
                repo: "test-repo".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(output.total_count, 2);
        assert_eq!(output.secrets[0].name, "AWS_ACCESS_KEY_ID");
        assert_eq!(output.secrets[1].name, "DEPLOY_TOKEN");
    }

    // --- list_environments ---

    #[tokio::test]
    async fn test_list_environments_reshapes_protection_rules() {
        let server = MockServer::start().await;

        let body = r#"
          {
            "total_count": 2,
            "environments": [
              {
                "name": "production",
                "created_at": "2024-01-01T00:00:00Z",
                "updated_at": "2024-01-02T00:00:00Z",
                "protection_rules": [
                  { "id": 1, "type": "required_reviewers" },
                  { "id": 2, "type": "wait_timer", "wait_timer": 30 }
                ]
              },
              {
                "name": "staging",
                "created_at": "2024-01-01T00:00:00Z",
                "updated_at": "2024-01-01T00:00:00Z",
                "protection_rules": []
              }
            ]
          }
        "#;

        Mock::given(method("GET"))
            .and(path("/repos/test-owner/test-repo/environments"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let output = list_environments(
            &client,
            ListEnvironmentsInput {
                owner: "test-owner".to_string(),
                repo: "test-repo".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(output.environments.len(), 2);
        let production = &output.environments[0];
        assert_eq!(production.name, "production");
        assert!(production.protection_rules.required_reviewers);
        assert_eq!(production.protection_rules.wait_timer, Some(30));

        let staging = &output.environments[1];
        assert!(!staging.protection_rules.required_reviewers);
        assert!(staging.protection_rules.wait_timer.is_none());
    }

    // --- validate_workflow / get_workflow_templates ---

    #[tokio::test]
    async fn test_validate_workflow_never_errors_on_bad_input() {
        let server = MockServer::start().await;
        let client = test_client(&server.uri());

        let report = validate_workflow(
            &client,
            ValidateWorkflowInput {
                content: "name: [unclosed".to_string(),
            },
        )
        .await
        .unwrap();

        assert!(!report.valid);
        assert!(report.warnings[0].starts_with("Invalid YAML: "));
    }

    #[tokio::test]
    async fn test_get_workflow_templates_returns_all_templates() {
        let server = MockServer::start().await;
        let client = test_client(&server.uri());

        let output = get_workflow_templates(&client, GetWorkflowTemplatesInput {})
            .await
            .unwrap();

        assert_eq!(output.templates.len(), 6);
        assert_eq!(output.templates[0].name, "python-package");
        assert!(output.templates[0].content.starts_with("name: Python Package"));
    }
}
