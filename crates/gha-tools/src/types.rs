//! Type definitions for the GitHub Actions API surface.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Status of a workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowRunStatus {
    Queued,
    InProgress,
    Completed,
    Waiting,
}

impl WorkflowRunStatus {
    /// The wire value used in the `status` query parameter.
    #[must_use]
    pub fn as_query_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Waiting => "waiting",
        }
    }
}

/// Conclusion of a completed workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowRunConclusion {
    Success,
    Failure,
    Neutral,
    Cancelled,
    Skipped,
    TimedOut,
    ActionRequired,
}

/// Summary information about a workflow.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkflowSummary {
    pub id: i64,
    pub node_id: String,
    pub name: String,
    pub path: String,
    pub state: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    pub url: String,
    pub html_url: String,
    pub badge_url: String,
}

/// Summary information about a workflow run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkflowRunSummary {
    pub id: i64,
    pub name: String,
    pub status: WorkflowRunStatus,
    #[serde(default)]
    pub conclusion: Option<WorkflowRunConclusion>,
    pub workflow_id: i64,
    pub head_branch: String,
    pub head_sha: String,
    pub run_number: i64,
    pub event: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub run_started_at: Option<String>,
    pub html_url: String,
    pub path: String,
}

/// A repository secret. Values are never exposed by the API.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RepoSecret {
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Deployment protection settings for an environment, reshaped from the raw
/// rule list the API returns.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ProtectionRules {
    /// Whether a `required_reviewers` rule is configured.
    pub required_reviewers: bool,
    /// Wait timer in minutes, if a `wait_timer` rule is configured.
    pub wait_timer: Option<i64>,
}

/// Summary information about a deployment environment.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct EnvironmentSummary {
    pub name: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub protection_rules: ProtectionRules,
}

/// File metadata and content from the repository contents API.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ContentFile {
    pub sha: String,
    #[serde(default)]
    pub content: Option<String>,
}

/// Commit metadata returned when a file is created or updated.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FileCommit {
    pub sha: String,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Internal response structure for list workflows.
#[derive(Debug, Deserialize)]
pub(crate) struct ListWorkflowsResponse {
    pub workflows: Vec<WorkflowSummary>,
}

/// Internal response structure for list workflow runs.
#[derive(Debug, Deserialize)]
pub(crate) struct ListWorkflowRunsResponse {
    pub workflow_runs: Vec<WorkflowRunSummary>,
}

/// Internal response structure for list secrets.
#[derive(Debug, Deserialize)]
pub(crate) struct ListSecretsResponse {
    pub total_count: i64,
    pub secrets: Vec<RepoSecret>,
}

/// Internal raw environment record, before protection rules are reshaped.
#[derive(Debug, Deserialize)]
pub(crate) struct EnvironmentRecord {
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub protection_rules: Vec<RawProtectionRule>,
}

/// A single raw protection rule as the API returns it.
#[derive(Debug, Deserialize)]
pub(crate) struct RawProtectionRule {
    #[serde(rename = "type")]
    pub rule_type: String,
    #[serde(default)]
    pub wait_timer: Option<i64>,
}

/// Internal response structure for list environments.
#[derive(Debug, Deserialize)]
pub(crate) struct ListEnvironmentsResponse {
    pub environments: Vec<EnvironmentRecord>,
}

/// Internal response structure for a contents API PUT.
#[derive(Debug, Deserialize)]
pub(crate) struct PutContentsResponse {
    pub commit: FileCommit,
}
