//! Minimal GitHub REST API client used by the tool operations.

use anyhow::{Result, anyhow, ensure};
use serde::{Deserialize, Serialize};

const DEFAULT_GITHUB_API_ENDPOINT: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("gha-mcp/", env!("CARGO_PKG_VERSION"));

/// Credentials for the GitHub API.
///
/// The token is optional so read-only commands that never touch the API can
/// construct a client without one; authenticated requests simply omit the
/// bearer header when it is absent.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// Personal access token.
    pub token: Option<String>,
    /// Override for the API endpoint (GitHub Enterprise installs).
    pub endpoint: Option<String>,
}

/// GitHub REST API client.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Creates a new client from credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if a provided token or endpoint is empty after
    /// trimming.
    pub fn new(credentials: &Credentials) -> Result<Self> {
        if let Some(token) = &credentials.token {
            ensure!(!token.trim().is_empty(), "token must not be empty");
        }

        let base_url = normalize_base_url(
            credentials
                .endpoint
                .as_deref()
                .unwrap_or(DEFAULT_GITHUB_API_ENDPOINT),
        )?;

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            token: credentials.token.clone(),
        })
    }

    /// Constructs a URL by appending path segments to the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the `base_url` is not an absolute URL.
    pub fn url_with_segments(&self, segments: &[&str]) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url)?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| anyhow!("base_url must be an absolute URL"))?;
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    fn apply_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("User-Agent", USER_AGENT);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Sends a GET request and parses the response as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the API returns a non-success
    /// status, or the response cannot be parsed as the expected type.
    pub async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: reqwest::Url,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .apply_headers(self.http.get(url).query(query))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(response.json::<T>().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(anyhow!("GitHub API request failed ({status}): {body}"))
        }
    }

    /// Sends a GET request, mapping a 404 response to `None`.
    ///
    /// # Errors
    ///
    /// Returns an error for any non-success status other than 404, or if the
    /// response cannot be parsed as the expected type.
    pub async fn get_json_optional<T: for<'de> Deserialize<'de>>(
        &self,
        url: reqwest::Url,
        query: &[(&str, String)],
    ) -> Result<Option<T>> {
        let response = self
            .apply_headers(self.http.get(url).query(query))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(Some(response.json::<T>().await?))
        } else if status == reqwest::StatusCode::NOT_FOUND {
            Ok(None)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(anyhow!("GitHub API request failed ({status}): {body}"))
        }
    }

    /// Sends a PUT request with a JSON body and parses the response as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be serialized, the request fails,
    /// the API returns a non-success status, or the response cannot be parsed.
    pub async fn put_json<TReq: Serialize, TRes: for<'de> Deserialize<'de>>(
        &self,
        url: reqwest::Url,
        body: &TReq,
    ) -> Result<TRes> {
        let response = self
            .apply_headers(self.http.put(url).json(body))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(response.json::<TRes>().await?)
        } else {
            let body_text = response.text().await.unwrap_or_default();
            Err(anyhow!("GitHub API request failed ({status}): {body_text}"))
        }
    }
}

fn normalize_base_url(endpoint: &str) -> Result<String> {
    let trimmed = endpoint.trim();
    ensure!(!trimmed.is_empty(), "endpoint must not be empty");
    Ok(trimmed.trim_end_matches('/').to_string())
}
