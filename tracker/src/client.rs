use async_trait::async_trait;
use serde_json::Value;
use serde_json::json;
use tracing::debug;

use crate::error::TrackerError;
use crate::issue::Attachment;
use crate::issue::IssueDetail;
use crate::issue::IssueTypeInfo;
use crate::issue::StatusInfo;

const MAX_SEARCH_RESULTS: u32 = 100;

/// Outbound tracker contract consumed by the dashboard and the AI-assist
/// pipeline. Search results are returned raw so the tree builder owns all
/// normalization.
#[async_trait]
pub trait TrackerClient: Send + Sync {
    async fn search_issues(&self, project_key: &str) -> Result<Vec<Value>, TrackerError>;
    async fn get_issue_detail(&self, key: &str) -> Result<IssueDetail, TrackerError>;
    /// Connectivity probe against the current-user endpoint.
    async fn check_auth(&self) -> Result<Value, TrackerError>;
}

/// Strip trailing slashes so path concatenation stays predictable.
pub fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_owned()
}

/// Jira Server / Data Center REST client using a personal access token.
pub struct JiraClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl JiraClient {
    pub fn new(
        base_url: &str,
        token: &str,
        client: reqwest::Client,
    ) -> Result<Self, TrackerError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(TrackerError::Config(
                "personal access token must not be empty".to_owned(),
            ));
        }
        let base_url = normalize_base_url(base_url);
        if base_url.is_empty() {
            return Err(TrackerError::Config("base URL must not be empty".to_owned()));
        }
        Ok(Self {
            base_url,
            token: token.to_owned(),
            client,
        })
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Pull the upstream error text out of a non-success response body.
    async fn upstream_error(response: reqwest::Response) -> TrackerError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|value| {
                value
                    .get("errorMessages")
                    .and_then(Value::as_array)
                    .map(|messages| {
                        messages
                            .iter()
                            .filter_map(Value::as_str)
                            .collect::<Vec<_>>()
                            .join(", ")
                    })
                    .filter(|joined| !joined.is_empty())
            })
            .unwrap_or_else(|| {
                let mut text = body;
                text.truncate(2000);
                text
            });
        TrackerError::Upstream { status, message }
    }
}

#[async_trait]
impl TrackerClient for JiraClient {
    async fn search_issues(&self, project_key: &str) -> Result<Vec<Value>, TrackerError> {
        let project_key = project_key.trim();
        if project_key.is_empty() {
            return Err(TrackerError::Config("project key must not be empty".to_owned()));
        }

        // POST with a JSON body is the reliable variant across Server and
        // Data Center deployments.
        let url = format!("{}/rest/api/2/search", self.base_url);
        let jql = format!("project = \"{project_key}\" ORDER BY created DESC");
        debug!("tracker search: {url} jql={jql}");

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .header("X-Atlassian-Token", "no-check")
            .json(&json!({
                "jql": jql,
                "maxResults": MAX_SEARCH_RESULTS,
                "fields": ["*all"],
                "expand": ["renderedFields", "names", "schema"],
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::upstream_error(response).await);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| TrackerError::Parse(e.to_string()))?;
        let issues = body
            .get("issues")
            .and_then(Value::as_array)
            .ok_or_else(|| TrackerError::Parse("search response has no issues array".to_owned()))?;
        Ok(issues.clone())
    }

    async fn get_issue_detail(&self, key: &str) -> Result<IssueDetail, TrackerError> {
        let url = format!("{}/rest/api/2/issue/{key}", self.base_url);
        debug!("tracker issue detail: {url}");

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .header("X-Atlassian-Token", "no-check")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::upstream_error(response).await);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| TrackerError::Parse(e.to_string()))?;
        Ok(self.detail_from_response(&body))
    }

    async fn check_auth(&self) -> Result<Value, TrackerError> {
        let url = format!("{}/rest/api/2/myself", self.base_url);
        debug!("tracker auth probe: {url}");

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::upstream_error(response).await);
        }
        response
            .json()
            .await
            .map_err(|e| TrackerError::Parse(e.to_string()))
    }
}

impl JiraClient {
    fn detail_from_response(&self, body: &Value) -> IssueDetail {
        static EMPTY: Value = Value::Null;
        let fields = body.get("fields").unwrap_or(&EMPTY);
        let key = body
            .get("key")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();

        let attachments = fields
            .get("attachment")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| Attachment {
                        filename: entry
                            .get("filename")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_owned(),
                        url: entry
                            .get("content")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_owned(),
                        size: entry.get("size").and_then(Value::as_u64).unwrap_or(0),
                        mime_type: entry
                            .get("mimeType")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_owned(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        IssueDetail {
            url: format!("{}/browse/{key}", self.base_url),
            key,
            summary: fields
                .get("summary")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
            description: fields
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
            issue_type: IssueTypeInfo {
                name: fields
                    .get("issuetype")
                    .and_then(|t| t.get("name"))
                    .and_then(Value::as_str)
                    .unwrap_or("Unknown")
                    .to_owned(),
                icon_url: fields
                    .get("issuetype")
                    .and_then(|t| t.get("iconUrl"))
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_owned(),
            },
            status: StatusInfo {
                name: fields
                    .get("status")
                    .and_then(|s| s.get("name"))
                    .and_then(Value::as_str)
                    .unwrap_or("Unknown")
                    .to_owned(),
            },
            parent_key: fields
                .get("parent")
                .and_then(|p| p.get("key"))
                .and_then(Value::as_str)
                .map(str::to_owned),
            parent_summary: fields
                .get("parent")
                .and_then(|p| p.get("fields"))
                .and_then(|f| f.get("summary"))
                .and_then(Value::as_str)
                .map(str::to_owned),
            attachments,
        }
    }
}
