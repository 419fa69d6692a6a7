use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::WikiError;

/// Basic-auth credentials for an on-prem wiki, either stored in user
/// settings or supplied with the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiCredentials {
    pub username: String,
    pub password: String,
}

/// A fetched page; only the storage-format HTML body is consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiPage {
    pub title: String,
    pub body_html: String,
}

/// Parsed `…/pages/viewpage.action?pageId=N` link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRef {
    pub base_url: String,
    pub page_id: String,
}

/// Parse a viewpage link into its origin and numeric page id.
///
/// Returns `None` for anything that does not carry a `pageId` query
/// parameter, including relative URLs and plain prose.
pub fn parse_page_url(input: &str) -> Option<PageRef> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    let url = Url::parse(trimmed).ok()?;
    let page_id = url
        .query_pairs()
        .find(|(name, _)| name == "pageId")
        .map(|(_, value)| value.into_owned())?;
    Some(PageRef {
        base_url: url.origin().ascii_serialization(),
        page_id,
    })
}

#[async_trait]
pub trait WikiFetcher: Send + Sync {
    async fn fetch_page(
        &self,
        page_url: &str,
        credentials: Option<&WikiCredentials>,
    ) -> Result<WikiPage, WikiError>;
}

/// Confluence REST content client.
pub struct ConfluenceClient {
    client: reqwest::Client,
}

impl ConfluenceClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WikiFetcher for ConfluenceClient {
    async fn fetch_page(
        &self,
        page_url: &str,
        credentials: Option<&WikiCredentials>,
    ) -> Result<WikiPage, WikiError> {
        let page = parse_page_url(page_url)
            .ok_or_else(|| WikiError::InvalidUrl(page_url.trim().to_owned()))?;
        let api_url = format!(
            "{}/rest/api/content/{}?expand=body.storage,version,space",
            page.base_url, page.page_id
        );
        debug!("wiki page fetch: {api_url}");

        let mut request = self.client.get(&api_url).header("Accept", "application/json");
        if let Some(creds) = credentials {
            let username = creds.username.trim();
            if !username.is_empty() {
                request = request.basic_auth(username, Some(&creds.password));
            }
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let mut message = response.text().await.unwrap_or_default();
            message.truncate(2000);
            return Err(WikiError::Upstream { status, message });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| WikiError::Parse(e.to_string()))?;
        let body_html = body
            .get("body")
            .and_then(|b| b.get("storage"))
            .and_then(|s| s.get("value"))
            .and_then(Value::as_str)
            .ok_or_else(|| WikiError::Parse("page body.storage.value missing".to_owned()))?
            .to_owned();
        let title = body
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();

        Ok(WikiPage { title, body_html })
    }
}
