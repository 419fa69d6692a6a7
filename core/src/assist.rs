use std::sync::Arc;

use planmate_chat::ChatGateway;
use planmate_settings::CredentialStore;
use planmate_settings::DEFAULT_SYSTEM_PROMPT;
use planmate_settings::ProjectContextSource;
use planmate_settings::UserSettingsRow;
use planmate_tracker::Issue;
use planmate_tracker::JiraClient;
use planmate_tracker::TrackerClient;
use planmate_wiki::ConfluenceClient;
use planmate_wiki::WikiCredentials;
use planmate_wiki::WikiFetcher;
use planmate_wiki::extract_text;
use tracing::debug;
use tracing::warn;

use crate::config::CompanionConfig;
use crate::error::AssistError;
use crate::prompt::EpicContext;
use crate::prompt::PromptContext;
use crate::prompt::format_epic_block;
use crate::prompt::format_user_message;

/// Both halves of the chat turn produced by prompt assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPrompt {
    pub system_prompt: String,
    pub user_message: String,
}

/// Composition root of the AI-assist pipeline.
///
/// All collaborators are injected at construction and reused across calls;
/// per-user construction goes through [`Companion::for_user`].
pub struct Companion {
    store: Arc<CredentialStore>,
    tracker: Arc<dyn TrackerClient>,
    wiki: Arc<dyn WikiFetcher>,
    gateway: ChatGateway,
}

impl std::fmt::Debug for Companion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Companion").finish_non_exhaustive()
    }
}

impl Companion {
    pub fn new(
        store: Arc<CredentialStore>,
        tracker: Arc<dyn TrackerClient>,
        wiki: Arc<dyn WikiFetcher>,
        gateway: ChatGateway,
    ) -> Self {
        Self {
            store,
            tracker,
            wiki,
            gateway,
        }
    }

    /// Wire up the real collaborators for one user's settings.
    ///
    /// Only the tracker connection is required here; chat credentials are
    /// checked by the completion call itself.
    pub fn for_user(
        config: &CompanionConfig,
        store: Arc<CredentialStore>,
        row: &UserSettingsRow,
        client: reqwest::Client,
    ) -> Result<Self, AssistError> {
        let base_url = row
            .tracker_base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| AssistError::Config("tracker base URL is not set".to_owned()))?;
        let token_blob = row
            .tracker_token
            .as_deref()
            .filter(|blob| !blob.trim().is_empty())
            .ok_or_else(|| AssistError::Config("tracker token is not set".to_owned()))?;
        let token = store.reveal(token_blob);

        let tracker = JiraClient::new(base_url, &token, client.clone())
            .map_err(|e| AssistError::Config(e.to_string()))?;
        let wiki = ConfluenceClient::new(client.clone());
        let gateway = ChatGateway::new(config.chat_endpoints.clone(), client);
        Ok(Self::new(
            store,
            Arc::new(tracker),
            Arc::new(wiki),
            gateway,
        ))
    }

    /// Assemble the layered system prompt and the fixed-shape user message.
    ///
    /// Deterministic for fixed inputs. Epic and glossary fetches degrade to
    /// an omitted block on any failure; assembly itself never fails.
    pub async fn assemble_prompt(
        &self,
        issue: &Issue,
        settings: &UserSettingsRow,
    ) -> AssembledPrompt {
        let base_instructions = settings
            .system_prompt
            .as_deref()
            .map(str::trim)
            .filter(|prompt| !prompt.is_empty())
            .unwrap_or(DEFAULT_SYSTEM_PROMPT)
            .to_owned();

        let context = PromptContext {
            base_instructions,
            epic_block: self.epic_block(issue).await,
            glossary_block: self.glossary_block(settings).await,
        };
        AssembledPrompt {
            system_prompt: context.render(),
            user_message: format_user_message(issue),
        }
    }

    /// Assemble the prompt and delegate to the chat provider.
    pub async fn generate_ai_assist(
        &self,
        issue: &Issue,
        settings: &UserSettingsRow,
    ) -> Result<String, AssistError> {
        let prompt = self.assemble_prompt(issue, settings).await;
        let reply = self
            .gateway
            .complete(
                &self.store,
                settings,
                &prompt.system_prompt,
                &prompt.user_message,
                None,
            )
            .await?;
        Ok(reply)
    }

    async fn epic_block(&self, issue: &Issue) -> Option<String> {
        if issue.is_epic() {
            return Some(format_epic_block(&EpicContext::from(issue)));
        }
        let epic_key = issue.epic_key.as_deref()?;
        match self.tracker.get_issue_detail(epic_key).await {
            Ok(detail) => Some(format_epic_block(&EpicContext::from(detail))),
            Err(e) => {
                warn!("epic lookup for {epic_key} failed, omitting epic context: {e}");
                None
            }
        }
    }

    async fn glossary_block(&self, settings: &UserSettingsRow) -> Option<String> {
        match settings.project_context_type {
            ProjectContextSource::Confluence => {
                let page_url = settings
                    .project_context_url
                    .as_deref()
                    .map(str::trim)
                    .filter(|url| !url.is_empty())?;
                let credentials = self.wiki_credentials(settings);
                match self.wiki.fetch_page(page_url, credentials.as_ref()).await {
                    Ok(page) => {
                        let text = extract_text(&page.body_html);
                        if text.is_empty() {
                            debug!("wiki page {page_url} has no extractable text");
                            None
                        } else {
                            Some(text)
                        }
                    }
                    Err(e) => {
                        warn!("wiki fetch for {page_url} failed, omitting glossary: {e}");
                        None
                    }
                }
            }
            ProjectContextSource::Text => settings
                .project_context_text
                .as_deref()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_owned),
        }
    }

    fn wiki_credentials(&self, settings: &UserSettingsRow) -> Option<WikiCredentials> {
        let username = settings
            .wiki_username
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())?;
        let stored = settings.wiki_password.as_deref()?;
        Some(WikiCredentials {
            username: username.to_owned(),
            // Wiki passwords predating encryption-at-rest are still usable.
            password: self.store.reveal(stored),
        })
    }
}
