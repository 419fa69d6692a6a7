use std::time::Duration;

use planmate_settings::CredentialStore;
use planmate_settings::UserSettingsRow;
use serde::Serialize;
use tracing::debug;

use crate::error::ChatError;
use crate::transport::ChatEndpoints;
use crate::transport::ChatMessage;
use crate::transport::ChatRequest;
use crate::transport::ChatTransport;
use crate::transport::DEFAULT_MODEL;
use crate::transport::DEFAULT_SCOPE;
use crate::transport::DEFAULT_TIMEOUT_SECS;
use crate::transport::GigaChatTransport;

/// Effective provider settings for one user: decrypted credential blob plus
/// stored-or-default scope, model and timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSettings {
    pub credentials: String,
    pub scope: String,
    pub model: String,
    pub timeout: Duration,
}

/// What the settings page shows about the provider, without any decrypted
/// material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatStatus {
    pub has_credentials: bool,
    pub scope: String,
    pub model: String,
    pub timeout_secs: u64,
}

/// Resolve a user's chat settings.
///
/// The credential blob must decrypt: absent or undecryptable credentials are
/// a configuration error, not a fallback to plaintext.
pub fn chat_settings(
    store: &CredentialStore,
    row: &UserSettingsRow,
) -> Result<ChatSettings, ChatError> {
    let stored = row
        .chat_credentials
        .as_deref()
        .filter(|blob| !blob.trim().is_empty())
        .ok_or_else(|| ChatError::Config("chat credentials are not set".to_owned()))?;
    let credentials = store
        .decrypt(stored)
        .ok_or_else(|| ChatError::Config("stored chat credentials are unusable".to_owned()))?;
    Ok(ChatSettings {
        credentials,
        scope: stored_or(&row.chat_scope, DEFAULT_SCOPE),
        model: stored_or(&row.chat_model, DEFAULT_MODEL),
        timeout: Duration::from_secs(
            row.chat_timeout
                .and_then(|secs| u64::try_from(secs).ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        ),
    })
}

fn stored_or(value: &Option<String>, default: &str) -> String {
    value
        .as_deref()
        .map(str::trim)
        .filter(|stored| !stored.is_empty())
        .unwrap_or(default)
        .to_owned()
}

/// Wrapper around the completion call.
///
/// Holds only the shared pieces (HTTP client, endpoints), injected once by
/// the composition root; the per-user transport is built per call because
/// every user carries their own credential blob.
pub struct ChatGateway {
    endpoints: ChatEndpoints,
    client: reqwest::Client,
}

impl ChatGateway {
    pub fn new(endpoints: ChatEndpoints, client: reqwest::Client) -> Self {
        Self { endpoints, client }
    }

    pub fn transport_for(&self, settings: &ChatSettings) -> GigaChatTransport {
        GigaChatTransport::new(
            self.endpoints.clone(),
            settings.credentials.clone(),
            settings.scope.clone(),
            settings.timeout,
            self.client.clone(),
        )
    }

    /// One non-streaming completion over a (system, user) turn. The token is
    /// refreshed before use; a reply without content is an empty string.
    pub async fn complete(
        &self,
        store: &CredentialStore,
        row: &UserSettingsRow,
        system_prompt: &str,
        user_message: &str,
        model: Option<&str>,
    ) -> Result<String, ChatError> {
        let settings = chat_settings(store, row)?;
        let transport = self.transport_for(&settings);
        transport.refresh_token().await?;

        let model = model
            .map(str::to_owned)
            .unwrap_or_else(|| settings.model.clone());
        debug!("chat completion via model {model}");
        let request = ChatRequest::new(
            model,
            vec![
                ChatMessage::system(system_prompt),
                ChatMessage::user(user_message),
            ],
        );
        let response = transport.complete(&request).await?;
        Ok(response.reply_text().to_owned())
    }

    /// Provider status for the settings page.
    pub fn status(&self, store: &CredentialStore, row: &UserSettingsRow) -> ChatStatus {
        match chat_settings(store, row) {
            Ok(settings) => ChatStatus {
                has_credentials: true,
                scope: settings.scope,
                model: settings.model,
                timeout_secs: settings.timeout.as_secs(),
            },
            Err(_) => ChatStatus {
                has_credentials: false,
                scope: stored_or(&row.chat_scope, DEFAULT_SCOPE),
                model: stored_or(&row.chat_model, DEFAULT_MODEL),
                timeout_secs: row
                    .chat_timeout
                    .and_then(|secs| u64::try_from(secs).ok())
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            },
        }
    }
}
