use std::env;

use planmate_chat::ChatEndpoints;
use planmate_settings::CredentialStore;

use crate::error::AssistError;

pub const ENCRYPTION_KEY_ENV_VAR: &str = "PLANMATE_ENCRYPTION_KEY";
pub const CHAT_AUTH_URL_ENV_VAR: &str = "PLANMATE_CHAT_AUTH_URL";
pub const CHAT_API_URL_ENV_VAR: &str = "PLANMATE_CHAT_API_URL";

fn read_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Process-wide companion configuration.
#[derive(Debug, Clone)]
pub struct CompanionConfig {
    pub encryption_passphrase: String,
    pub chat_endpoints: ChatEndpoints,
}

impl CompanionConfig {
    /// Read the configuration from the environment. The encryption
    /// passphrase is required; provider endpoints fall back to the public
    /// ones.
    pub fn from_env() -> Result<Self, AssistError> {
        let encryption_passphrase = read_env(ENCRYPTION_KEY_ENV_VAR).ok_or_else(|| {
            AssistError::Config(format!("{ENCRYPTION_KEY_ENV_VAR} must be set"))
        })?;
        let mut chat_endpoints = ChatEndpoints::default();
        if let Some(auth_url) = read_env(CHAT_AUTH_URL_ENV_VAR) {
            chat_endpoints.auth_url = auth_url;
        }
        if let Some(api_url) = read_env(CHAT_API_URL_ENV_VAR) {
            chat_endpoints.api_url = api_url;
        }
        Ok(Self {
            encryption_passphrase,
            chat_endpoints,
        })
    }

    /// Derive the process-wide credential store from this configuration.
    pub fn credential_store(&self) -> Result<CredentialStore, AssistError> {
        CredentialStore::from_passphrase(&self.encryption_passphrase)
            .map_err(|e| AssistError::Config(e.to_string()))
    }
}
