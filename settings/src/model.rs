use serde::Deserialize;
use serde::Serialize;

/// Placeholder returned instead of a stored secret on every read.
///
/// Clients echo it back unchanged to mean "leave this secret as it is"; the
/// reconciler compares incoming values against this plaintext string and
/// never against ciphertext.
pub const SECRET_MASK: &str = "••••••••";

/// Instruction block used when the user has not overridden the system
/// prompt. Also the first-write default for the stored override field.
pub const DEFAULT_SYSTEM_PROMPT: &str = "Ты — ассистент проектной команды. \
Перепиши описание задачи так, чтобы оно было чётким, структурированным и \
понятным исполнителю: цель, контекст, шаги реализации и критерии приёмки. \
Сохраняй техническую суть и не выдумывай требования, которых нет в исходных \
данных. Отвечай на русском языке.";

/// Which of the two project-context storage slots is active.
///
/// Both slots may simultaneously hold stale values from a previous mode
/// switch; this discriminator alone governs which one is used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectContextSource {
    #[default]
    Text,
    Confluence,
}

/// Per-user configuration as persisted by the settings repository.
///
/// Secret fields (`tracker_token`, `chat_credentials`, `wiki_password`) hold
/// ciphertext blobs, or legacy plaintext from before encryption-at-rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettingsRow {
    pub project_key: Option<String>,
    pub tracker_base_url: Option<String>,
    pub tracker_token: Option<String>,
    pub chat_credentials: Option<String>,
    pub chat_scope: Option<String>,
    pub chat_model: Option<String>,
    pub chat_timeout: Option<i64>,
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub project_context_type: ProjectContextSource,
    pub project_context_text: Option<String>,
    pub project_context_url: Option<String>,
    pub wiki_username: Option<String>,
    pub wiki_password: Option<String>,
}

/// Read-side projection: secrets are reported as a boolean plus the masking
/// sentinel, never as plaintext and never as ciphertext.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub project_key: Option<String>,
    pub tracker_base_url: Option<String>,
    pub has_tracker_token: bool,
    pub tracker_token: Option<String>,
    pub has_chat_credentials: bool,
    pub chat_credentials: Option<String>,
    pub chat_scope: Option<String>,
    pub chat_model: Option<String>,
    pub chat_timeout: Option<i64>,
    pub system_prompt: Option<String>,
    pub project_context_type: ProjectContextSource,
    pub project_context_text: Option<String>,
    pub project_context_url: Option<String>,
    pub wiki_username: Option<String>,
    pub has_wiki_password: bool,
    pub wiki_password: Option<String>,
}

impl UserSettingsRow {
    pub fn masked_view(&self) -> SettingsView {
        let mask = |secret: &Option<String>| {
            secret
                .as_deref()
                .filter(|stored| !stored.trim().is_empty())
                .map(|_| SECRET_MASK.to_owned())
        };
        let tracker_token = mask(&self.tracker_token);
        let chat_credentials = mask(&self.chat_credentials);
        let wiki_password = mask(&self.wiki_password);
        SettingsView {
            project_key: self.project_key.clone(),
            tracker_base_url: self.tracker_base_url.clone(),
            has_tracker_token: tracker_token.is_some(),
            tracker_token,
            has_chat_credentials: chat_credentials.is_some(),
            chat_credentials,
            chat_scope: self.chat_scope.clone(),
            chat_model: self.chat_model.clone(),
            chat_timeout: self.chat_timeout,
            system_prompt: self.system_prompt.clone(),
            project_context_type: self.project_context_type,
            project_context_text: self.project_context_text.clone(),
            project_context_url: self.project_context_url.clone(),
            wiki_username: self.wiki_username.clone(),
            has_wiki_password: wiki_password.is_some(),
            wiki_password,
        }
    }
}

/// Timeout values arrive from the form either as a number or as a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TimeoutValue {
    Number(i64),
    Text(String),
}

/// Partial settings update as received from the client.
///
/// Every field distinguishes "absent" (`None`) from "present but null"
/// (`Some(None)`) from "present with a value"; the reconciler assigns each
/// field its own update policy on top of that.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsInput {
    #[serde(with = "serde_with::rust::double_option")]
    pub project_key: Option<Option<String>>,
    #[serde(with = "serde_with::rust::double_option")]
    pub tracker_base_url: Option<Option<String>>,
    #[serde(with = "serde_with::rust::double_option")]
    pub tracker_token: Option<Option<String>>,
    #[serde(with = "serde_with::rust::double_option")]
    pub chat_credentials: Option<Option<String>>,
    #[serde(with = "serde_with::rust::double_option")]
    pub chat_scope: Option<Option<String>>,
    #[serde(with = "serde_with::rust::double_option")]
    pub chat_model: Option<Option<String>>,
    #[serde(with = "serde_with::rust::double_option")]
    pub chat_timeout: Option<Option<TimeoutValue>>,
    #[serde(with = "serde_with::rust::double_option")]
    pub system_prompt: Option<Option<String>>,
    pub project_context_type: Option<ProjectContextSource>,
    #[serde(with = "serde_with::rust::double_option")]
    pub project_context_text: Option<Option<String>>,
    #[serde(with = "serde_with::rust::double_option")]
    pub project_context_url: Option<Option<String>>,
    #[serde(with = "serde_with::rust::double_option")]
    pub wiki_username: Option<Option<String>>,
    #[serde(with = "serde_with::rust::double_option")]
    pub wiki_password: Option<Option<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn masked_view_never_exposes_stored_material() {
        let row = UserSettingsRow {
            project_key: Some("PROJ".to_owned()),
            tracker_token: Some("czvW…ciphertext".to_owned()),
            wiki_password: Some("  ".to_owned()),
            ..Default::default()
        };
        let view = row.masked_view();
        assert!(view.has_tracker_token);
        assert_eq!(view.tracker_token.as_deref(), Some(SECRET_MASK));
        assert!(!view.has_chat_credentials);
        assert_eq!(view.chat_credentials, None);
        // Blank stored values count as unset.
        assert!(!view.has_wiki_password);
        assert_eq!(view.project_key.as_deref(), Some("PROJ"));
    }

    #[test]
    fn input_distinguishes_absent_from_null() {
        let input: SettingsInput =
            serde_json::from_value(json!({"projectKey": null, "chatModel": "GigaChat-2"}))
                .unwrap();
        assert_eq!(input.project_key, Some(None));
        assert_eq!(input.chat_model, Some(Some("GigaChat-2".to_owned())));
        assert_eq!(input.tracker_token, None);
    }

    #[test]
    fn timeout_accepts_numbers_and_strings() {
        let input: SettingsInput =
            serde_json::from_value(json!({"chatTimeout": 600})).unwrap();
        assert_eq!(input.chat_timeout, Some(Some(TimeoutValue::Number(600))));

        let input: SettingsInput =
            serde_json::from_value(json!({"chatTimeout": "900"})).unwrap();
        assert_eq!(
            input.chat_timeout,
            Some(Some(TimeoutValue::Text("900".to_owned())))
        );
    }

    #[test]
    fn context_type_deserializes_from_the_discriminator() {
        let input: SettingsInput =
            serde_json::from_value(json!({"projectContextType": "confluence"})).unwrap();
        assert_eq!(
            input.project_context_type,
            Some(ProjectContextSource::Confluence)
        );
    }
}
