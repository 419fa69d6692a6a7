use crate::crypto::CredentialStore;
use crate::error::SettingsError;
use crate::model::DEFAULT_SYSTEM_PROMPT;
use crate::model::SECRET_MASK;
use crate::model::ProjectContextSource;
use crate::model::SettingsInput;
use crate::model::TimeoutValue;
use crate::model::UserSettingsRow;

/// Persisted settings columns a reconcile run may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    ProjectKey,
    TrackerBaseUrl,
    TrackerToken,
    ChatCredentials,
    ChatScope,
    ChatModel,
    ChatTimeout,
    SystemPrompt,
    ProjectContextType,
    ProjectContextText,
    ProjectContextUrl,
    WikiUsername,
    WikiPassword,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WriteValue {
    Null,
    Text(String),
    Integer(i64),
}

/// One column assignment to apply. Fields without an entry keep their stored
/// value untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldWrite {
    pub field: SettingsField,
    pub value: WriteValue,
}

/// Update decision for one secret field, made explicit so the policy stays
/// auditable independent of any optional-value encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SecretUpdate {
    Keep,
    Clear,
    Set(String),
}

/// Secret policy: absent and sentinel-echo keep the stored blob, null and
/// blank clear it, anything else replaces it.
fn secret_update(input: &Option<Option<String>>) -> SecretUpdate {
    match input {
        None => SecretUpdate::Keep,
        Some(None) => SecretUpdate::Clear,
        Some(Some(value)) if value.trim().is_empty() => SecretUpdate::Clear,
        Some(Some(value)) if value == SECRET_MASK => SecretUpdate::Keep,
        Some(Some(value)) => SecretUpdate::Set(value.clone()),
    }
}

/// Scalar policy (COALESCE-style): absent and null keep the stored value,
/// any present value overwrites, blank strings normalize to null.
fn scalar_update(input: &Option<Option<String>>) -> Option<WriteValue> {
    match input {
        None | Some(None) => None,
        Some(Some(value)) if value.trim().is_empty() => Some(WriteValue::Null),
        Some(Some(value)) => Some(WriteValue::Text(value.clone())),
    }
}

fn timeout_update(
    input: &Option<Option<TimeoutValue>>,
) -> Result<Option<WriteValue>, SettingsError> {
    let value = match input {
        None | Some(None) => return Ok(None),
        Some(Some(value)) => value,
    };
    let normalized = match value {
        TimeoutValue::Number(n) => *n,
        TimeoutValue::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(Some(WriteValue::Null));
            }
            text.parse::<i64>().map_err(|_| {
                SettingsError::Validation(format!("timeout is not a number: {text:?}"))
            })?
        }
    };
    if normalized < 0 {
        return Err(SettingsError::Validation(format!(
            "timeout must be non-negative, got {normalized}"
        )));
    }
    Ok(Some(WriteValue::Integer(normalized)))
}

/// Decide the column writes for one partial settings update.
///
/// Pure: no I/O happens here. The caller persists the returned writes (and
/// creates the row first when `existing` is `None`). Validation failures
/// reject the whole update before a single write is produced.
pub fn reconcile(
    existing: Option<&UserSettingsRow>,
    input: &SettingsInput,
    store: &CredentialStore,
) -> Result<Vec<FieldWrite>, SettingsError> {
    let timeout = timeout_update(&input.chat_timeout)?;

    let mut writes = Vec::new();
    let mut push_scalar = |field: SettingsField, update: Option<WriteValue>| {
        if let Some(value) = update {
            writes.push(FieldWrite { field, value });
        }
    };

    push_scalar(SettingsField::ProjectKey, scalar_update(&input.project_key));
    push_scalar(
        SettingsField::TrackerBaseUrl,
        scalar_update(&input.tracker_base_url),
    );
    push_scalar(SettingsField::ChatScope, scalar_update(&input.chat_scope));
    push_scalar(SettingsField::ChatModel, scalar_update(&input.chat_model));
    push_scalar(SettingsField::ChatTimeout, timeout);
    push_scalar(
        SettingsField::SystemPrompt,
        scalar_update(&input.system_prompt),
    );
    push_scalar(
        SettingsField::ProjectContextText,
        scalar_update(&input.project_context_text),
    );
    push_scalar(
        SettingsField::ProjectContextUrl,
        scalar_update(&input.project_context_url),
    );
    push_scalar(
        SettingsField::WikiUsername,
        scalar_update(&input.wiki_username),
    );

    if let Some(source) = input.project_context_type {
        let tag = match source {
            ProjectContextSource::Text => "text",
            ProjectContextSource::Confluence => "confluence",
        };
        writes.push(FieldWrite {
            field: SettingsField::ProjectContextType,
            value: WriteValue::Text(tag.to_owned()),
        });
    }

    for (field, update) in [
        (SettingsField::TrackerToken, secret_update(&input.tracker_token)),
        (
            SettingsField::ChatCredentials,
            secret_update(&input.chat_credentials),
        ),
        (SettingsField::WikiPassword, secret_update(&input.wiki_password)),
    ] {
        match update {
            SecretUpdate::Keep => {}
            SecretUpdate::Clear => writes.push(FieldWrite {
                field,
                value: WriteValue::Null,
            }),
            SecretUpdate::Set(plaintext) => writes.push(FieldWrite {
                field,
                value: WriteValue::Text(store.encrypt(&plaintext)?),
            }),
        }
    }

    // A freshly created row gets the default instructions instead of null,
    // unless this very update supplies an override.
    if existing.is_none() {
        let supplies_prompt = writes.iter().any(|write| {
            write.field == SettingsField::SystemPrompt
                && matches!(write.value, WriteValue::Text(_))
        });
        if !supplies_prompt {
            writes.retain(|write| write.field != SettingsField::SystemPrompt);
            writes.push(FieldWrite {
                field: SettingsField::SystemPrompt,
                value: WriteValue::Text(DEFAULT_SYSTEM_PROMPT.to_owned()),
            });
        }
    }

    Ok(writes)
}

/// Apply a reconcile result to an in-memory row. Repository implementations
/// and tests share this so the write semantics live in one place.
pub fn apply_writes(row: &mut UserSettingsRow, writes: &[FieldWrite]) {
    let as_text = |value: &WriteValue| match value {
        WriteValue::Null => None,
        WriteValue::Text(text) => Some(text.clone()),
        WriteValue::Integer(n) => Some(n.to_string()),
    };
    for write in writes {
        match write.field {
            SettingsField::ProjectKey => row.project_key = as_text(&write.value),
            SettingsField::TrackerBaseUrl => row.tracker_base_url = as_text(&write.value),
            SettingsField::TrackerToken => row.tracker_token = as_text(&write.value),
            SettingsField::ChatCredentials => row.chat_credentials = as_text(&write.value),
            SettingsField::ChatScope => row.chat_scope = as_text(&write.value),
            SettingsField::ChatModel => row.chat_model = as_text(&write.value),
            SettingsField::ChatTimeout => {
                row.chat_timeout = match &write.value {
                    WriteValue::Integer(n) => Some(*n),
                    _ => None,
                }
            }
            SettingsField::SystemPrompt => row.system_prompt = as_text(&write.value),
            SettingsField::ProjectContextType => {
                row.project_context_type = match &write.value {
                    WriteValue::Text(tag) if tag == "confluence" => {
                        ProjectContextSource::Confluence
                    }
                    _ => ProjectContextSource::Text,
                }
            }
            SettingsField::ProjectContextText => {
                row.project_context_text = as_text(&write.value)
            }
            SettingsField::ProjectContextUrl => row.project_context_url = as_text(&write.value),
            SettingsField::WikiUsername => row.wiki_username = as_text(&write.value),
            SettingsField::WikiPassword => row.wiki_password = as_text(&write.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn store() -> CredentialStore {
        CredentialStore::from_passphrase("unit-test-passphrase").unwrap()
    }

    fn input(value: serde_json::Value) -> SettingsInput {
        serde_json::from_value(value).unwrap()
    }

    fn write_for<'a>(writes: &'a [FieldWrite], field: SettingsField) -> Option<&'a FieldWrite> {
        writes.iter().find(|write| write.field == field)
    }

    #[test]
    fn absent_secret_is_left_untouched() {
        let store = store();
        let row = UserSettingsRow {
            tracker_token: Some(store.encrypt("pat").unwrap()),
            ..Default::default()
        };
        let writes = reconcile(Some(&row), &input(json!({"projectKey": "PROJ"})), &store).unwrap();
        assert_eq!(write_for(&writes, SettingsField::TrackerToken), None);
        assert_eq!(
            write_for(&writes, SettingsField::ProjectKey).map(|w| &w.value),
            Some(&WriteValue::Text("PROJ".to_owned()))
        );
    }

    #[test]
    fn sentinel_echo_never_clobbers_the_stored_blob() {
        let store = store();
        let sealed = store.encrypt("pat").unwrap();
        let mut row = UserSettingsRow {
            tracker_token: Some(sealed.clone()),
            ..Default::default()
        };

        // Client read the masked view, resubmitted the form unchanged plus a
        // new project key.
        let writes = reconcile(
            Some(&row),
            &input(json!({"trackerToken": SECRET_MASK, "projectKey": "PROJ"})),
            &store,
        )
        .unwrap();
        assert_eq!(write_for(&writes, SettingsField::TrackerToken), None);

        apply_writes(&mut row, &writes);
        assert_eq!(row.tracker_token.as_deref(), Some(sealed.as_str()));
        assert_eq!(row.project_key.as_deref(), Some("PROJ"));
    }

    #[test]
    fn sentinel_after_a_real_update_keeps_the_new_value() {
        let store = store();
        let mut row = UserSettingsRow::default();

        let writes =
            reconcile(Some(&row), &input(json!({"trackerToken": "new-pat"})), &store).unwrap();
        apply_writes(&mut row, &writes);
        let sealed = row.tracker_token.clone().unwrap();
        assert_eq!(store.decrypt(&sealed).as_deref(), Some("new-pat"));

        let writes =
            reconcile(Some(&row), &input(json!({"trackerToken": SECRET_MASK})), &store).unwrap();
        apply_writes(&mut row, &writes);
        assert_eq!(row.tracker_token.as_deref(), Some(sealed.as_str()));
    }

    #[test]
    fn blank_and_null_secrets_clear_the_stored_value() {
        let store = store();
        let row = UserSettingsRow {
            wiki_password: Some(store.encrypt("old").unwrap()),
            ..Default::default()
        };
        for incoming in [json!({"wikiPassword": "   "}), json!({"wikiPassword": null})] {
            let writes = reconcile(Some(&row), &input(incoming), &store).unwrap();
            assert_eq!(
                write_for(&writes, SettingsField::WikiPassword).map(|w| &w.value),
                Some(&WriteValue::Null)
            );
        }
    }

    #[test]
    fn new_secret_values_are_encrypted_before_writing() {
        let store = store();
        let writes = reconcile(
            None,
            &input(json!({"chatCredentials": "client-id:client-secret"})),
            &store,
        )
        .unwrap();
        let value = write_for(&writes, SettingsField::ChatCredentials)
            .map(|w| &w.value)
            .unwrap();
        match value {
            WriteValue::Text(blob) => {
                assert_ne!(blob, "client-id:client-secret");
                assert_eq!(
                    store.decrypt(blob).as_deref(),
                    Some("client-id:client-secret")
                );
            }
            other => panic!("expected ciphertext, got {other:?}"),
        }
    }

    #[test]
    fn scalars_coalesce_and_blank_normalizes_to_null() {
        let store = store();
        let row = UserSettingsRow {
            chat_model: Some("GigaChat".to_owned()),
            chat_scope: Some("GIGACHAT_API_PERS".to_owned()),
            ..Default::default()
        };
        let writes = reconcile(
            Some(&row),
            &input(json!({"chatModel": null, "chatScope": ""})),
            &store,
        )
        .unwrap();
        // Null keeps, blank overwrites with null.
        assert_eq!(write_for(&writes, SettingsField::ChatModel), None);
        assert_eq!(
            write_for(&writes, SettingsField::ChatScope).map(|w| &w.value),
            Some(&WriteValue::Null)
        );
    }

    #[test]
    fn timeout_normalizes_strings_and_rejects_garbage() {
        let store = store();
        let writes = reconcile(None, &input(json!({"chatTimeout": " 900 "})), &store).unwrap();
        assert_eq!(
            write_for(&writes, SettingsField::ChatTimeout).map(|w| &w.value),
            Some(&WriteValue::Integer(900))
        );

        for bad in [json!({"chatTimeout": -1}), json!({"chatTimeout": "soon"})] {
            let err = reconcile(None, &input(bad), &store).unwrap_err();
            assert!(matches!(err, SettingsError::Validation(_)));
        }
    }

    #[test]
    fn validation_failure_produces_no_writes_at_all() {
        let store = store();
        let err = reconcile(
            None,
            &input(json!({"chatTimeout": -5, "projectKey": "PROJ"})),
            &store,
        )
        .unwrap_err();
        assert!(matches!(err, SettingsError::Validation(_)));
    }

    #[test]
    fn first_write_defaults_the_system_prompt() {
        let store = store();
        let writes = reconcile(None, &input(json!({"projectKey": "PROJ"})), &store).unwrap();
        assert_eq!(
            write_for(&writes, SettingsField::SystemPrompt).map(|w| &w.value),
            Some(&WriteValue::Text(DEFAULT_SYSTEM_PROMPT.to_owned()))
        );

        // An explicit override on first write wins over the default.
        let writes =
            reconcile(None, &input(json!({"systemPrompt": "Отвечай кратко."})), &store).unwrap();
        assert_eq!(
            write_for(&writes, SettingsField::SystemPrompt).map(|w| &w.value),
            Some(&WriteValue::Text("Отвечай кратко.".to_owned()))
        );
    }

    #[test]
    fn existing_rows_do_not_get_the_prompt_default_reapplied() {
        let store = store();
        let row = UserSettingsRow::default();
        let writes = reconcile(Some(&row), &input(json!({"projectKey": "PROJ"})), &store).unwrap();
        assert_eq!(write_for(&writes, SettingsField::SystemPrompt), None);
    }

    #[test]
    fn context_type_switch_keeps_both_storage_slots() {
        let store = store();
        let mut row = UserSettingsRow {
            project_context_text: Some("Глоссарий проекта".to_owned()),
            ..Default::default()
        };
        let writes = reconcile(
            Some(&row),
            &input(json!({
                "projectContextType": "confluence",
                "projectContextUrl": "https://confluence.local/pages/viewpage.action?pageId=1",
            })),
            &store,
        )
        .unwrap();
        apply_writes(&mut row, &writes);
        assert_eq!(row.project_context_type, ProjectContextSource::Confluence);
        // The inline text slot keeps its stale value; only the
        // discriminator decides which slot is read.
        assert_eq!(
            row.project_context_text.as_deref(),
            Some("Глоссарий проекта")
        );
    }
}
