//! Per-user configuration: encrypt-at-rest credential storage, the masked
//! read view, and the field-by-field settings reconciler.
//!
//! Secrets never leave this crate in the clear: reads surface the masking
//! sentinel, and the reconciler treats an echoed sentinel as "unchanged".

mod crypto;
mod error;
mod model;
mod reconcile;
mod repository;

pub use crypto::CredentialStore;
pub use error::SettingsError;
pub use model::DEFAULT_SYSTEM_PROMPT;
pub use model::ProjectContextSource;
pub use model::SECRET_MASK;
pub use model::SettingsInput;
pub use model::SettingsView;
pub use model::TimeoutValue;
pub use model::UserSettingsRow;
pub use reconcile::FieldWrite;
pub use reconcile::SettingsField;
pub use reconcile::WriteValue;
pub use reconcile::apply_writes;
pub use reconcile::reconcile;
pub use repository::SettingsRepository;
