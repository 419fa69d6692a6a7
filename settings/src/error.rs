use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    /// Malformed settings input; nothing was written.
    #[error("invalid settings: {0}")]
    Validation(String),

    /// The server-side encryption key is missing or unusable.
    #[error("encryption is not configured: {0}")]
    Config(String),

    /// Sealing a secret failed.
    #[error("failed to encrypt secret")]
    Crypto,

    /// A repository implementation failed to read or apply writes.
    #[error("settings storage error: {0}")]
    Storage(String),
}
