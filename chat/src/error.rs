use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    /// Chat credentials are missing or cannot be decrypted. Surfaced to the
    /// user as "configure the chat provider in settings", never fatal.
    #[error("chat provider is not configured: {0}")]
    Config(String),

    /// The provider answered with a non-success status.
    #[error("chat provider error ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// The request never produced a usable response.
    #[error("chat request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered 2xx but the body was not what we expect.
    #[error("unexpected chat response: {0}")]
    Parse(String),
}
