use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    /// Tracker connection settings are missing or unusable.
    #[error("tracker is not configured: {0}")]
    Config(String),

    /// The tracker answered with a non-success status.
    #[error("tracker API error ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// The request never produced a usable response.
    #[error("tracker request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The tracker answered 2xx but the body was not what we expect.
    #[error("unexpected tracker response: {0}")]
    Parse(String),
}
