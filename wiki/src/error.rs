use thiserror::Error;

#[derive(Debug, Error)]
pub enum WikiError {
    /// The configured page URL is not a viewpage link with a pageId.
    #[error("invalid wiki page URL: {0}")]
    InvalidUrl(String),

    /// The wiki answered with a non-success status.
    #[error("wiki API error ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// The request never produced a usable response.
    #[error("wiki request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The wiki answered 2xx but the body was not what we expect.
    #[error("unexpected wiki response: {0}")]
    Parse(String),
}
