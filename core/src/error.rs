use planmate_chat::ChatError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssistError {
    /// The companion cannot be assembled for this user: required settings
    /// are missing. Epic and glossary lookups never end up here; they
    /// degrade to an omitted block instead.
    #[error("companion is not configured: {0}")]
    Config(String),

    /// The completion call failed. Unlike the context fetches, there is no
    /// reply to synthesize without it, so this propagates.
    #[error(transparent)]
    Chat(#[from] ChatError),
}
