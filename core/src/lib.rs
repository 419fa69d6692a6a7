//! Companion core: wires the tracker, wiki, chat and settings crates into
//! the AI-assist pipeline.
//!
//! The route layer talks to this crate through three operations:
//! [`planmate_tracker::build_tree`] for the dashboard,
//! [`Companion::assemble_prompt`] for prompt preview, and
//! [`Companion::generate_ai_assist`] for the full round trip to the chat
//! provider. Settings writes go through [`planmate_settings::reconcile`].

mod assist;
mod config;
mod default_client;
mod error;
mod prompt;

pub use assist::AssembledPrompt;
pub use assist::Companion;
pub use config::CHAT_API_URL_ENV_VAR;
pub use config::CHAT_AUTH_URL_ENV_VAR;
pub use config::CompanionConfig;
pub use config::ENCRYPTION_KEY_ENV_VAR;
pub use default_client::create_client;
pub use error::AssistError;
pub use prompt::EpicContext;
pub use prompt::PromptContext;
pub use prompt::format_epic_block;
pub use prompt::format_user_message;

pub use planmate_chat::ChatGateway;
pub use planmate_settings::CredentialStore;
pub use planmate_settings::SettingsInput;
pub use planmate_settings::UserSettingsRow;
pub use planmate_settings::reconcile;
pub use planmate_tracker::IssueTree;
pub use planmate_tracker::build_tree;
