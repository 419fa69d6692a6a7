//! Chat provider integration: OAuth token handling, the non-streaming
//! completion transport, and the gateway the AI-assist pipeline calls.

mod error;
mod gateway;
mod transport;

pub use error::ChatError;
pub use gateway::ChatGateway;
pub use gateway::ChatSettings;
pub use gateway::ChatStatus;
pub use gateway::chat_settings;
pub use transport::ChatEndpoints;
pub use transport::ChatMessage;
pub use transport::ChatRequest;
pub use transport::ChatResponse;
pub use transport::ChatTransport;
pub use transport::DEFAULT_MODEL;
pub use transport::DEFAULT_SCOPE;
pub use transport::DEFAULT_TIMEOUT_SECS;
pub use transport::GigaChatTransport;
