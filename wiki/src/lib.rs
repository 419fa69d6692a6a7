//! Wiki collaborator: fetches a Confluence page over its REST content API
//! and reduces the storage-format HTML body to plain text suitable for
//! injection into an AI prompt.

mod client;
mod error;
mod html_text;

pub use client::ConfluenceClient;
pub use client::PageRef;
pub use client::WikiCredentials;
pub use client::WikiFetcher;
pub use client::WikiPage;
pub use client::parse_page_url;
pub use error::WikiError;
pub use html_text::extract_text;
