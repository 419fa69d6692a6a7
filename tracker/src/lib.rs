//! Issue-tracker integration: normalized issue model, the epic/story/subtask
//! tree reconstruction used by the dashboard, and the Jira REST collaborator.
//!
//! The tree builder is a pure function over the flat search result; it never
//! fails and degrades unresolvable records to placeholder values instead.

mod client;
mod error;
mod issue;
mod status;
mod tree;

pub use client::JiraClient;
pub use client::TrackerClient;
pub use client::normalize_base_url;
pub use error::TrackerError;
pub use issue::Attachment;
pub use issue::Issue;
pub use issue::IssueDetail;
pub use issue::IssueTypeInfo;
pub use issue::StatusInfo;
pub use issue::key_number;
pub use issue::normalize_issue;
pub use status::Tier;
pub use status::classify;
pub use tree::IssueTree;
pub use tree::build_tree;
