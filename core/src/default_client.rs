use std::time::Duration;

/// Shared HTTP client for every outbound collaborator.
///
/// Built once by the composition root and cloned into the tracker, wiki and
/// chat clients; reqwest clients share their connection pool across clones.
pub fn create_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(concat!("planmate/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_default()
}
