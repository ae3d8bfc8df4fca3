pub mod client;
pub mod enrich;
pub mod error;
pub mod link;
pub mod pulls;
pub mod types;

pub use client::{create_client, install_crypto_provider, GitHubClient, DEFAULT_API_URL};
pub use enrich::enrich_pull_requests;
pub use error::FetchError;
pub use link::parse_link_header;
pub use pulls::PullsPage;
pub use types::{PrState, PullRequest, RepoId};
