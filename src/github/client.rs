use anyhow::{Context, Result};
use octocrab::Octocrab;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use std::time::Duration;

/// Public GitHub REST API host
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Unauthenticated GitHub REST client.
///
/// Listing goes through plain `reqwest` so every status code is visible to the
/// fetch driver. The octocrab handle is only built when per-PR enrichment is
/// enabled.
#[derive(Clone)]
pub struct GitHubClient {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) octocrab: Option<Octocrab>,
}

impl GitHubClient {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn octocrab(&self) -> Option<&Octocrab> {
        self.octocrab.as_ref()
    }
}

/// Install the ring provider as the rustls process default (required for
/// rustls 0.23+). Later calls are no-ops.
pub fn install_crypto_provider() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        log::debug!("rustls crypto provider already installed");
    }
}

/// Create a client against `api_url` (usually [`DEFAULT_API_URL`])
pub fn create_client(api_url: &str, timeout: Duration, enrich: bool) -> Result<GitHubClient> {
    install_crypto_provider();

    let base_url = api_url.trim_end_matches('/').to_string();

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

    let http = reqwest::Client::builder()
        .user_agent(concat!("pr-dash/", env!("CARGO_PKG_VERSION")))
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .context("Failed to create HTTP client")?;

    let octocrab = if enrich {
        let client = Octocrab::builder()
            .base_uri(base_url.as_str())
            .context("Invalid GitHub API URL")?
            .build()
            .context("Failed to create GitHub client")?;
        Some(client)
    } else {
        None
    };

    Ok(GitHubClient {
        http,
        base_url,
        octocrab,
    })
}
