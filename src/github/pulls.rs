use std::collections::HashMap;

use super::client::GitHubClient;
use super::error::FetchError;
use super::link::parse_link_header;
use super::types::{PullRequest, PullRequestPayload, RepoId};

/// One decoded page of the pull request listing
#[derive(Debug, Clone)]
pub struct PullsPage {
    pub items: Vec<PullRequest>,
    /// Number of elements GitHub sent, including ones skipped as malformed.
    /// The fetch driver compares this against `per_page`.
    pub raw_len: usize,
    pub links: HashMap<String, String>,
}

impl GitHubClient {
    /// URL of one page of `GET /repos/{owner}/{repo}/pulls?state=all`
    pub fn pulls_url(&self, repo: &RepoId, per_page: u32, page: u32) -> String {
        format!(
            "{}/repos/{}/{}/pulls?state=all&per_page={}&page={}",
            self.base_url,
            repo.owner(),
            repo.name(),
            per_page,
            page
        )
    }

    /// Request and decode a single listing page
    pub async fn get_pulls_page(&self, url: &str) -> Result<PullsPage, FetchError> {
        log::debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if status == http::StatusCode::FORBIDDEN {
            let message = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|body| body.get("message")?.as_str().map(str::to_string));
            return Err(FetchError::RateLimited { message });
        }
        if !status.is_success() {
            return Err(FetchError::Api {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let links = parse_link_header(
            response
                .headers()
                .get(http::header::LINK)
                .and_then(|value| value.to_str().ok()),
        );

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        let elements: Vec<serde_json::Value> =
            serde_json::from_slice(&body).map_err(|e| FetchError::Decode(e.to_string()))?;

        let raw_len = elements.len();
        let items = elements
            .into_iter()
            .filter_map(|element| {
                let decoded = serde_json::from_value::<PullRequestPayload>(element)
                    .map_err(|e| e.to_string())
                    .and_then(PullRequest::try_from);
                match decoded {
                    Ok(pr) => Some(pr),
                    Err(reason) => {
                        log::warn!("Skipping malformed pull request: {}", reason);
                        None
                    }
                }
            })
            .collect();

        Ok(PullsPage {
            items,
            raw_len,
            links,
        })
    }
}
