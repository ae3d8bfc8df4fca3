use serde::{Deserialize, Serialize};

use crate::github::{enrich_pull_requests, FetchError, GitHubClient, PullRequest, RepoId};

/// Largest `per_page` the GitHub listing endpoint honours
pub const MAX_PER_PAGE: u32 = 100;
/// Default ceiling on listing pages per fetch (500 PRs at 100 per page)
pub const DEFAULT_MAX_PAGES: u32 = 5;

/// How the driver decides there is another page to request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaginationStrategy {
    /// Request pages 1, 2, ... until a short page or the page ceiling
    #[default]
    Ceiling,
    /// Follow `rel="next"` from the Link header, still bounded by the ceiling
    Link,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    pub per_page: u32,
    pub max_pages: u32,
    pub strategy: PaginationStrategy,
    pub enrich: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            per_page: MAX_PER_PAGE,
            max_pages: DEFAULT_MAX_PAGES,
            strategy: PaginationStrategy::default(),
            enrich: false,
        }
    }
}

/// Fetch every PR of `repo`, in the order GitHub lists them.
///
/// Pages are requested one at a time. The first failing page aborts the whole
/// fetch and the records gathered so far are dropped.
pub async fn fetch_pull_requests(
    client: &GitHubClient,
    repo: &RepoId,
    options: &FetchOptions,
) -> Result<Vec<PullRequest>, FetchError> {
    let per_page = options.per_page.clamp(1, MAX_PER_PAGE);
    let max_pages = options.max_pages.max(1);

    let mut all_prs = Vec::new();
    let mut url = client.pulls_url(repo, per_page, 1);

    for page_number in 1..=max_pages {
        let page = client.get_pulls_page(&url).await?;
        log::debug!(
            "{} page {}: {} PRs ({} on the wire)",
            repo,
            page_number,
            page.items.len(),
            page.raw_len
        );

        let next_url = match options.strategy {
            PaginationStrategy::Ceiling => {
                // A short page means GitHub has nothing further
                if page.raw_len < per_page as usize {
                    None
                } else {
                    Some(client.pulls_url(repo, per_page, page_number + 1))
                }
            }
            PaginationStrategy::Link => page.links.get("next").cloned(),
        };

        all_prs.extend(page.items);

        match next_url {
            Some(next) => url = next,
            None => break,
        }
    }

    log::debug!(
        "Fetched {} PRs for {} from {}",
        all_prs.len(),
        repo,
        client.base_url()
    );

    if options.enrich {
        if let Some(octocrab) = client.octocrab() {
            all_prs = enrich_pull_requests(octocrab, repo, all_prs).await;
        }
    }

    Ok(all_prs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::create_client;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PULLS_PATH: &str = "/repos/owner/repo/pulls";

    fn pr_page(start: u64, count: u64) -> serde_json::Value {
        let items: Vec<_> = (start..start + count)
            .map(|n| {
                json!({
                    "number": n,
                    "title": format!("PR {}", n),
                    "user": { "login": "octocat" },
                    "state": if n % 2 == 0 { "open" } else { "closed" },
                    "html_url": format!("https://github.com/owner/repo/pull/{}", n),
                    "created_at": "2024-01-01T00:00:00Z",
                    "closed_at": null
                })
            })
            .collect();
        serde_json::Value::Array(items)
    }

    async fn mount_page(server: &MockServer, page: u32, body: ResponseTemplate, expected_calls: u64) {
        Mock::given(method("GET"))
            .and(path(PULLS_PATH))
            .and(query_param("state", "all"))
            .and(query_param("page", page.to_string()))
            .respond_with(body)
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    fn repo() -> RepoId {
        RepoId::parse("owner/repo").unwrap()
    }

    async fn client_for(server: &MockServer) -> GitHubClient {
        create_client(&server.uri(), Duration::from_secs(5), false).unwrap()
    }

    #[tokio::test]
    async fn test_stops_after_short_page() {
        let server = MockServer::start().await;
        mount_page(&server, 1, ResponseTemplate::new(200).set_body_json(pr_page(1, 100)), 1).await;
        mount_page(&server, 2, ResponseTemplate::new(200).set_body_json(pr_page(101, 100)), 1).await;
        mount_page(&server, 3, ResponseTemplate::new(200).set_body_json(pr_page(201, 50)), 1).await;
        mount_page(&server, 4, ResponseTemplate::new(200).set_body_json(pr_page(251, 1)), 0).await;

        let client = client_for(&server).await;
        let prs = fetch_pull_requests(&client, &repo(), &FetchOptions::default())
            .await
            .unwrap();

        assert_eq!(prs.len(), 250);
        // Concatenated in page order
        assert_eq!(prs[0].number, 1);
        assert_eq!(prs[100].number, 101);
        assert_eq!(prs[249].number, 250);

        server.verify().await;
    }

    #[tokio::test]
    async fn test_stops_at_page_ceiling() {
        let server = MockServer::start().await;
        for page in 1..=5 {
            let start = (page as u64 - 1) * 100 + 1;
            mount_page(&server, page, ResponseTemplate::new(200).set_body_json(pr_page(start, 100)), 1)
                .await;
        }
        mount_page(&server, 6, ResponseTemplate::new(200).set_body_json(pr_page(501, 100)), 0).await;

        let client = client_for(&server).await;
        let prs = fetch_pull_requests(&client, &repo(), &FetchOptions::default())
            .await
            .unwrap();

        assert_eq!(prs.len(), 500);
        server.verify().await;
    }

    #[tokio::test]
    async fn test_empty_repository() {
        let server = MockServer::start().await;
        mount_page(&server, 1, ResponseTemplate::new(200).set_body_json(json!([])), 1).await;
        mount_page(&server, 2, ResponseTemplate::new(200).set_body_json(json!([])), 0).await;

        let client = client_for(&server).await;
        let prs = fetch_pull_requests(&client, &repo(), &FetchOptions::default())
            .await
            .unwrap();

        assert!(prs.is_empty());
        server.verify().await;
    }

    #[tokio::test]
    async fn test_rate_limit_on_second_page_discards_everything() {
        let server = MockServer::start().await;
        mount_page(&server, 1, ResponseTemplate::new(200).set_body_json(pr_page(1, 100)), 1).await;
        mount_page(
            &server,
            2,
            ResponseTemplate::new(403).set_body_json(json!({ "message": "API rate limit exceeded" })),
            1,
        )
        .await;
        mount_page(&server, 3, ResponseTemplate::new(200).set_body_json(pr_page(201, 10)), 0).await;

        let client = client_for(&server).await;
        let result = fetch_pull_requests(&client, &repo(), &FetchOptions::default()).await;

        match result {
            Err(err) => assert!(err.is_rate_limited(), "unexpected error: {:?}", err),
            Ok(prs) => panic!("expected rate limit error, got {} PRs", prs.len()),
        }
        server.verify().await;
    }

    #[tokio::test]
    async fn test_server_error_carries_status_and_reason() {
        let server = MockServer::start().await;
        mount_page(&server, 1, ResponseTemplate::new(500), 1).await;

        let client = client_for(&server).await;
        let err = fetch_pull_requests(&client, &repo(), &FetchOptions::default())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            FetchError::Api {
                status: 500,
                reason: "Internal Server Error".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_link_strategy_follows_next() {
        let server = MockServer::start().await;
        let next = format!("{}{}?state=all&per_page=2&page=2", server.uri(), PULLS_PATH);
        mount_page(
            &server,
            1,
            ResponseTemplate::new(200)
                .set_body_json(pr_page(1, 2))
                .insert_header("Link", format!("<{}>; rel=\"next\"", next)),
            1,
        )
        .await;
        // Full page but no next link: the link strategy stops here
        mount_page(&server, 2, ResponseTemplate::new(200).set_body_json(pr_page(3, 2)), 1).await;
        mount_page(&server, 3, ResponseTemplate::new(200).set_body_json(pr_page(5, 2)), 0).await;

        let client = client_for(&server).await;
        let options = FetchOptions {
            per_page: 2,
            strategy: PaginationStrategy::Link,
            ..FetchOptions::default()
        };
        let prs = fetch_pull_requests(&client, &repo(), &options).await.unwrap();

        let numbers: Vec<u64> = prs.iter().map(|pr| pr.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        server.verify().await;
    }

    #[tokio::test]
    async fn test_link_strategy_respects_ceiling() {
        let server = MockServer::start().await;
        for page in 1..=3u32 {
            let next = format!("{}{}?state=all&per_page=1&page={}", server.uri(), PULLS_PATH, page + 1);
            let expected = if page <= 2 { 1 } else { 0 };
            mount_page(
                &server,
                page,
                ResponseTemplate::new(200)
                    .set_body_json(pr_page(page as u64, 1))
                    .insert_header("Link", format!("<{}>; rel=\"next\"", next)),
                expected,
            )
            .await;
        }

        let client = client_for(&server).await;
        let options = FetchOptions {
            per_page: 1,
            max_pages: 2,
            strategy: PaginationStrategy::Link,
            enrich: false,
        };
        let prs = fetch_pull_requests(&client, &repo(), &options).await.unwrap();

        assert_eq!(prs.len(), 2);
        server.verify().await;
    }

    #[test]
    fn test_strategy_deserializes_lowercase() {
        let strategy: PaginationStrategy = serde_json::from_str("\"link\"").unwrap();
        assert_eq!(strategy, PaginationStrategy::Link);
        assert_eq!(PaginationStrategy::default(), PaginationStrategy::Ceiling);
    }
}
