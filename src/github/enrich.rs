use anyhow::{Context, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use octocrab::Octocrab;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_retry::{strategy::ExponentialBackoff, RetryIf};

use super::types::{PullRequest, RepoId};

const MAX_CONCURRENT_ENRICHMENTS: usize = 10;

/// Fetch additions/deletions for a single PR.
///
/// The listing endpoint leaves these out, only `GET /pulls/{number}` has them.
async fn fetch_pr_size(client: &Octocrab, repo: &RepoId, number: u64) -> Result<(u64, u64)> {
    let retry_strategy = ExponentialBackoff::from_millis(100)
        .max_delay(std::time::Duration::from_secs(5))
        .take(3);

    let pr = RetryIf::spawn(
        retry_strategy,
        || async { client.pulls(repo.owner(), repo.name()).get(number).await },
        is_transient,
    )
    .await
    .map_err(|e| {
        if is_forbidden(&e) {
            anyhow::Error::new(RateLimitHit)
        } else {
            anyhow::Error::new(e)
        }
    })
    .with_context(|| format!("Failed to fetch details for #{}", number))?;

    let additions = pr.additions.unwrap_or(0) as u64;
    let deletions = pr.deletions.unwrap_or(0) as u64;

    Ok((additions, deletions))
}

fn is_forbidden(error: &octocrab::Error) -> bool {
    matches!(
        error,
        octocrab::Error::GitHub { source, .. } if source.status_code == http::StatusCode::FORBIDDEN
    )
}

/// 4xx answers (403 included) come back the same on a retry
fn is_transient(error: &octocrab::Error) -> bool {
    !matches!(
        error,
        octocrab::Error::GitHub { source, .. } if source.status_code.is_client_error()
    )
}

#[derive(Debug, thiserror::Error)]
#[error("rate limit exceeded")]
struct RateLimitHit;

async fn enrich_one(
    client: Octocrab,
    repo: Arc<RepoId>,
    index: usize,
    mut pr: PullRequest,
    rate_limited: Arc<AtomicBool>,
) -> (usize, PullRequest) {
    if rate_limited.load(Ordering::Relaxed) {
        return (index, pr);
    }

    match fetch_pr_size(&client, &repo, pr.number).await {
        Ok((additions, deletions)) => {
            pr.additions = additions;
            pr.deletions = deletions;
        }
        Err(e) if e.downcast_ref::<RateLimitHit>().is_some() => {
            log::warn!("Rate limit hit during enrichment. Remaining PRs keep listing data.");
            rate_limited.store(true, Ordering::Relaxed);
        }
        Err(e) => {
            log::warn!("Failed to enrich PR #{}: {:#}", pr.number, e);
        }
    }
    (index, pr)
}

/// Fill in additions/deletions for every PR, keeping the input order.
///
/// Best effort: failures leave the listing values in place, and a 403 stops
/// any further requests.
pub async fn enrich_pull_requests(
    client: &Octocrab,
    repo: &RepoId,
    prs: Vec<PullRequest>,
) -> Vec<PullRequest> {
    let total = prs.len();
    let repo = Arc::new(repo.clone());
    let rate_limited = Arc::new(AtomicBool::new(false));

    let mut futures = FuturesUnordered::new();
    let mut prs_iter = prs.into_iter().enumerate();
    let mut enriched: Vec<(usize, PullRequest)> = Vec::with_capacity(total);

    for _ in 0..MAX_CONCURRENT_ENRICHMENTS {
        if let Some((index, pr)) = prs_iter.next() {
            futures.push(enrich_one(
                client.clone(),
                repo.clone(),
                index,
                pr,
                rate_limited.clone(),
            ));
        }
    }

    while let Some(done) = futures.next().await {
        enriched.push(done);

        if !rate_limited.load(Ordering::Relaxed) {
            if let Some((index, pr)) = prs_iter.next() {
                futures.push(enrich_one(
                    client.clone(),
                    repo.clone(),
                    index,
                    pr,
                    rate_limited.clone(),
                ));
            }
        }
    }

    // Anything never submitted (rate limited) goes back unchanged
    enriched.extend(prs_iter);
    enriched.sort_by_key(|(index, _)| *index);

    log::debug!("Enriched {} PRs", total);
    enriched.into_iter().map(|(_, pr)| pr).collect()
}
