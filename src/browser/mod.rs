use anyhow::{Context, Result};

use crate::github::PullRequest;

/// Open a URL in the user's default browser
///
/// # Errors
/// Returns error if browser cannot be opened (e.g., no browser available)
pub fn open_url(url: &str) -> Result<()> {
    webbrowser::open(url).with_context(|| format!("Failed to open browser for URL: {}", url))?;
    Ok(())
}

/// Open a PR's GitHub page
///
/// # Errors
/// Returns error if the PR has no URL or the browser cannot be opened
pub fn open_pull_request(pr: &PullRequest) -> Result<()> {
    if pr.url.is_empty() {
        anyhow::bail!("PR #{} has no URL", pr.number);
    }
    log::debug!("Opening {}", pr.url);
    open_url(&pr.url)
}
