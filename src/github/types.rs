use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use super::error::FetchError;

/// Author shown when GitHub omits the `user` object (deleted accounts)
const GHOST_AUTHOR: &str = "ghost";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrState {
    Open,
    Closed,
}

impl PrState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrState::Open => "open",
            PrState::Closed => "closed",
        }
    }
}

impl fmt::Display for PrState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(PrState::Open),
            "closed" => Ok(PrState::Closed),
            other => Err(format!("unknown pull request state '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub author: String,
    pub state: PrState,
    pub url: String,            // HTML URL for browser
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub additions: u64,
    pub deletions: u64,
}

impl PullRequest {
    pub fn is_open(&self) -> bool {
        self.state == PrState::Open
    }

    /// Time elapsed since the PR was opened, relative to `now`
    pub fn age_at(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.created_at
    }
}

/// One element of the `GET /repos/{owner}/{repo}/pulls` response.
///
/// Everything except `number`, `state` and `created_at` is optional so that a
/// partially populated element still decodes.
#[derive(Debug, Deserialize)]
pub(crate) struct PullRequestPayload {
    number: Option<u64>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    user: Option<UserPayload>,
    state: Option<String>,
    #[serde(default)]
    html_url: Option<String>,
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    additions: Option<u64>,
    #[serde(default)]
    deletions: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    login: Option<String>,
}

impl TryFrom<PullRequestPayload> for PullRequest {
    type Error = String;

    fn try_from(payload: PullRequestPayload) -> Result<Self, Self::Error> {
        let number = payload.number.ok_or("missing `number`")?;
        let state = payload
            .state
            .as_deref()
            .ok_or_else(|| format!("#{}: missing `state`", number))?
            .parse::<PrState>()
            .map_err(|e| format!("#{}: {}", number, e))?;
        let created_at = payload
            .created_at
            .ok_or_else(|| format!("#{}: missing `created_at`", number))?;

        Ok(PullRequest {
            number,
            title: payload.title.unwrap_or_default(),
            author: payload
                .user
                .and_then(|u| u.login)
                .unwrap_or_else(|| GHOST_AUTHOR.to_string()),
            state,
            url: payload.html_url.unwrap_or_default(),
            created_at,
            closed_at: payload.closed_at,
            additions: payload.additions.unwrap_or(0),
            deletions: payload.deletions.unwrap_or(0),
        })
    }
}

/// A validated `owner/name` repository identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    owner: String,
    name: String,
}

impl RepoId {
    pub fn parse(input: &str) -> Result<Self, FetchError> {
        let trimmed = input.trim();
        let invalid = || FetchError::InvalidRepository(trimmed.to_string());

        let (owner, name) = trimmed.split_once('/').ok_or_else(invalid)?;
        let valid_part = |part: &str| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        };
        if !valid_part(owner) || !valid_part(name) {
            return Err(invalid());
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: serde_json::Value) -> Result<PullRequest, String> {
        let payload: PullRequestPayload = serde_json::from_value(value).unwrap();
        PullRequest::try_from(payload)
    }

    #[test]
    fn test_decode_full_payload() {
        let pr = decode(json!({
            "number": 42,
            "title": "Fix the thing",
            "user": { "login": "octocat" },
            "state": "closed",
            "html_url": "https://github.com/owner/repo/pull/42",
            "created_at": "2024-03-01T10:00:00Z",
            "closed_at": "2024-03-02T10:00:00Z",
            "additions": 12,
            "deletions": 3
        }))
        .unwrap();

        assert_eq!(pr.number, 42);
        assert_eq!(pr.author, "octocat");
        assert_eq!(pr.state, PrState::Closed);
        assert!(pr.closed_at.is_some());
        assert_eq!(pr.additions, 12);
        assert_eq!(pr.deletions, 3);
    }

    #[test]
    fn test_decode_defaults_missing_optional_fields() {
        let pr = decode(json!({
            "number": 7,
            "state": "open",
            "created_at": "2024-03-01T10:00:00Z",
            "user": null
        }))
        .unwrap();

        assert_eq!(pr.title, "");
        assert_eq!(pr.author, "ghost");
        assert_eq!(pr.url, "");
        assert_eq!(pr.closed_at, None);
        assert_eq!(pr.additions, 0);
        assert_eq!(pr.deletions, 0);
    }

    #[test]
    fn test_decode_rejects_missing_number() {
        let err = decode(json!({ "state": "open", "created_at": "2024-03-01T10:00:00Z" }))
            .unwrap_err();
        assert!(err.contains("number"));
    }

    #[test]
    fn test_decode_rejects_unknown_state() {
        let err = decode(json!({
            "number": 1,
            "state": "merged",
            "created_at": "2024-03-01T10:00:00Z"
        }))
        .unwrap_err();
        assert!(err.contains("merged"));
    }

    #[test]
    fn test_state_parse_is_case_insensitive() {
        assert_eq!("OPEN".parse::<PrState>().unwrap(), PrState::Open);
        assert_eq!(" Closed ".parse::<PrState>().unwrap(), PrState::Closed);
    }

    #[test]
    fn test_repo_id_parse() {
        let repo = RepoId::parse("  facebook/react ").unwrap();
        assert_eq!(repo.owner(), "facebook");
        assert_eq!(repo.name(), "react");
        assert_eq!(repo.to_string(), "facebook/react");
    }

    #[test]
    fn test_repo_id_rejects_malformed() {
        for input in ["", "react", "/react", "facebook/", "a/b/c", "face book/react"] {
            assert!(
                matches!(RepoId::parse(input), Err(FetchError::InvalidRepository(_))),
                "expected {:?} to be rejected",
                input
            );
        }
    }
}
