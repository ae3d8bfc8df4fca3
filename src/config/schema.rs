use serde::{Deserialize, Serialize};

use crate::fetch::{PaginationStrategy, DEFAULT_MAX_PAGES, MAX_PER_PAGE};
use crate::filter::DEFAULT_REPOSITORY;
use crate::github::DEFAULT_API_URL;
use crate::paginate::DEFAULT_PAGE_SIZE;

/// Dashboard configuration.
///
/// Every key is optional. Example YAML:
/// ```yaml
/// default_repository: rust-lang/rust
/// at_risk_after: 14d
/// pagination: link
/// max_pages: 10
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Repository loaded when the repository input is blank
    #[serde(default = "default_repository")]
    pub default_repository: String,

    /// REST API root, e.g. `https://ghe.example.com/api/v3`
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// PRs requested per listing page (GitHub caps this at 100)
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Upper bound on listing pages fetched per repository
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Rows per dashboard page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Age after which an open PR is at risk, humantime format ("7d", "36h")
    #[serde(default = "default_at_risk_after")]
    pub at_risk_after: String,

    #[serde(default)]
    pub pagination: PaginationStrategy,

    /// Fetch additions/deletions per PR (one extra request each)
    #[serde(default)]
    pub enrich: bool,

    /// Per-request timeout, humantime format
    #[serde(default = "default_request_timeout")]
    pub request_timeout: String,
}

fn default_repository() -> String {
    DEFAULT_REPOSITORY.to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_per_page() -> u32 {
    MAX_PER_PAGE
}

fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_at_risk_after() -> String {
    "7d".to_string()
}

fn default_request_timeout() -> String {
    "20s".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_repository: default_repository(),
            api_url: default_api_url(),
            per_page: default_per_page(),
            max_pages: default_max_pages(),
            page_size: default_page_size(),
            at_risk_after: default_at_risk_after(),
            pagination: PaginationStrategy::default(),
            enrich: false,
            request_timeout: default_request_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.default_repository, "facebook/react");
        assert_eq!(config.per_page, 100);
        assert_eq!(config.max_pages, 5);
        assert_eq!(config.page_size, 20);
    }

    #[test]
    fn test_partial_config_parse() {
        let yaml = r#"
default_repository: rust-lang/rust
pagination: link
enrich: true
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.default_repository, "rust-lang/rust");
        assert_eq!(config.pagination, PaginationStrategy::Link);
        assert!(config.enrich);
        assert_eq!(config.at_risk_after, "7d");
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let result: Result<Config, _> = serde_saphyr::from_str("queries: []\n");
        assert!(result.is_err());
    }
}
