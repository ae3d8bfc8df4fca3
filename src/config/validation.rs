use super::Config;
use crate::fetch::MAX_PER_PAGE;
use crate::filter::max_at_risk_after;
use crate::github::RepoId;

/// Validate a configuration, collecting every problem instead of stopping at
/// the first one
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Err(e) = RepoId::parse(&config.default_repository) {
        errors.push(format!("default_repository: {}", e));
    }

    if !(config.api_url.starts_with("https://") || config.api_url.starts_with("http://")) {
        errors.push(format!(
            "api_url: '{}' must start with http:// or https://",
            config.api_url
        ));
    }

    if config.per_page == 0 || config.per_page > MAX_PER_PAGE {
        errors.push(format!(
            "per_page: {} is out of range (1-{})",
            config.per_page, MAX_PER_PAGE
        ));
    }

    if config.max_pages == 0 {
        errors.push("max_pages: must be at least 1".to_string());
    }

    if config.page_size == 0 {
        errors.push("page_size: must be at least 1".to_string());
    }

    match humantime::parse_duration(&config.at_risk_after) {
        Ok(d) if chrono::Duration::from_std(d).map_or(true, |d| d > max_at_risk_after()) => {
            errors.push(format!(
                "at_risk_after: '{}' exceeds the maximum of {} days",
                config.at_risk_after,
                max_at_risk_after().num_days()
            ))
        }
        Ok(_) => {}
        Err(e) => errors.push(format!(
            "at_risk_after: invalid duration '{}': {}",
            config.at_risk_after, e
        )),
    }

    match humantime::parse_duration(&config.request_timeout) {
        Ok(d) if d.is_zero() => errors.push("request_timeout: must be greater than zero".to_string()),
        Ok(_) => {}
        Err(e) => errors.push(format!(
            "request_timeout: invalid duration '{}': {}",
            config.request_timeout, e
        )),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
