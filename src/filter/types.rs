use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;

use crate::github::PrState;

/// Repository shown when the repository input is left blank
pub const DEFAULT_REPOSITORY: &str = "facebook/react";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Open,
    Closed,
}

impl StatusFilter {
    /// Whether a PR in `state` passes this filter
    pub fn accepts(&self, state: PrState) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Open => state == PrState::Open,
            StatusFilter::Closed => state == PrState::Closed,
        }
    }

    /// Next value in the All -> Open -> Closed rotation
    pub fn cycle(&self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Open,
            StatusFilter::Open => StatusFilter::Closed,
            StatusFilter::Closed => StatusFilter::All,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Open => "open",
            StatusFilter::Closed => "closed",
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "open" => Ok(StatusFilter::Open),
            "closed" => Ok(StatusFilter::Closed),
            other => Err(format!(
                "invalid status '{}': expected all, open or closed",
                other
            )),
        }
    }
}

/// User-controlled filter inputs.
///
/// Dates are kept as typed so half-entered values survive editing; they are
/// only interpreted when a filter pass runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub status: StatusFilter,
    pub opened_after: String,
    pub opened_before: String,
    pub at_risk: bool,
    pub repository: String,
}

impl FilterSpec {
    /// Trimmed repository input, or `fallback` when the input is blank
    pub fn effective_repository<'a>(&'a self, fallback: &'a str) -> &'a str {
        let trimmed = self.repository.trim();
        if trimmed.is_empty() {
            fallback
        } else {
            trimmed
        }
    }

    pub fn opened_after_date(&self) -> Option<DateTime<Utc>> {
        parse_filter_date(&self.opened_after)
    }

    pub fn opened_before_date(&self) -> Option<DateTime<Utc>> {
        parse_filter_date(&self.opened_before)
    }
}

/// Interpret a date filter input.
///
/// Accepts `YYYY-MM-DD` (midnight UTC) or a full RFC 3339 timestamp. Blank or
/// unparsable input gives `None`, which leaves that bound inactive.
pub fn parse_filter_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }

    DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_status_parse_case_insensitive() {
        assert_eq!("All".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!("OPEN".parse::<StatusFilter>().unwrap(), StatusFilter::Open);
        assert_eq!("closed".parse::<StatusFilter>().unwrap(), StatusFilter::Closed);
        assert!("merged".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn test_status_cycle_wraps() {
        let status = StatusFilter::All.cycle().cycle().cycle();
        assert_eq!(status, StatusFilter::All);
        assert_eq!(StatusFilter::All.cycle(), StatusFilter::Open);
    }

    #[test]
    fn test_effective_repository_falls_back_when_blank() {
        let mut spec = FilterSpec::default();
        assert_eq!(spec.effective_repository(DEFAULT_REPOSITORY), "facebook/react");

        spec.repository = "   ".to_string();
        assert_eq!(spec.effective_repository(DEFAULT_REPOSITORY), "facebook/react");

        spec.repository = "  rust-lang/rust ".to_string();
        assert_eq!(spec.effective_repository(DEFAULT_REPOSITORY), "rust-lang/rust");
    }

    #[test]
    fn test_parse_plain_date_is_utc_midnight() {
        assert_eq!(
            parse_filter_date("2024-02-29"),
            Some(Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_rfc3339_converts_to_utc() {
        assert_eq!(
            parse_filter_date("2024-01-05T12:00:00+02:00"),
            Some(Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_malformed_date_is_inactive() {
        assert_eq!(parse_filter_date(""), None);
        assert_eq!(parse_filter_date("2024-13-01"), None);
        assert_eq!(parse_filter_date("2024-02"), None);
        assert_eq!(parse_filter_date("yesterday"), None);
    }
}
