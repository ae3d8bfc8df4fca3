use chrono::{DateTime, Duration, Utc};

use super::types::{FilterSpec, StatusFilter};
use crate::github::PullRequest;

/// Default age after which an open PR counts as at risk
pub fn default_at_risk_after() -> Duration {
    Duration::days(7)
}

/// Longest accepted at-risk threshold
pub fn max_at_risk_after() -> Duration {
    Duration::days(3650)
}

/// Start of the at-risk window. `None` when `now - threshold` falls outside
/// the representable range, in which case nothing is at risk.
fn at_risk_cutoff(now: DateTime<Utc>, threshold: Duration) -> Option<DateTime<Utc>> {
    now.checked_sub_signed(threshold)
}

/// True if `pr` is still open and was opened before `now - threshold`
pub fn is_at_risk(pr: &PullRequest, now: DateTime<Utc>, threshold: Duration) -> bool {
    pr.is_open() && at_risk_cutoff(now, threshold).is_some_and(|cutoff| pr.created_at < cutoff)
}

/// A filter pass with every input resolved up front.
///
/// Dates are parsed and the at-risk cutoff computed once, so a single pass
/// compares every PR against the same boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledFilter {
    status: StatusFilter,
    opened_after: Option<DateTime<Utc>>,
    opened_before: Option<DateTime<Utc>>,
    at_risk_only: bool,
    at_risk_cutoff: Option<DateTime<Utc>>,
}

impl CompiledFilter {
    pub fn new(spec: &FilterSpec, now: DateTime<Utc>, at_risk_after: Duration) -> Self {
        Self {
            status: spec.status,
            opened_after: spec.opened_after_date(),
            opened_before: spec.opened_before_date(),
            at_risk_only: spec.at_risk,
            at_risk_cutoff: at_risk_cutoff(now, at_risk_after),
        }
    }

    pub fn matches(&self, pr: &PullRequest) -> bool {
        if !self.status.accepts(pr.state) {
            return false;
        }
        if let Some(start) = self.opened_after {
            if pr.created_at < start {
                return false;
            }
        }
        if let Some(end) = self.opened_before {
            if pr.created_at > end {
                return false;
            }
        }
        if self.at_risk_only {
            let at_risk = pr.is_open()
                && self
                    .at_risk_cutoff
                    .is_some_and(|cutoff| pr.created_at < cutoff);
            if !at_risk {
                return false;
            }
        }
        true
    }
}

/// Apply every active filter, preserving the input order
pub fn apply_filters<'a>(
    prs: &'a [PullRequest],
    spec: &FilterSpec,
    now: DateTime<Utc>,
    at_risk_after: Duration,
) -> Vec<&'a PullRequest> {
    let filter = CompiledFilter::new(spec, now, at_risk_after);
    prs.iter().filter(|pr| filter.matches(pr)).collect()
}
