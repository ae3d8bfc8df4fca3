//! Dashboard state and its update function.
//!
//! All UI-visible state lives in [`DashboardState`]. It only changes through
//! [`reduce`], which takes the current state plus an [`Action`] and returns
//! the next state along with an optional [`Command`] the runtime must carry
//! out (starting a fetch). Every fetch is tagged with a generation number and
//! its completion is dropped unless that generation is still current.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use crate::filter::{apply_filters, default_at_risk_after, FilterSpec, StatusFilter, DEFAULT_REPOSITORY};
use crate::github::{FetchError, PullRequest};
use crate::paginate::{effective_page, paginate, total_pages, DEFAULT_PAGE_SIZE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSettings {
    pub fallback_repository: String,
    pub page_size: usize,
    pub at_risk_after: Duration,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            fallback_repository: DEFAULT_REPOSITORY.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            at_risk_after: default_at_risk_after(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    SetRepository(String),
    SetStatus(StatusFilter),
    CycleStatus,
    SetOpenedAfter(String),
    SetOpenedBefore(String),
    ClearDates,
    ToggleAtRisk,
    NextPage,
    PrevPage,
    Refresh,
    FetchSucceeded {
        generation: u64,
        repository: String,
        records: Vec<PullRequest>,
    },
    FetchFailed {
        generation: u64,
        error: FetchError,
    },
}

/// Side effect requested by [`reduce`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Fetch { generation: u64, repository: String },
}

#[derive(Debug, Clone)]
pub struct DashboardState {
    pub settings: DashboardSettings,
    pub filters: FilterSpec,
    pub records: Arc<[PullRequest]>,
    /// Page the user asked for (1-based); may exceed the page count until
    /// the next view clamps it
    pub requested_page: usize,
    pub loading: bool,
    pub error: Option<String>,
    /// Bumped whenever a fetch starts; only the latest one may commit
    pub generation: u64,
    /// Repository whose records are currently held
    pub loaded_repository: Option<String>,
    /// Repository the latest fetch was started for
    pub target_repository: String,
}

/// Filtered, paginated projection of the state for rendering
#[derive(Debug, Clone)]
pub struct DashboardView<'a> {
    pub rows: Vec<&'a PullRequest>,
    pub page: usize,
    pub total_pages: usize,
    pub has_prev: bool,
    pub has_next: bool,
    pub filtered_count: usize,
    pub total_count: usize,
}

impl DashboardState {
    /// Initial state plus the command for the first fetch
    pub fn start(settings: DashboardSettings, filters: FilterSpec) -> (Self, Command) {
        let target = filters
            .effective_repository(&settings.fallback_repository)
            .to_string();
        let state = Self {
            settings,
            filters,
            records: Arc::from(Vec::new()),
            requested_page: 1,
            loading: true,
            error: None,
            generation: 1,
            loaded_repository: None,
            target_repository: target.clone(),
        };
        let command = Command::Fetch {
            generation: state.generation,
            repository: target,
        };
        (state, command)
    }

    pub fn effective_repository(&self) -> &str {
        self.filters
            .effective_repository(&self.settings.fallback_repository)
    }

    pub fn filtered(&self, now: DateTime<Utc>) -> Vec<&PullRequest> {
        apply_filters(&self.records, &self.filters, now, self.settings.at_risk_after)
    }

    pub fn view(&self, now: DateTime<Utc>) -> DashboardView<'_> {
        let filtered = self.filtered(now);
        let slice = paginate(&filtered, self.settings.page_size, self.requested_page);
        DashboardView {
            rows: slice.items.to_vec(),
            page: slice.page,
            total_pages: slice.total_pages,
            has_prev: slice.has_prev(),
            has_next: slice.has_next(),
            filtered_count: filtered.len(),
            total_count: self.records.len(),
        }
    }

    fn page_count(&self, now: DateTime<Utc>) -> usize {
        total_pages(self.filtered(now).len(), self.settings.page_size)
    }

    /// Persist the clamped page so Prev/Next start from what is displayed
    fn clamp_page(mut self, now: DateTime<Utc>) -> Self {
        self.requested_page = effective_page(self.requested_page, self.page_count(now));
        self
    }

    fn begin_fetch(mut self) -> (Self, Option<Command>) {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        self.target_repository = self.effective_repository().to_string();
        let command = Command::Fetch {
            generation: self.generation,
            repository: self.target_repository.clone(),
        };
        (self, Some(command))
    }
}

/// Advance the dashboard by one action, using the wall clock
pub fn reduce(state: DashboardState, action: Action) -> (DashboardState, Option<Command>) {
    reduce_at(state, action, Utc::now())
}

/// Advance the dashboard by one action, evaluating at-risk against `now`
pub fn reduce_at(
    mut state: DashboardState,
    action: Action,
    now: DateTime<Utc>,
) -> (DashboardState, Option<Command>) {
    match action {
        Action::SetRepository(repository) => {
            state.filters.repository = repository;
            if state.effective_repository() == state.target_repository {
                return (state, None);
            }
            state.requested_page = 1;
            state.begin_fetch()
        }
        Action::Refresh => state.begin_fetch(),
        Action::SetStatus(status) => {
            state.filters.status = status;
            (state.clamp_page(now), None)
        }
        Action::CycleStatus => {
            state.filters.status = state.filters.status.cycle();
            (state.clamp_page(now), None)
        }
        Action::SetOpenedAfter(input) => {
            state.filters.opened_after = input;
            (state.clamp_page(now), None)
        }
        Action::SetOpenedBefore(input) => {
            state.filters.opened_before = input;
            (state.clamp_page(now), None)
        }
        Action::ClearDates => {
            state.filters.opened_after.clear();
            state.filters.opened_before.clear();
            (state.clamp_page(now), None)
        }
        Action::ToggleAtRisk => {
            state.filters.at_risk = !state.filters.at_risk;
            (state.clamp_page(now), None)
        }
        Action::NextPage => {
            let pages = state.page_count(now);
            state.requested_page = effective_page(state.requested_page, pages)
                .saturating_add(1)
                .min(pages);
            (state, None)
        }
        Action::PrevPage => {
            let pages = state.page_count(now);
            state.requested_page = effective_page(state.requested_page, pages)
                .saturating_sub(1)
                .max(1);
            (state, None)
        }
        Action::FetchSucceeded {
            generation,
            repository,
            records,
        } => {
            if generation != state.generation {
                log::debug!(
                    "Dropping stale fetch for {} (generation {}, current {})",
                    repository,
                    generation,
                    state.generation
                );
                return (state, None);
            }
            log::debug!("Loaded {} PRs for {}", records.len(), repository);
            state.records = Arc::from(records);
            state.loaded_repository = Some(repository);
            state.loading = false;
            state.error = None;
            (state.clamp_page(now), None)
        }
        Action::FetchFailed { generation, error } => {
            if generation != state.generation {
                log::debug!(
                    "Dropping stale fetch error (generation {}, current {}): {}",
                    generation,
                    state.generation,
                    error
                );
                return (state, None);
            }
            // Previous records stay untouched; the error hides them until
            // the next successful fetch
            state.loading = false;
            state.error = Some(error.to_string());
            (state, None)
        }
    }
}
