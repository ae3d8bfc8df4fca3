pub mod pipeline;
pub mod types;

pub use pipeline::{
    apply_filters, default_at_risk_after, is_at_risk, max_at_risk_after, CompiledFilter,
};
pub use types::{parse_filter_date, FilterSpec, StatusFilter, DEFAULT_REPOSITORY};
