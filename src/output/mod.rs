pub mod formatter;

pub use formatter::{
    format_age, format_closed, format_date, format_pr_table, format_size, format_summary,
    format_tsv, should_use_colors, truncate_title,
};
