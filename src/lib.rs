pub mod browser;
pub mod config;
pub mod dashboard;
pub mod fetch;
pub mod filter;
pub mod github;
pub mod logger;
pub mod output;
pub mod paginate;
pub mod tui;
