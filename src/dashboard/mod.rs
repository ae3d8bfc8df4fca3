pub mod state;

pub use state::{
    reduce, reduce_at, Action, Command, DashboardSettings, DashboardState, DashboardView,
};
