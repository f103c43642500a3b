//! Dashboard module
//!
//! Provides the sales dashboard page: a filter bar, summary cards, a table of
//! sales and a pager, all driven by the query string.

mod handlers;
mod state;
mod view;

pub use handlers::get_dashboard_page;
pub use state::{DashboardQuery, QueryPatch};
