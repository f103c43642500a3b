//! Dashboard HTTP handlers.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRequest;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    dashboard::{
        state::DashboardQuery,
        view::{dashboard_error_view, dashboard_fragment, dashboard_page},
    },
    html::base,
    transaction::{SalesPage, SalesQuery, search_sales},
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading sales.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Display the sales dashboard for the filters in the query string.
///
/// HTMX requests get just the dashboard fragment so it can be swapped into
/// the current page, other requests get the full page.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    HxRequest(is_htmx_request): HxRequest,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let query = DashboardQuery::from_sales_query(&SalesQuery::from_pairs(pairs));

    match load_sales(&query, &state) {
        Ok(page) if is_htmx_request => dashboard_fragment(&query, &page).into_response(),
        Ok(page) => dashboard_page(&query, &page).into_response(),
        Err(error) => {
            tracing::error!("could not load dashboard for {query:?}: {error}");
            let view = dashboard_error_view();
            let markup = if is_htmx_request {
                view
            } else {
                base("Dashboard", &view)
            };

            (StatusCode::INTERNAL_SERVER_ERROR, markup).into_response()
        }
    }
}

fn load_sales(query: &DashboardQuery, state: &DashboardState) -> Result<SalesPage, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    search_sales(&query.to_sales_query(), &connection)
}
