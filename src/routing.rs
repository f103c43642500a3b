//! Application router configuration.

use axum::{
    Router,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::{AppState, Error, dashboard::get_dashboard_page, endpoints, transaction::get_sales};

/// The text returned by the health check.
pub const HEALTH_MESSAGE: &str = "Sales API is running";

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_dashboard_page))
        .route(endpoints::SALES_API, get(get_sales))
        .route(endpoints::HEALTH, get(get_health))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Report that the server is up.
async fn get_health() -> &'static str {
    HEALTH_MESSAGE
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}
