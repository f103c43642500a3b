//! Defines the JSON endpoint for searching sales.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;

use crate::{AppState, Error};

use super::{
    query::SalesQuery,
    search::{SalesPage, search_sales},
};

/// The state needed to search sales.
#[derive(Debug, Clone)]
pub struct SalesState {
    /// The database connection for reading sales.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SalesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that returns one page of sales matching the query
/// parameters, together with the totals over every matching sale.
///
/// Malformed parameters never reject the request, see
/// [normalize_query](super::query::normalize_query). Any failure while reading
/// the database responds with a generic 500.
pub async fn get_sales(
    State(state): State<SalesState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<SalesPage>, Error> {
    let query = SalesQuery::from_pairs(pairs);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let page = search_sales(&query, &connection)?;

    Ok(Json(page))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, http::StatusCode, routing::get};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};
    use time::macros::datetime;

    use crate::{
        db::initialize,
        endpoints,
        transaction::{Transaction, create_transaction},
    };

    use super::{SalesState, get_sales};

    fn get_test_state() -> SalesState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        SalesState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    fn get_test_server(state: SalesState) -> TestServer {
        let app = Router::new()
            .route(endpoints::SALES_API, get(get_sales))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    fn insert_sales(state: &SalesState) {
        let conn = state.db_connection.lock().unwrap();
        create_transaction(
            Transaction::build("T-1")
                .customer_name("Ana Lima")
                .region("North")
                .date(Some(datetime!(2023-01-15 0:00)))
                .quantity(Some(3))
                .amounts(Some(300.0), Some(270.0))
                .tags(&["New"])
                .finish(),
            &conn,
        )
        .unwrap();
        create_transaction(
            Transaction::build("T-2")
                .customer_name("Bo Chen")
                .region("South")
                .date(Some(datetime!(2023-02-01 0:00)))
                .quantity(Some(1))
                .amounts(Some(50.0), Some(50.0))
                .finish(),
            &conn,
        )
        .unwrap();
    }

    #[tokio::test]
    async fn returns_envelope_for_empty_store() {
        let server = get_test_server(get_test_state());

        let response = server.get(endpoints::SALES_API).await;

        response.assert_status_ok();
        response.assert_json(&json!({
            "data": [],
            "meta": { "page": 1, "pageSize": 10, "totalItems": 0, "totalPages": 1 },
            "summary": { "totalUnits": 0, "totalAmount": 0.0, "totalDiscount": 0.0 }
        }));
    }

    #[tokio::test]
    async fn returns_matching_sales_with_summary() {
        let state = get_test_state();
        insert_sales(&state);
        let server = get_test_server(state);

        let response = server
            .get(endpoints::SALES_API)
            .add_query_param("regions", "North")
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["data"][0]["transactionId"], "T-1");
        assert_eq!(body["data"][0]["customerName"], "Ana Lima");
        assert_eq!(body["data"][0]["date"], "2023-01-15T00:00:00.000");
        assert_eq!(body["data"][0]["tags"], json!(["New"]));
        assert_eq!(body["meta"]["totalItems"], 1);
        assert_eq!(body["summary"]["totalUnits"], 3);
        assert_eq!(body["summary"]["totalAmount"], 270.0);
        assert_eq!(body["summary"]["totalDiscount"], 30.0);
    }

    #[tokio::test]
    async fn repeated_list_keys_are_combined() {
        let state = get_test_state();
        insert_sales(&state);
        let server = get_test_server(state);

        let response = server
            .get(&format!(
                "{}?regions=North&regions=South&sortBy=customerName&sortOrder=asc",
                endpoints::SALES_API
            ))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"][0]["transactionId"], "T-1");
        assert_eq!(body["data"][1]["transactionId"], "T-2");
        assert_eq!(body["meta"]["totalItems"], 2);
    }

    #[tokio::test]
    async fn malformed_parameters_do_not_reject_request() {
        let state = get_test_state();
        insert_sales(&state);
        let server = get_test_server(state);

        let response = server
            .get(&format!(
                "{}?page=abc&ageMin=old&sortBy=price&sortOrder=sideways",
                endpoints::SALES_API
            ))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["meta"]["page"], 1);
        // Falls back to the newest sale first.
        assert_eq!(body["data"][0]["transactionId"], "T-2");
    }

    #[tokio::test]
    async fn inverted_age_range_returns_empty_envelope() {
        let state = get_test_state();
        insert_sales(&state);
        let server = get_test_server(state);

        let response = server
            .get(&format!("{}?ageMin=30&ageMax=20&page=3", endpoints::SALES_API))
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({
            "data": [],
            "meta": { "page": 3, "pageSize": 10, "totalItems": 0, "totalPages": 1 },
            "summary": { "totalUnits": 0, "totalAmount": 0.0, "totalDiscount": 0.0 }
        }));
    }

    #[tokio::test]
    async fn huge_page_returns_empty_envelope() {
        let state = get_test_state();
        insert_sales(&state);
        let server = get_test_server(state);

        let response = server
            .get(&format!("{}?page=18446744073709551615", endpoints::SALES_API))
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({
            "data": [],
            "meta": {
                "page": 18446744073709551615u64,
                "pageSize": 10,
                "totalItems": 2,
                "totalPages": 1
            },
            "summary": { "totalUnits": 4, "totalAmount": 320.0, "totalDiscount": 30.0 }
        }));
    }

    #[tokio::test]
    async fn database_failure_returns_generic_500() {
        let state = get_test_state();
        state
            .db_connection
            .lock()
            .unwrap()
            .execute_batch("DROP TABLE sale_tag; DROP TABLE sale;")
            .unwrap();
        let server = get_test_server(state);

        let response = server.get(endpoints::SALES_API).expect_failure().await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        response.assert_json(&json!({ "message": "Internal Server Error" }));
    }

    #[tokio::test]
    async fn poisoned_lock_returns_generic_500() {
        let state = get_test_state();
        let connection = state.db_connection.clone();
        let _ = std::thread::spawn(move || {
            let _guard = connection.lock().unwrap();
            panic!("poison the lock");
        })
        .join();
        let server = get_test_server(state);

        let response = server.get(endpoints::SALES_API).expect_failure().await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        response.assert_json(&json!({ "message": "Internal Server Error" }));
    }
}
