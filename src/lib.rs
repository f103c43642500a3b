//! A sales management dashboard over a table of retail sales.
//!
//! This library provides a JSON search API and an HTML dashboard, both backed
//! by the same filter normalization and SQLite queries, plus a bulk loader for
//! the CSV export the sales come from.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod app_state;
mod csv_import;
mod dashboard;
mod db;
mod endpoints;
mod error;
mod html;
mod logging;
mod pagination;
mod routing;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use csv_import::{
    DEFAULT_BATCH_SIZE, ImportOptions, ImportReport, SaleRecord, import_sales, import_sales_file,
    parse_sale_date,
};
pub use dashboard::{DashboardQuery, QueryPatch};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use transaction::{
    ListFilter, NormalizedQuery, PageMeta, QueryDecision, SaleId, SalesPage, SalesQuery,
    SalesSummary, SortField, SortOrder, Transaction, TransactionBuilder, count_all_transactions,
    create_transaction, delete_all_transactions, insert_transactions, normalize_query, run_query,
    search_sales,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`. If a signal handler cannot be
/// installed, the error is logged and only the other signal is waited on.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
