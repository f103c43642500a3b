//! Sales transactions and how they are searched.
//!
//! This module contains everything related to sales:
//! - The `Transaction` model and `TransactionBuilder` for creating sales
//! - Normalizing raw filter parameters into a query
//! - Running a query for one page of sales plus totals over all matches
//! - The JSON endpoint that exposes the search

mod core;
mod query;
mod sales_endpoint;
mod search;

pub use core::{
    SaleId, Transaction, TransactionBuilder, count_all_transactions, create_transaction,
    create_transaction_table, delete_all_transactions, insert_transactions, map_transaction_row,
};
pub use query::{
    ListFilter, NormalizedQuery, QueryDecision, SalesQuery, SortField, SortOrder, normalize_query,
};
pub use sales_endpoint::get_sales;
pub use search::{PageMeta, SalesPage, SalesSummary, run_query, search_sales};
