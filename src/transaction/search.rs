//! Runs a normalized sales query against the database and assembles the
//! paged response with its summary totals.

use rusqlite::{Connection, params_from_iter, types::Value};
use serde::Serialize;

use crate::{
    Error,
    db::UNICODE_LOWER,
    pagination::{PAGE_SIZE, page_offset, total_pages},
};

use super::{
    core::{SALE_COLUMNS, TAGS_COLUMN, Transaction, format_stored_date, map_transaction_row},
    query::{
        ListFilter, NormalizedQuery, QueryDecision, SalesFilter, SalesQuery, SortField, SortOrder,
        normalize_query,
    },
};

/// The response for a sales query: one page of sales, where that page sits
/// in the full result set, and totals over the full result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesPage {
    /// At most one page of sales, in sort order.
    pub data: Vec<Transaction>,
    /// Paging information.
    pub meta: PageMeta,
    /// Totals over every matching sale, not just this page.
    pub summary: SalesSummary,
}

impl SalesPage {
    /// The response for a query that matched nothing.
    pub fn empty(page: u64) -> Self {
        Self {
            data: Vec::new(),
            meta: PageMeta {
                page,
                page_size: PAGE_SIZE,
                total_items: 0,
                total_pages: total_pages(0, PAGE_SIZE),
            },
            summary: SalesSummary::default(),
        }
    }
}

/// Where a page sits in the full result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// The 1-based page number.
    pub page: u64,
    /// The maximum number of sales on a page.
    pub page_size: u64,
    /// The number of sales matching the filter across all pages.
    pub total_items: u64,
    /// Never less than 1, even when nothing matched.
    pub total_pages: u64,
}

/// Totals over every sale matching a filter.
///
/// Missing quantities and amounts count as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    /// The sum of quantities.
    pub total_units: u64,
    /// The sum of the amounts after discount.
    pub total_amount: f64,
    /// The sum of the amounts before discount minus the amounts after discount.
    pub total_discount: f64,
}

/// A SQL `WHERE` clause and the values bound to its placeholders, in order.
#[derive(Debug, Clone, PartialEq)]
struct WhereClause {
    sql: String,
    params: Vec<Value>,
}

/// Answer a sales request.
///
/// Contradictory filters produce an empty page without querying the
/// database. Otherwise the page, the count and the summary are read inside
/// one read transaction so they agree with each other.
///
/// # Errors
/// Returns [Error::SqlError] if any of the reads fail.
pub fn search_sales(query: &SalesQuery, connection: &Connection) -> Result<SalesPage, Error> {
    match normalize_query(query) {
        QueryDecision::Unsatisfiable { page } => Ok(SalesPage::empty(page)),
        QueryDecision::Normalized(query) => run_query(&query, connection),
    }
}

/// Read the page, count and summary for a normalized query.
///
/// # Errors
/// Returns [Error::SqlError] if any of the reads fail.
pub fn run_query(query: &NormalizedQuery, connection: &Connection) -> Result<SalesPage, Error> {
    let where_clause = build_where_clause(&query.filter)?;

    let read = connection.unchecked_transaction()?;

    let data = get_sales_page(
        &where_clause,
        query.sort_field,
        query.sort_order,
        query.page,
        &read,
    )
    .inspect_err(|error| tracing::error!("could not get page of sales: {error}"))?;
    let total_items = count_sales(&where_clause, &read)
        .inspect_err(|error| tracing::error!("could not count sales: {error}"))?;
    let summary = summarize_sales(&where_clause, &read)
        .inspect_err(|error| tracing::error!("could not summarize sales: {error}"))?;

    read.commit()?;

    Ok(SalesPage {
        data,
        meta: PageMeta {
            page: query.page,
            page_size: PAGE_SIZE,
            total_items,
            total_pages: total_pages(total_items, PAGE_SIZE),
        },
        summary,
    })
}

fn build_where_clause(filter: &SalesFilter) -> Result<WhereClause, Error> {
    let mut conditions = Vec::new();
    let mut params = Vec::new();

    if let Some(search) = &filter.search {
        conditions.push(format!(
            "({UNICODE_LOWER}(customer_name) LIKE ? ESCAPE '\\' \
            OR {UNICODE_LOWER}(phone_number) LIKE ? ESCAPE '\\')"
        ));
        // Both sides are lower-cased since `LIKE` only folds ASCII letters.
        let pattern = search.like_pattern().to_lowercase();
        params.push(Value::Text(pattern.clone()));
        params.push(Value::Text(pattern));
    }

    let list_columns = [
        ("customer_region", &filter.regions),
        ("gender", &filter.genders),
        ("product_category", &filter.categories),
        ("payment_method", &filter.payment_methods),
    ];
    for (column, list) in list_columns {
        if !list.is_empty() {
            conditions.push(format!("{column} IN ({})", placeholders(list)));
            params.extend(list.values().iter().cloned().map(Value::Text));
        }
    }

    if !filter.tags.is_empty() {
        conditions.push(format!(
            "EXISTS (SELECT 1 FROM sale_tag WHERE sale_tag.sale_id = sale.id AND sale_tag.tag IN ({}))",
            placeholders(&filter.tags)
        ));
        params.extend(filter.tags.values().iter().cloned().map(Value::Text));
    }

    if let Some(min) = filter.age.min {
        conditions.push("age >= ?".to_owned());
        params.push(Value::Integer(min.into()));
    }

    if let Some(max) = filter.age.max {
        conditions.push("age <= ?".to_owned());
        params.push(Value::Integer(max.into()));
    }

    if let Some(start) = filter.dates.start {
        conditions.push("date >= ?".to_owned());
        params.push(Value::Text(format_stored_date(start)?));
    }

    if let Some(end) = filter.dates.end {
        conditions.push("date <= ?".to_owned());
        params.push(Value::Text(format_stored_date(end)?));
    }

    let sql = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    Ok(WhereClause { sql, params })
}

fn placeholders(list: &ListFilter) -> String {
    vec!["?"; list.values().len()].join(", ")
}

fn get_sales_page(
    where_clause: &WhereClause,
    sort_field: SortField,
    sort_order: SortOrder,
    page: u64,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let sort_column = match sort_field {
        SortField::Date => "date",
        SortField::Quantity => "quantity",
        SortField::CustomerName => "customer_name",
    };
    let direction = match sort_order {
        SortOrder::Ascending => "ASC",
        SortOrder::Descending => "DESC",
    };

    // Sort by the requested column, and then ID to keep the page order stable.
    let query = format!(
        "SELECT {SALE_COLUMNS}, {TAGS_COLUMN} FROM sale {} \
        ORDER BY {sort_column} {direction}, sale.id ASC \
        LIMIT ? OFFSET ?",
        where_clause.sql,
    );

    // SQLite only accepts 64-bit signed offsets, anything larger is past the
    // last row anyway.
    let offset = i64::try_from(page_offset(page, PAGE_SIZE)).unwrap_or(i64::MAX);
    let mut params = where_clause.params.clone();
    params.push(Value::Integer(PAGE_SIZE as i64));
    params.push(Value::Integer(offset));

    connection
        .prepare(&query)?
        .query_map(params_from_iter(params.iter()), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}

fn count_sales(where_clause: &WhereClause, connection: &Connection) -> Result<u64, Error> {
    connection
        .query_row(
            &format!("SELECT COUNT(sale.id) FROM sale {}", where_clause.sql),
            params_from_iter(where_clause.params.iter()),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

fn summarize_sales(
    where_clause: &WhereClause,
    connection: &Connection,
) -> Result<SalesSummary, Error> {
    connection
        .query_row(
            &format!(
                "SELECT \
                    COALESCE(SUM(COALESCE(quantity, 0)), 0), \
                    COALESCE(SUM(COALESCE(final_amount, 0.0)), 0.0), \
                    COALESCE(SUM(COALESCE(total_amount, 0.0) - COALESCE(final_amount, 0.0)), 0.0) \
                FROM sale {}",
                where_clause.sql
            ),
            params_from_iter(where_clause.params.iter()),
            |row| {
                Ok(SalesSummary {
                    total_units: row.get(0)?,
                    total_amount: row.get(1)?,
                    total_discount: row.get(2)?,
                })
            },
        )
        .map_err(|error| error.into())
}
