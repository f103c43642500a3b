//! Defines the core data model and database queries for sales transactions.

use rusqlite::{Connection, Row, types::Type};
use serde::{Deserialize, Serialize};
use time::{PrimitiveDateTime, format_description::BorrowedFormatItem, macros::format_description};

use crate::Error;

// ============================================================================
// MODELS
// ============================================================================

/// Alias for the integer type used for mapping to database IDs.
pub type SaleId = i64;

/// The format sale dates are stored in.
///
/// Fixed width so that lexical order in SQLite matches chronological order.
const STORED_DATE_FORMAT: &[BorrowedFormatItem] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
);

time::serde::format_description!(
    sale_date_format,
    PrimitiveDateTime,
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]"
);

/// One sale: who bought what, where, and for how much.
///
/// Records are bulk loaded and never changed afterwards, so there is no update path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The database ID of the row, not part of the source data.
    #[serde(skip)]
    pub id: SaleId,
    /// The transaction ID from the source data.
    pub transaction_id: String,
    /// When the sale happened, absent if the source date could not be parsed.
    #[serde(with = "sale_date_format::option")]
    pub date: Option<PrimitiveDateTime>,

    /// The customer's ID.
    pub customer_id: String,
    /// The customer's name.
    pub customer_name: String,
    /// The customer's phone number, as text.
    pub phone_number: String,
    /// The customer's gender.
    pub gender: String,
    /// The customer's age in years.
    pub age: Option<u32>,
    /// The region the customer lives in.
    pub customer_region: String,
    /// The customer type.
    pub customer_type: String,

    /// The product's ID.
    pub product_id: String,
    /// The product's name.
    pub product_name: String,
    /// The product's brand.
    pub brand: String,
    /// The product category.
    pub product_category: String,
    /// Labels attached to the sale.
    pub tags: Vec<String>,

    /// The number of units sold.
    pub quantity: Option<u32>,
    /// The price of one unit.
    pub price_per_unit: Option<f64>,
    /// The discount in percent, e.g. `10.0`.
    pub discount_percentage: Option<f64>,
    /// The amount before discount.
    pub total_amount: Option<f64>,
    /// The amount after discount.
    pub final_amount: Option<f64>,

    /// How the customer paid, e.g. `UPI`.
    pub payment_method: String,
    /// The order status.
    pub order_status: String,
    /// The delivery type.
    pub delivery_type: String,

    /// The store's ID.
    pub store_id: String,
    /// Where the store is.
    pub store_location: String,

    /// The salesperson's ID.
    pub salesperson_id: String,
    /// The salesperson's name.
    pub employee_name: String,
}

impl Transaction {
    /// Create a new sale with the given transaction ID and every other field empty.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(transaction_id: &str) -> TransactionBuilder {
        TransactionBuilder {
            transaction: Transaction {
                id: 0,
                transaction_id: transaction_id.to_owned(),
                date: None,
                customer_id: String::new(),
                customer_name: String::new(),
                phone_number: String::new(),
                gender: String::new(),
                age: None,
                customer_region: String::new(),
                customer_type: String::new(),
                product_id: String::new(),
                product_name: String::new(),
                brand: String::new(),
                product_category: String::new(),
                tags: Vec::new(),
                quantity: None,
                price_per_unit: None,
                discount_percentage: None,
                total_amount: None,
                final_amount: None,
                payment_method: String::new(),
                order_status: String::new(),
                delivery_type: String::new(),
                store_id: String::new(),
                store_location: String::new(),
                salesperson_id: String::new(),
                employee_name: String::new(),
            },
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// Only the fields the filters and aggregations look at have setters, the
/// rest can be set on the struct directly via [TransactionBuilder::finish].
///
/// # Examples
///
/// ```ignore
/// use time::macros::datetime;
///
/// let sale = Transaction::build("T-1001")
///     .customer_name("Ana Lima")
///     .date(Some(datetime!(2023-01-15 0:00)))
///     .quantity(Some(3))
///     .amounts(Some(300.0), Some(270.0))
///     .finish();
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionBuilder {
    transaction: Transaction,
}

impl TransactionBuilder {
    /// Set when the sale happened.
    pub fn date(mut self, date: Option<PrimitiveDateTime>) -> Self {
        self.transaction.date = date;
        self
    }

    /// Set the customer's name.
    pub fn customer_name(mut self, name: &str) -> Self {
        self.transaction.customer_name = name.to_owned();
        self
    }

    /// Set the customer's phone number.
    pub fn phone_number(mut self, phone_number: &str) -> Self {
        self.transaction.phone_number = phone_number.to_owned();
        self
    }

    /// Set the customer's gender.
    pub fn gender(mut self, gender: &str) -> Self {
        self.transaction.gender = gender.to_owned();
        self
    }

    /// Set the customer's age.
    pub fn age(mut self, age: Option<u32>) -> Self {
        self.transaction.age = age;
        self
    }

    /// Set the customer's region.
    pub fn region(mut self, region: &str) -> Self {
        self.transaction.customer_region = region.to_owned();
        self
    }

    /// Set the product category.
    pub fn category(mut self, category: &str) -> Self {
        self.transaction.product_category = category.to_owned();
        self
    }

    /// Set the product tags.
    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.transaction.tags = tags.iter().map(|tag| (*tag).to_owned()).collect();
        self
    }

    /// Set the payment method.
    pub fn payment_method(mut self, payment_method: &str) -> Self {
        self.transaction.payment_method = payment_method.to_owned();
        self
    }

    /// Set the number of units sold.
    pub fn quantity(mut self, quantity: Option<u32>) -> Self {
        self.transaction.quantity = quantity;
        self
    }

    /// Set the amount before and after discount.
    pub fn amounts(mut self, total_amount: Option<f64>, final_amount: Option<f64>) -> Self {
        self.transaction.total_amount = total_amount;
        self.transaction.final_amount = final_amount;
        self
    }

    /// Return the finished sale.
    pub fn finish(self) -> Transaction {
        self.transaction
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// The columns selected by [map_transaction_row], in order, excluding the
/// aggregated tag list which must be selected last.
pub(crate) const SALE_COLUMNS: &str = "sale.id, transaction_id, date, customer_id, customer_name, \
    phone_number, gender, age, customer_region, customer_type, product_id, product_name, brand, \
    product_category, quantity, price_per_unit, discount_percentage, total_amount, final_amount, \
    payment_method, order_status, delivery_type, store_id, store_location, salesperson_id, \
    employee_name";

/// The separator used when aggregating a sale's tags into one column.
pub(crate) const TAG_SEPARATOR: char = '\u{1f}';

/// Selects a sale's tags as one column, joined with [TAG_SEPARATOR].
pub(crate) const TAGS_COLUMN: &str = "(SELECT group_concat(tag, char(31) ORDER BY tag) \
    FROM sale_tag WHERE sale_tag.sale_id = sale.id)";

/// Format a sale date for storage.
///
/// # Errors
/// Returns [Error::DateFormat] if the date cannot be formatted.
pub(crate) fn format_stored_date(date: PrimitiveDateTime) -> Result<String, Error> {
    date.format(STORED_DATE_FORMAT)
        .map_err(|error| Error::DateFormat(error.to_string()))
}

/// Create a new sale in the database.
///
/// The `id` field of `transaction` is ignored, the returned sale has the ID
/// assigned by the database.
///
/// # Errors
/// This function will return a:
/// - [Error::DateFormat] if the date cannot be written in the storage format,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    transaction: Transaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let date = transaction.date.map(format_stored_date).transpose()?;

    let id = connection
        .prepare_cached(
            "INSERT INTO sale (transaction_id, date, customer_id, customer_name, phone_number, \
                gender, age, customer_region, customer_type, product_id, product_name, brand, \
                product_category, quantity, price_per_unit, discount_percentage, total_amount, \
                final_amount, payment_method, order_status, delivery_type, store_id, \
                store_location, salesperson_id, employee_name)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, \
                ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25)
             RETURNING id",
        )?
        .query_row(
            rusqlite::params![
                transaction.transaction_id,
                date,
                transaction.customer_id,
                transaction.customer_name,
                transaction.phone_number,
                transaction.gender,
                transaction.age,
                transaction.customer_region,
                transaction.customer_type,
                transaction.product_id,
                transaction.product_name,
                transaction.brand,
                transaction.product_category,
                transaction.quantity,
                transaction.price_per_unit,
                transaction.discount_percentage,
                transaction.total_amount,
                transaction.final_amount,
                transaction.payment_method,
                transaction.order_status,
                transaction.delivery_type,
                transaction.store_id,
                transaction.store_location,
                transaction.salesperson_id,
                transaction.employee_name,
            ],
            |row| row.get::<_, SaleId>(0),
        )?;

    let mut insert_tag =
        connection.prepare_cached("INSERT OR IGNORE INTO sale_tag (sale_id, tag) VALUES (?1, ?2)")?;
    for tag in &transaction.tags {
        insert_tag.execute((id, tag))?;
    }

    Ok(Transaction { id, ..transaction })
}

/// Insert `transactions` inside a single SQL transaction.
///
/// Either every sale in the batch is stored or none are. Returns the number of
/// sales inserted.
///
/// # Errors
/// This function will return a:
/// - [Error::DateFormat] if a date cannot be written in the storage format,
/// - or [Error::SqlError] if there is some other SQL error, in which case the
///   whole batch is rolled back.
pub fn insert_transactions(
    transactions: Vec<Transaction>,
    connection: &Connection,
) -> Result<usize, Error> {
    let batch = connection.unchecked_transaction()?;
    let mut inserted = 0;

    for transaction in transactions {
        create_transaction(transaction, &batch)?;
        inserted += 1;
    }

    batch.commit()?;

    Ok(inserted)
}

/// Get the total number of sales in the database, ignoring any filters.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_all_transactions(connection: &Connection) -> Result<u64, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM sale;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Delete every sale and its tags.
///
/// Returns the number of sales deleted.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn delete_all_transactions(connection: &Connection) -> Result<usize, Error> {
    connection.execute("DELETE FROM sale_tag;", ())?;
    let deleted = connection.execute("DELETE FROM sale;", ())?;

    Ok(deleted)
}

/// Create the sale and sale tag tables in the database.
///
/// # Errors
/// Returns an error if the tables cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS sale (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                transaction_id TEXT NOT NULL,
                date TEXT,
                customer_id TEXT NOT NULL,
                customer_name TEXT NOT NULL,
                phone_number TEXT NOT NULL,
                gender TEXT NOT NULL,
                age INTEGER,
                customer_region TEXT NOT NULL,
                customer_type TEXT NOT NULL,
                product_id TEXT NOT NULL,
                product_name TEXT NOT NULL,
                brand TEXT NOT NULL,
                product_category TEXT NOT NULL,
                quantity INTEGER,
                price_per_unit REAL,
                discount_percentage REAL,
                total_amount REAL,
                final_amount REAL,
                payment_method TEXT NOT NULL,
                order_status TEXT NOT NULL,
                delivery_type TEXT NOT NULL,
                store_id TEXT NOT NULL,
                store_location TEXT NOT NULL,
                salesperson_id TEXT NOT NULL,
                employee_name TEXT NOT NULL
                )",
        (),
    )?;

    connection.execute(
        "CREATE TABLE IF NOT EXISTS sale_tag (
                sale_id INTEGER NOT NULL,
                tag TEXT NOT NULL,
                PRIMARY KEY(sale_id, tag),
                FOREIGN KEY(sale_id) REFERENCES sale(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Indexes for the sortable columns used by the sales endpoint.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_sale_date ON sale(date);",
        (),
    )?;
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_sale_quantity ON sale(quantity);",
        (),
    )?;
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_sale_customer_name ON sale(customer_name);",
        (),
    )?;
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_sale_tag_tag ON sale_tag(tag);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Transaction].
///
/// Expects the columns in [SALE_COLUMNS] followed by [TAGS_COLUMN].
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let date = row
        .get::<_, Option<String>>(2)?
        .map(|text| {
            PrimitiveDateTime::parse(&text, STORED_DATE_FORMAT).map_err(|error| {
                rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(error))
            })
        })
        .transpose()?;

    let tags = row
        .get::<_, Option<String>>(26)?
        .map(|joined| {
            joined
                .split(TAG_SEPARATOR)
                .filter(|tag| !tag.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();

    Ok(Transaction {
        id: row.get(0)?,
        transaction_id: row.get(1)?,
        date,
        customer_id: row.get(3)?,
        customer_name: row.get(4)?,
        phone_number: row.get(5)?,
        gender: row.get(6)?,
        age: row.get(7)?,
        customer_region: row.get(8)?,
        customer_type: row.get(9)?,
        product_id: row.get(10)?,
        product_name: row.get(11)?,
        brand: row.get(12)?,
        product_category: row.get(13)?,
        tags,
        quantity: row.get(14)?,
        price_per_unit: row.get(15)?,
        discount_percentage: row.get(16)?,
        total_amount: row.get(17)?,
        final_amount: row.get(18)?,
        payment_method: row.get(19)?,
        order_status: row.get(20)?,
        delivery_type: row.get(21)?,
        store_id: row.get(22)?,
        store_location: row.get(23)?,
        salesperson_id: row.get(24)?,
        employee_name: row.get(25)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================
