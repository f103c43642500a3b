//! Sets up the application's database.

use rusqlite::{
    Connection, Transaction as SqlTransaction, TransactionBehavior, functions::FunctionFlags,
};

use crate::{Error, transaction::create_transaction_table};

/// The name of the SQL function that lower-cases text using Unicode case
/// rules, SQLite's own `lower` only handles ASCII.
pub(crate) const UNICODE_LOWER: &str = "unicode_lower";

/// Create the tables for the domain models if they do not already exist.
///
/// Foreign keys are enabled on `connection` so that deleting a sale also
/// deletes its tags, and the SQL functions the sales queries rely on are
/// registered.
///
/// # Errors
/// Returns an [Error::SqlError] if the pragma cannot be set, a function
/// cannot be registered or the tables cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;
    register_functions(connection)?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Functions are registered per connection, so this must run for every
/// connection that searches sales.
fn register_functions(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.create_scalar_function(
        UNICODE_LOWER,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |context| {
            let text: Option<String> = context.get(0)?;
            Ok(text.map(|text| text.to_lowercase()))
        },
    )
}
