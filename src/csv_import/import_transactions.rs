//! Bulk loading sales from a CSV export.

use std::{fmt, fs::File, io::Read, path::Path, time::Instant};

use rusqlite::Connection;

use crate::{
    Error,
    csv_import::record::SaleRecord,
    transaction::{Transaction, delete_all_transactions, insert_transactions},
};

/// The number of sales written per SQL transaction when no other size is given.
pub const DEFAULT_BATCH_SIZE: usize = 5000;

/// Only the first few unreadable dates are logged to keep the log readable
/// for large files.
const MAX_LOGGED_INVALID_DATES: usize = 3;

/// How a load should be run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    /// The number of sales to insert per SQL transaction.
    pub batch_size: usize,
    /// Whether to delete every existing sale before loading.
    pub clear_existing: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            clear_existing: true,
        }
    }
}

/// What happened during a load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// The number of data rows in the file, including skipped rows.
    pub rows_read: usize,
    /// The number of sales written to the database.
    pub rows_inserted: usize,
    /// The number of inserted sales whose date could not be read.
    pub invalid_dates: usize,
    /// The number of rows that could not be decoded and were not inserted.
    pub rows_skipped: usize,
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "read {} rows, inserted {} sales, {} with an unreadable date, skipped {} rows",
            self.rows_read, self.rows_inserted, self.invalid_dates, self.rows_skipped
        )
    }
}

/// Load the sales in the CSV file at `path` into the database.
///
/// # Errors
/// Returns an [Error::Io] if the file cannot be opened, otherwise see
/// [import_sales].
pub fn import_sales_file(
    path: &Path,
    connection: &Connection,
    options: ImportOptions,
) -> Result<ImportReport, Error> {
    let file = File::open(path)
        .inspect_err(|error| tracing::error!("Could not open {}: {error}", path.display()))
        .map_err(|error| Error::Io(format!("could not open {}: {error}", path.display())))?;

    tracing::info!("Loading sales from {}", path.display());

    import_sales(file, connection, options)
}

/// Load the sales in the CSV data read from `reader` into the database.
///
/// The first row must be the header row. Sales are inserted in batches of
/// `options.batch_size`, each batch in its own SQL transaction, so a failed
/// load keeps the batches that were committed before the failure. Rows that
/// cannot be decoded are logged and skipped.
///
/// # Errors
/// This function will return a:
/// - [Error::Io] if reading from `reader` fails,
/// - or [Error::SqlError] if existing sales could not be cleared or a batch
///   could not be inserted.
pub fn import_sales<R: Read>(
    reader: R,
    connection: &Connection,
    options: ImportOptions,
) -> Result<ImportReport, Error> {
    let start_time = Instant::now();
    let batch_size = options.batch_size.max(1);

    if options.clear_existing {
        clear_sales(connection)?;
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut report = ImportReport::default();
    let mut batch = Vec::with_capacity(batch_size);

    for result in reader.deserialize::<SaleRecord>() {
        report.rows_read += 1;

        let record = match result {
            Ok(record) => record,
            Err(error) if error.is_io_error() => {
                tracing::error!("Could not read row {}: {error}", report.rows_read);
                return Err(error.into());
            }
            Err(error) => {
                tracing::warn!("Skipping row {}: {error}", report.rows_read);
                report.rows_skipped += 1;
                continue;
            }
        };

        let raw_date = record.date.clone();
        let transaction = record.into_transaction();

        if transaction.date.is_none() {
            report.invalid_dates += 1;

            if report.invalid_dates <= MAX_LOGGED_INVALID_DATES {
                tracing::warn!(
                    "Could not read date {raw_date:?} of sale {:?}, storing it without a date",
                    transaction.transaction_id
                );
            }
        }

        batch.push(transaction);

        if batch.len() >= batch_size {
            insert_batch(std::mem::take(&mut batch), connection, &mut report)?;
        }
    }

    if !batch.is_empty() {
        insert_batch(batch, connection, &mut report)?;
    }

    if report.invalid_dates > MAX_LOGGED_INVALID_DATES {
        tracing::warn!(
            "{} sales in total had an unreadable date",
            report.invalid_dates
        );
    }

    tracing::info!(
        "Finished loading sales in {:.1}s: {report}",
        start_time.elapsed().as_secs_f64()
    );

    Ok(report)
}

fn clear_sales(connection: &Connection) -> Result<(), Error> {
    let tx = connection.unchecked_transaction()?;
    let removed = delete_all_transactions(&tx)
        .inspect_err(|error| tracing::error!("Could not clear existing sales: {error}"))?;
    tx.commit()?;

    tracing::info!("Removed {removed} existing sales");

    Ok(())
}

fn insert_batch(
    batch: Vec<Transaction>,
    connection: &Connection,
    report: &mut ImportReport,
) -> Result<(), Error> {
    let batch_len = batch.len();

    let inserted = insert_transactions(batch, connection).inspect_err(|error| {
        tracing::error!(
            "Could not insert a batch of {batch_len} sales, {} sales were loaded before the failure: {error}",
            report.rows_inserted
        )
    })?;

    report.rows_inserted += inserted;
    tracing::info!("Inserted {} sales so far", report.rows_inserted);

    Ok(())
}
