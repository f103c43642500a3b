//! Bulk loading of sales from the CSV export into the database.

mod import_transactions;
mod record;

pub use import_transactions::{
    DEFAULT_BATCH_SIZE, ImportOptions, ImportReport, import_sales, import_sales_file,
};
pub use record::{SaleRecord, parse_sale_date};
