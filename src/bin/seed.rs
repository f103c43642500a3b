use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use sales_dashboard::{DEFAULT_BATCH_SIZE, ImportOptions, import_sales_file, initialize_db};

/// Load sales from a CSV export into the SQLite database used by the server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database, created if it does not exist.
    #[arg(long)]
    db_path: String,

    /// File path to the CSV export to load.
    #[arg(long, default_value = "data.csv")]
    csv_path: String,

    /// The number of sales to insert per SQL transaction.
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Add to the sales already in the database instead of replacing them.
    #[arg(long)]
    keep_existing: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_filter(filter::LevelFilter::INFO),
        )
        .init();

    let args = Args::parse();

    let csv_path = Path::new(&args.csv_path);

    if !csv_path.is_file() {
        eprintln!("No CSV file found at {csv_path:#?}.");
        exit(1);
    }

    if args.batch_size == 0 {
        eprintln!("Batch size must be at least 1.");
        exit(1);
    }

    println!("Loading {csv_path:#?} into {:#?}", args.db_path);
    let conn = Connection::open(&args.db_path)?;
    initialize_db(&conn)?;

    let report = import_sales_file(
        csv_path,
        &conn,
        ImportOptions {
            batch_size: args.batch_size,
            clear_existing: !args.keep_existing,
        },
    )?;

    println!("Success! {report}.");

    Ok(())
}
