use std::io::Write;

use crate::core::{Filter, RecordStore, query_transactions};
use crate::datetime::{Clock, Date};
use crate::error::{Result, Error, ErrorKind};
use crate::storage::{Persistence, Transaction};
use super::{display_date, display_money, display_timestamp};


/// Columns of exported file.
const HEADERS: [&str; 8] = ["Type", "Date", "Full Date", "Amount", "Source", "Category", "Note", "Created At"];


/// Writes all transactions of a store as CSV, newest date first.
/// Every field is quoted.
///
/// * `store` - records to export
/// * `writer` - destination of CSV text
pub fn export_csv<P, C, W>(store: &RecordStore<P, C>, writer: W) -> Result<()>
where
    P: Persistence,
    C: Clock,
    W: Write
{
    let transactions = query_transactions(store.funds(), store.expenses(), &Filter::default(), store.clock().now());

    let mut csv_writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(writer);

    csv_writer.write_record(HEADERS)?;
    for transaction in &transactions {
        csv_writer.write_record(record(transaction))?;
    }

    csv_writer
        .flush()
        .map_err(|e| Error::from(e).into_kind(ErrorKind::Export))?;

    tracing::info!(user = %store.owner(), rows = transactions.len(), "transactions exported");
    Ok(())
}

/// Name of an exported file, e.g. `expense-tracker-2024-01-15.csv`.
///
/// * `today` - export date
pub fn export_file_name(today: Date) -> String {
    format!("expense-tracker-{}.csv", today.format("%Y-%m-%d"))
}


fn record(transaction: &Transaction) -> [String; 8] {
    [
        transaction.kind().label().to_owned(),
        display_date(transaction.date()),
        transaction.date().format("%Y-%m-%d").to_string(),
        display_money(transaction.amount().value()),
        transaction.source().unwrap_or_default().to_owned(),
        transaction.category().map(|c| c.to_string()).unwrap_or_default(),
        transaction.note().unwrap_or_default().to_owned(),
        display_timestamp(transaction.created_at()),
    ]
}
