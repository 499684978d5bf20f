mod export;
mod summary;

pub use self::export::{export_csv, export_file_name};
pub use self::summary::Summary;


use rust_decimal::Decimal;

use crate::datetime::{Date, Timestamp};


/// Human-readable date, e.g. `Mon, Jan 15, 2024`.
pub(crate) fn display_date(date: Date) -> String {
    date.format("%a, %b %-d, %Y")
        .to_string()
}

/// Human-readable local time, e.g. `Jan 15, 2024, 09:30 AM`.
pub(crate) fn display_timestamp(timestamp: Timestamp) -> String {
    timestamp
        .with_timezone(&chrono::Local)
        .format("%b %-d, %Y, %I:%M %p")
        .to_string()
}

/// Money value with exactly two decimals.
pub(crate) fn display_money(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}
