mod config;
mod store;
mod query;
mod command;
mod tracker;

#[cfg(test)]
pub(crate) mod test_utils;

pub use self::config::{Config, InstanceId};
pub use self::store::{RecordStore, MonthTotal};
pub use self::query::{QueryEngine, Filter, Tab, Period, query_transactions};
pub use self::command::{Command, Event};
pub use self::tracker::{Tracker, BudgetAlert};
