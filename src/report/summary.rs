use std::fmt;

use rust_decimal::Decimal;

use crate::core::{MonthTotal, QueryEngine, RecordStore};
use crate::datetime::{Clock, Timestamp};
use crate::error::Result;
use crate::storage::{Category, Persistence, Transaction, TransactionKind};
use super::{display_date, display_money, display_timestamp};


/// Snapshot of user's finances, suitable for printing.
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    /// Time the snapshot was taken
    pub generated_at: Timestamp,

    pub balance: Decimal,

    pub total_funds: Decimal,

    pub total_expenses: Decimal,

    /// Spending in current month
    pub monthly_expenses: Decimal,

    /// Monthly spending budget
    pub budget: Decimal,

    /// Non-zero spending per category in display order
    pub categories: Vec<(Category, Decimal)>,

    /// Spending per month, oldest first
    pub trend: Vec<MonthTotal>,

    /// All transactions, newest date first
    pub transactions: Vec<Transaction>,
}


impl Summary {
    /// Takes a snapshot of a store.
    ///
    /// * `store` - records to summarize
    /// * `engine` - query engine of the store's owner
    pub fn collect<P, C>(store: &RecordStore<P, C>, engine: &mut QueryEngine) -> Result<Self>
    where
        P: Persistence,
        C: Clock
    {
        let transactions = engine
            .all(store)?
            .to_vec();

        let breakdown = store.category_breakdown();
        let categories = Category::ALL
            .iter()
            .filter_map(|c| breakdown.get(c).map(|total| (*c, *total)))
            .collect();

        Ok(Summary {
            generated_at: store.clock().timestamp(),
            balance: store.balance(),
            total_funds: store.total_funds(),
            total_expenses: store.total_expenses(),
            monthly_expenses: store.monthly_expenses(),
            budget: store.budget().value(),
            categories: categories,
            trend: store.monthly_trend(),
            transactions: transactions,
        })
    }
}


impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Expense Tracker Report")?;
        writeln!(f, "Generated on {}", display_timestamp(self.generated_at))?;
        writeln!(f)?;

        writeln!(f, "{:<24}{:>12}", "Total Balance", display_money(self.balance))?;
        writeln!(f, "{:<24}{:>12}", "Total Funds", display_money(self.total_funds))?;
        writeln!(f, "{:<24}{:>12}", "Total Expenses", display_money(self.total_expenses))?;
        writeln!(f, "{:<24}{:>12}", "This Month's Expenses", display_money(self.monthly_expenses))?;
        writeln!(f, "{:<24}{:>12}", "Monthly Budget", display_money(self.budget))?;

        if !self.categories.is_empty() {
            writeln!(f)?;
            writeln!(f, "Spending by Category")?;
            for (category, total) in &self.categories {
                writeln!(f, "  {:<22}{:>12}", category.label(), display_money(*total))?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Monthly Trend")?;
        for month in &self.trend {
            writeln!(f, "  {:<22}{:>12}", month.label(), display_money(month.total))?;
        }

        writeln!(f)?;
        writeln!(f, "Transaction History")?;
        for transaction in &self.transactions {
            let (description, category, sign) = match transaction.kind() {
                TransactionKind::Fund => (transaction.source().unwrap_or_default(), "-", '+'),
                TransactionKind::Expense => (
                    transaction.note().unwrap_or("-"),
                    transaction.category().map_or("-", |c| c.label()),
                    '-'
                ),
            };

            writeln!(f, "  {:<8}{:<20}{:<24}{:<10}{:>12}",
                transaction.kind().label(),
                display_date(transaction.date()),
                description,
                category,
                format!("{}{}", sign, display_money(transaction.amount().value())))?;
        }

        writeln!(f)?;
        write!(f, "Total Transactions: {}", self.transactions.len())
    }
}
