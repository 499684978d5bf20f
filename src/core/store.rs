use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use rust_decimal::Decimal;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::auth::{Session, UserId};
use crate::datetime::{Clock, YearMonth, trailing_months};
use crate::error::{Result, Error, ErrorKind};
use crate::storage::{Persistence, user_key};
use crate::storage::{Amount, Category, Expense, Fund, Id, NewExpense, NewFund, Patch, Transaction, TransactionKind};
use super::config::Config;


/// Name of funds collection.
const FUNDS: &str = "funds";

/// Name of expenses collection.
const EXPENSES: &str = "expenses";

/// Name of monthly budget record.
const BUDGET: &str = "budget";


/// Source of unique store generations within the process.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);


/// Total spending in one calendar month.
#[derive(Clone, Debug, PartialEq)]
pub struct MonthTotal {
    /// Month of spending
    pub month: YearMonth,

    /// Sum of expense amounts dated within the month
    pub total: Decimal,
}


impl MonthTotal {
    /// Chart label, e.g. `Jan 2024`.
    pub fn label(&self) -> String {
        self.month.label()
    }
}


/// Owner of one user's funds and expenses.
///
/// Every mutation is persisted as a whole collection before it
/// becomes visible. If saving fails, the mutation is rolled back
/// and the error is returned to the caller.
pub struct RecordStore<P, C>
where
    P: Persistence,
    C: Clock
{
    /// Storage used to store the data.
    storage: P,

    /// Source of current time.
    clock: C,

    /// User, that owns the records.
    owner: UserId,

    /// Storage key prefix of the owner.
    prefix: String,

    /// Income records in insertion order.
    funds: Vec<Fund>,

    /// Spending records in insertion order.
    expenses: Vec<Expense>,

    /// Monthly spending budget.
    budget: Amount,

    /// Number of months in spending trend.
    trend_months: usize,

    /// Unique per opened store instance.
    generation: u64,

    /// Incremented by every successful mutation.
    revision: u64,
}


impl<P, C> RecordStore<P, C>
where
    P: Persistence,
    C: Clock
{
    /// Loads records of a session's user.
    ///
    /// * `session` - logged-in user context
    /// * `storage` - storage used to store data
    /// * `clock` - source of current time
    /// * `config` - app's configuration
    pub fn open(session: &Session, storage: P, clock: C, config: &Config) -> Result<Self> {
        let prefix = session.key_prefix();

        let funds: Vec<Fund> = Self::load_or(&storage, &user_key(&prefix, FUNDS), Vec::new())?;
        let expenses: Vec<Expense> = Self::load_or(&storage, &user_key(&prefix, EXPENSES), Vec::new())?;
        let budget = Self::load_or(&storage, &user_key(&prefix, BUDGET), config.default_budget())?;

        tracing::debug!(user = %prefix, funds = funds.len(), expenses = expenses.len(), "records loaded");

        Ok(RecordStore {
            storage: storage,
            clock: clock,
            owner: session.user().id,
            prefix: prefix,
            funds: funds,
            expenses: expenses,
            budget: budget,
            trend_months: config.trend_months(),
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
            revision: 0,
        })
    }

    /// User, that owns the records.
    pub fn owner(&self) -> UserId {
        self.owner
    }

    /// Source of current time.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Counter of successful mutations since the store was opened.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Identifies the state of records: no two opened stores share
    /// a generation, and the revision changes with every mutation.
    pub fn version(&self) -> (u64, u64) {
        (self.generation, self.revision)
    }

    /// Add a new fund. Returns its identifier.
    ///
    /// * `fund` - fund data
    pub fn add_fund(&mut self, fund: NewFund) -> Result<Id> {
        let id = Self::next_id(self.clock.timestamp().timestamp_millis(),
            self.funds.iter().map(|f| f.id));

        self.funds.push(Fund {
            id: id,
            amount: fund.amount,
            source: fund.source,
            date: fund.date,
            created_at: self.clock.timestamp(),
        });

        if let Err(e) = self.persist(FUNDS, &self.funds) {
            self.funds.pop();
            return Err(e);
        }

        self.committed(id, TransactionKind::Fund, "added");
        Ok(id)
    }

    /// Add a new expense. Returns its identifier.
    ///
    /// * `expense` - expense data
    pub fn add_expense(&mut self, expense: NewExpense) -> Result<Id> {
        let id = Self::next_id(self.clock.timestamp().timestamp_millis(),
            self.expenses.iter().map(|e| e.id));

        self.expenses.push(Expense {
            id: id,
            amount: expense.amount,
            category: expense.category,
            note: expense.note,
            date: expense.date,
            created_at: self.clock.timestamp(),
        });

        if let Err(e) = self.persist(EXPENSES, &self.expenses) {
            self.expenses.pop();
            return Err(e);
        }

        self.committed(id, TransactionKind::Expense, "added");
        Ok(id)
    }

    /// Update fields of an existing transaction. The patch variant
    /// selects the collection.
    ///
    /// Fails with [`ErrorKind::NotFound`] if there is no such record.
    ///
    /// * `id` - identifier of a transaction to update
    /// * `patch` - fields to overwrite
    pub fn update_transaction(&mut self, id: Id, patch: Patch) -> Result<()> {
        let kind = patch.kind();

        match patch {
            Patch::Fund(patch) => {
                let index = Self::position(&self.funds, |f| f.id == id)
                    .ok_or_else(|| Self::not_found(id, kind))?;

                let previous = self.funds[index].clone();
                patch.apply(&mut self.funds[index]);

                if let Err(e) = self.persist(FUNDS, &self.funds) {
                    self.funds[index] = previous;
                    return Err(e);
                }
            }

            Patch::Expense(patch) => {
                let index = Self::position(&self.expenses, |e| e.id == id)
                    .ok_or_else(|| Self::not_found(id, kind))?;

                let previous = self.expenses[index].clone();
                patch.apply(&mut self.expenses[index]);

                if let Err(e) = self.persist(EXPENSES, &self.expenses) {
                    self.expenses[index] = previous;
                    return Err(e);
                }
            }
        }

        self.committed(id, kind, "updated");
        Ok(())
    }

    /// Remove a transaction permanently.
    ///
    /// Fails with [`ErrorKind::NotFound`] if there is no such record.
    ///
    /// * `id` - identifier of a transaction to remove
    /// * `kind` - collection to remove from
    pub fn delete_transaction(&mut self, id: Id, kind: TransactionKind) -> Result<()> {
        match kind {
            TransactionKind::Fund => {
                let index = Self::position(&self.funds, |f| f.id == id)
                    .ok_or_else(|| Self::not_found(id, kind))?;

                let removed = self.funds.remove(index);
                if let Err(e) = self.persist(FUNDS, &self.funds) {
                    self.funds.insert(index, removed);
                    return Err(e);
                }
            }

            TransactionKind::Expense => {
                let index = Self::position(&self.expenses, |e| e.id == id)
                    .ok_or_else(|| Self::not_found(id, kind))?;

                let removed = self.expenses.remove(index);
                if let Err(e) = self.persist(EXPENSES, &self.expenses) {
                    self.expenses.insert(index, removed);
                    return Err(e);
                }
            }
        }

        self.committed(id, kind, "deleted");
        Ok(())
    }

    /// Return all funds in insertion order.
    pub fn funds(&self) -> &[Fund] {
        &self.funds
    }

    /// Return all expenses in insertion order.
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    /// Return a transaction with a given identifier and type.
    ///
    /// * `id` - identifier to return record for
    /// * `kind` - collection to look in
    pub fn transaction(&self, id: Id, kind: TransactionKind) -> Option<Transaction> {
        match kind {
            TransactionKind::Fund => self.funds
                .iter()
                .find(|f| f.id == id)
                .cloned()
                .map(Transaction::Fund),

            TransactionKind::Expense => self.expenses
                .iter()
                .find(|e| e.id == id)
                .cloned()
                .map(Transaction::Expense),
        }
    }

    /// Sum of all funds.
    pub fn total_funds(&self) -> Decimal {
        self.funds
            .iter()
            .map(|f| f.amount.value())
            .sum()
    }

    /// Sum of all expenses.
    pub fn total_expenses(&self) -> Decimal {
        Self::sum_expenses(self.expenses.iter())
    }

    /// Total funds minus total expenses. Can be negative.
    pub fn balance(&self) -> Decimal {
        self.total_funds() - self.total_expenses()
    }

    /// Sum of expenses dated today (local time).
    pub fn today_expenses(&self) -> Decimal {
        let today = self.clock.today();

        Self::sum_expenses(self.expenses
            .iter()
            .filter(|e| e.date == today))
    }

    /// Sum of expenses dated within the current month (local time).
    pub fn monthly_expenses(&self) -> Decimal {
        let month = YearMonth::of(self.clock.today());

        Self::sum_expenses(self.expenses
            .iter()
            .filter(|e| month.contains(e.date)))
    }

    /// Spending per category. Categories without expenses are absent.
    pub fn category_breakdown(&self) -> BTreeMap<Category, Decimal> {
        self.expenses
            .iter()
            .fold(BTreeMap::new(), |mut breakdown, expense| {
                *breakdown.entry(expense.category).or_insert(Decimal::ZERO) += expense.amount.value();
                breakdown
            })
    }

    /// Spending per month over the trailing window ending with the
    /// current month, oldest first. Every month of the window is
    /// present, even without expenses.
    pub fn monthly_trend(&self) -> Vec<MonthTotal> {
        let mut trend: Vec<MonthTotal> = trailing_months(self.clock.today(), self.trend_months)
            .into_iter()
            .map(|month| MonthTotal { month: month, total: Decimal::ZERO })
            .collect();

        for expense in &self.expenses {
            let month = YearMonth::of(expense.date);

            //
            // Expenses outside of the window are just skipped
            //

            if let Some(entry) = trend.iter_mut().find(|t| t.month == month) {
                entry.total += expense.amount.value();
            }
        }

        trend
    }

    /// Monthly spending budget.
    pub fn budget(&self) -> Amount {
        self.budget
    }

    /// Change monthly spending budget.
    ///
    /// * `budget` - new budget
    pub fn set_budget(&mut self, budget: Amount) -> Result<()> {
        self.persist(BUDGET, &budget)?;
        self.budget = budget;

        tracing::info!(user = %self.prefix, budget = %budget, "budget changed");
        Ok(())
    }
}


impl<P, C> RecordStore<P, C>
where
    P: Persistence,
    C: Clock
{
    /// Time-of-creation based identifier, strictly greater than
    /// every existing one.
    fn next_id<I: Iterator<Item = Id>>(now_millis: i64, existing: I) -> Id {
        match existing.max() {
            Some(last) if last >= now_millis => last + 1,
            _ => now_millis,
        }
    }

    fn position<T, F: Fn(&T) -> bool>(items: &[T], predicate: F) -> Option<usize> {
        items
            .iter()
            .position(predicate)
    }

    fn sum_expenses<'a, I: Iterator<Item = &'a Expense>>(expenses: I) -> Decimal {
        expenses
            .map(|e| e.amount.value())
            .sum()
    }

    fn not_found(id: Id, kind: TransactionKind) -> Error {
        tracing::warn!(id, %kind, "transaction not found");

        Error::new(ErrorKind::NotFound, "Transaction not found")
            .with_extra(format!("{} {}", kind, id))
    }

    fn committed(&mut self, id: Id, kind: TransactionKind, action: &str) {
        self.revision += 1;
        tracing::info!(user = %self.prefix, id, %kind, action, "transaction {}", action);
    }

    fn persist<T: Serialize + ?Sized>(&self, collection: &str, data: &T) -> Result<()> {
        let key = user_key(&self.prefix, collection);

        let result = serde_json::to_string(data)
            .map_err(|e| Error::from(e).into_kind(ErrorKind::Persistence))
            .and_then(|blob| self.storage.save(&key, &blob));

        if let Err(e) = &result {
            tracing::warn!(key = %key, error = %e, "failed to persist records");
        }

        result
    }

    fn load_or<T: DeserializeOwned>(storage: &P, key: &str, default: T) -> Result<T> {
        match storage.load(key)? {
            Some(blob) => serde_json::from_str(&blob)
                .map_err(|e| Error::from(e).with_extra(key)),
            None => Ok(default),
        }
    }
}
