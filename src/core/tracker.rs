use rust_decimal::Decimal;

use crate::auth::Session;
use crate::datetime::Clock;
use crate::error::Result;
use crate::storage::{Persistence, Transaction, TransactionKind};
use super::command::{Command, Event};
use super::config::Config;
use super::query::{Filter, QueryEngine};
use super::store::RecordStore;


/// Monthly spending came close to (or exceeded) the budget.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BudgetAlert {
    /// Spent in current month
    pub spent: Decimal,

    /// Monthly budget
    pub budget: Decimal,
}


/// Main interface of the expense tracker for a logged-in user.
///
/// Owns user's session, records and current transaction list
/// filter. All state changes go through [`Tracker::handle`].
pub struct Tracker<P, C>
where
    P: Persistence,
    C: Clock
{
    /// Logged-in user context.
    session: Session,

    /// User's records.
    store: RecordStore<P, C>,

    /// Memoized transaction lists.
    engine: QueryEngine,

    /// Currently applied filter.
    filter: Filter,

    /// App's configuration.
    config: Config,
}


impl<P, C> Tracker<P, C>
where
    P: Persistence,
    C: Clock
{
    /// Loads records of the session's user.
    ///
    /// * `session` - logged-in user context
    /// * `storage` - storage used to store data
    /// * `clock` - source of current time
    /// * `config` - app's configuration
    pub fn new(session: Session, storage: P, clock: C, config: Config) -> Result<Self> {
        let store = RecordStore::open(&session, storage, clock, &config)?;
        let engine = QueryEngine::new(&session);

        Ok(Tracker {
            session: session,
            store: store,
            engine: engine,
            filter: Filter::default(),
            config: config,
        })
    }

    /// Applies a command. Nothing changes if an error is returned.
    ///
    /// * `command` - requested change
    pub fn handle(&mut self, command: Command) -> Result<Event> {
        let event = match command {
            Command::AddFund(fund) => {
                let id = self.store.add_fund(fund)?;
                Event::Added { id: id, kind: TransactionKind::Fund }
            }

            Command::AddExpense(expense) => {
                let id = self.store.add_expense(expense)?;
                Event::Added { id: id, kind: TransactionKind::Expense }
            }

            Command::UpdateTransaction { id, patch } => {
                let kind = patch.kind();
                self.store.update_transaction(id, patch)?;
                Event::Updated { id: id, kind: kind }
            }

            Command::DeleteTransaction { id, kind } => {
                self.store.delete_transaction(id, kind)?;
                Event::Deleted { id: id, kind: kind }
            }

            Command::SetFilter(filter) => {
                self.filter = filter;
                Event::FilterChanged
            }

            Command::SetBudget(budget) => {
                self.store.set_budget(budget)?;
                Event::BudgetChanged
            }
        };

        tracing::debug!(?event, "command handled");
        Ok(event)
    }

    /// Transactions matching current filter, newest date first.
    pub fn view(&mut self) -> Result<&[Transaction]> {
        self.engine
            .query(&self.store, &self.filter)
    }

    /// Transactions matching an arbitrary filter. Current filter
    /// is left untouched.
    ///
    /// * `filter` - filters to apply
    pub fn query(&mut self, filter: &Filter) -> Result<&[Transaction]> {
        self.engine
            .query(&self.store, filter)
    }

    /// Checks whether this month's spending reached alert threshold.
    pub fn budget_alert(&self) -> Option<BudgetAlert> {
        let spent = self.store.monthly_expenses();
        let budget = self.store.budget().value();

        if spent >= budget * self.config.alert_ratio() {
            tracing::info!(%spent, %budget, "budget alert");
            Some(BudgetAlert { spent: spent, budget: budget })
        } else {
            None
        }
    }

    /// User's records.
    pub fn store(&self) -> &RecordStore<P, C> {
        &self.store
    }

    /// Currently applied filter.
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Logged-in user context.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// App's configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Ends the session. Records stay in storage.
    pub fn logout(self) {
        self.session.logout()
    }
}


#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::core::test_utils::{amount, date, expense, fund, session};
    use crate::core::{Period, Tab};
    use crate::datetime::FixedClock;
    use crate::error::ErrorKind;
    use crate::storage::{Category, FundPatch, MemoryStorage, Patch};

    fn tracker(storage: &MemoryStorage) -> Tracker<&MemoryStorage, FixedClock> {
        let clock = FixedClock::at(2024, 3, 10).unwrap();
        Tracker::new(session(), storage, clock, Config::default()).unwrap()
    }

    #[test]
    fn commands_produce_events() {
        let storage = MemoryStorage::new();
        let mut tracker = tracker(&storage);

        let_assert!(Ok(Event::Added { id, kind }) = tracker.handle(Command::AddFund(fund(dec!(100), "Salary", date(2024, 3, 1)))));
        check!(kind == TransactionKind::Fund);

        let patch = Patch::Fund(FundPatch { source: Some("Bonus".to_owned()), ..FundPatch::default() });
        check!(tracker.handle(Command::UpdateTransaction { id: id, patch: patch }).unwrap() == Event::Updated { id: id, kind: kind });
        check!(tracker.store().funds()[0].source == "Bonus");

        check!(tracker.handle(Command::DeleteTransaction { id: id, kind: kind }).unwrap() == Event::Deleted { id: id, kind: kind });
        check!(tracker.store().funds().is_empty());
    }

    #[test]
    fn failed_command_changes_nothing() {
        let storage = MemoryStorage::new();
        let mut tracker = tracker(&storage);

        let_assert!(Err(e) = tracker.handle(Command::DeleteTransaction { id: 42, kind: TransactionKind::Expense }));
        check!(e.kind() == ErrorKind::NotFound);

        storage.set_read_only(true);
        let_assert!(Err(e) = tracker.handle(Command::AddExpense(expense(dec!(5), Category::Food, None, date(2024, 3, 9)))));
        check!(e.is_recoverable());
        check!(tracker.store().expenses().is_empty());
    }

    #[test]
    fn view_follows_filter() {
        let storage = MemoryStorage::new();
        let mut tracker = tracker(&storage);

        tracker.handle(Command::AddFund(fund(dec!(100), "Salary", date(2024, 3, 1)))).unwrap();
        tracker.handle(Command::AddExpense(expense(dec!(20), Category::Food, None, date(2024, 3, 10)))).unwrap();
        tracker.handle(Command::AddExpense(expense(dec!(30), Category::Bills, None, date(2024, 2, 1)))).unwrap();
        check!(tracker.view().unwrap().len() == 3);

        let filter = Filter { tab: Tab::Expenses, period: Period::Month, ..Filter::default() };
        check!(tracker.handle(Command::SetFilter(filter.clone())).unwrap() == Event::FilterChanged);
        check!(tracker.filter() == &filter);

        let view = tracker.view().unwrap();
        check!(view.len() == 1);
        check!(view[0].amount().value() == dec!(20));

        check!(tracker.query(&Filter::default()).unwrap().len() == 3);
        check!(tracker.filter() == &filter);
    }

    #[test]
    fn alert_fires_at_threshold() {
        let storage = MemoryStorage::new();
        let mut tracker = tracker(&storage);

        tracker.handle(Command::SetBudget(amount(dec!(100)))).unwrap();
        tracker.handle(Command::AddExpense(expense(dec!(79.99), Category::Food, None, date(2024, 3, 2)))).unwrap();
        check!(tracker.budget_alert() == None);

        tracker.handle(Command::AddExpense(expense(dec!(0.01), Category::Food, None, date(2024, 3, 3)))).unwrap();
        check!(tracker.budget_alert() == Some(BudgetAlert { spent: dec!(80), budget: dec!(100) }));
    }

    #[test]
    fn last_month_spending_does_not_alert() {
        let storage = MemoryStorage::new();
        let mut tracker = tracker(&storage);

        tracker.handle(Command::AddExpense(expense(dec!(5000), Category::Travel, None, date(2024, 2, 28)))).unwrap();
        check!(tracker.budget_alert() == None);
    }

    #[test]
    fn budget_survives_logout() {
        let storage = MemoryStorage::new();
        let mut first = tracker(&storage);
        first.handle(Command::SetBudget(amount(dec!(250)))).unwrap();
        first.logout();

        let second = tracker(&storage);
        check!(second.store().budget().value() == dec!(250));
    }
}
