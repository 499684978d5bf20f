use std::collections::HashMap;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDateTime, Timelike};

use crate::auth::{Session, UserId};
use crate::datetime::{Clock, Date};
use crate::error::{Result, Error, ErrorKind};
use crate::storage::{Category, Expense, Fund, Persistence, Transaction};
use super::store::RecordStore;


/// Name of "no filtering" option in every filter.
const ALL: &str = "all";

/// Number of cached views kept by the engine.
const CACHE_CAPACITY: usize = 32;


/// Collections to select transactions from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Tab {
    /// Funds and expenses together
    #[default]
    All,

    /// Funds only
    Funds,

    /// Expenses only
    Expenses,
}


impl FromStr for Tab {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            ALL        => Ok(Tab::All),
            "funds"    => Ok(Tab::Funds),
            "expenses" => Ok(Tab::Expenses),
            _          => Err(Error::from_message("Unknown tab").with_extra(s)),
        }
    }
}


/// Time range predicate over transaction dates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Period {
    /// Any date
    #[default]
    All,

    /// Current calendar day
    Today,

    /// Last 7 days (7 * 24 hours back from now), no upper bound
    Week,

    /// Current calendar month
    Month,

    /// Dates between optional bounds, both inclusive
    Custom {
        from: Option<Date>,
        to: Option<Date>,
    },
}


impl Period {
    /// Parses period by name. Bounds are used by `custom` period only.
    ///
    /// * `name` - one of `all`, `today`, `week`, `month`, `custom`
    /// * `from` - first included date
    /// * `to` - last included date
    pub fn from_name(name: &str, from: Option<Date>, to: Option<Date>) -> Result<Self> {
        match name {
            ALL      => Ok(Period::All),
            "today"  => Ok(Period::Today),
            "week"   => Ok(Period::Week),
            "month"  => Ok(Period::Month),
            "custom" => Ok(Period::Custom { from: from, to: to }),
            _        => Err(Error::from_message("Unknown period").with_extra(name)),
        }
    }

    /// Turns the period into concrete date bounds as of `now`.
    fn resolve(&self, now: NaiveDateTime) -> DateRange {
        let today = now.date();

        match *self {
            Period::All => DateRange::default(),

            Period::Today => DateRange { from: Some(today), to: Some(today) },

            Period::Week => {
                //
                // Date is compared as its midnight against the exact
                // moment a week ago, so the first included day is the
                // next one unless that moment is midnight itself
                //

                let week_ago = now - Duration::days(7);
                let at_midnight = week_ago.num_seconds_from_midnight() == 0 && week_ago.nanosecond() == 0;
                let first = if at_midnight {
                    week_ago.date()
                } else {
                    week_ago.date().succ_opt().unwrap_or(week_ago.date())
                };

                DateRange { from: Some(first), to: None }
            }

            Period::Month => {
                let first = today.with_day(1).unwrap_or(today);
                let last = first
                    .checked_add_months(chrono::Months::new(1))
                    .and_then(|next| next.pred_opt())
                    .unwrap_or(today);

                DateRange { from: Some(first), to: Some(last) }
            }

            Period::Custom { from, to } => DateRange { from: from, to: to },
        }
    }
}


/// Full set of transaction list filters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Filter {
    /// Collections to select from
    pub tab: Tab,

    /// Date predicate
    pub period: Period,

    /// Expense category to keep, `None` keeps everything.
    /// Funds have no category, so any category drops them.
    pub category: Option<Category>,

    /// Case-insensitive substring to look for, empty matches everything
    pub search: String,
}


impl Filter {
    /// Parses category filter: `all` or a category label.
    pub fn category_from_str(s: &str) -> Result<Option<Category>> {
        match s {
            ALL => Ok(None),
            _ => s.parse().map(Some),
        }
    }
}


/// Inclusive date bounds, missing bound means unbounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
struct DateRange {
    from: Option<Date>,
    to: Option<Date>,
}


impl DateRange {
    fn contains(&self, date: Date) -> bool {
        self.from.map_or(true, |from| date >= from) &&
            self.to.map_or(true, |to| date <= to)
    }
}


/// Filter with time-dependent parts resolved.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct QueryKey {
    tab: Tab,
    range: DateRange,
    category: Option<Category>,
    search: String,
}


impl QueryKey {
    fn new(filter: &Filter, now: NaiveDateTime) -> Self {
        QueryKey {
            tab: filter.tab,
            range: filter.period.resolve(now),
            category: filter.category,
            search: filter.search.to_lowercase(),
        }
    }

    fn matches(&self, transaction: &Transaction) -> bool {
        if !self.range.contains(transaction.date()) {
            return false;
        }

        if let Some(category) = self.category {
            if transaction.category() != Some(category) {
                return false;
            }
        }

        self.search.is_empty() || Self::search_text(transaction).contains(&self.search)
    }

    fn search_text(transaction: &Transaction) -> String {
        let category = transaction
            .category()
            .map(|c| c.label())
            .unwrap_or_default();

        format!("{} {} {} {}",
            transaction.source().unwrap_or_default(),
            category,
            transaction.note().unwrap_or_default(),
            transaction.amount())
            .to_lowercase()
    }

    fn run(&self, funds: &[Fund], expenses: &[Expense]) -> Vec<Transaction> {
        let funds = funds
            .iter()
            .filter(|_| self.tab != Tab::Expenses)
            .cloned()
            .map(Transaction::Fund);

        let expenses = expenses
            .iter()
            .filter(|_| self.tab != Tab::Funds)
            .cloned()
            .map(Transaction::Expense);

        let mut result: Vec<Transaction> = funds
            .chain(expenses)
            .filter(|t| self.matches(t))
            .collect();

        //
        // Stable sort: records with equal dates keep
        // funds-then-expenses insertion order
        //

        result.sort_by(|a, b| b.date().cmp(&a.date()));
        result
    }
}


/// Filters and sorts transactions, newest date first.
///
/// Pure function of its inputs, `now` is local wall-clock time.
///
/// * `funds` - income records
/// * `expenses` - spending records
/// * `filter` - filters to apply
/// * `now` - current local time
pub fn query_transactions(funds: &[Fund], expenses: &[Expense], filter: &Filter, now: NaiveDateTime) -> Vec<Transaction> {
    QueryKey::new(filter, now)
        .run(funds, expenses)
}


/// Answers transaction list queries of one user, memoizing
/// results until the store changes.
pub struct QueryEngine {
    /// User, whose records are queried.
    owner: UserId,

    /// Store version the cache was built for.
    version: Option<(u64, u64)>,

    /// Results per resolved filter.
    cache: HashMap<QueryKey, Vec<Transaction>>,
}


impl QueryEngine {
    /// Creates an engine for a session's user.
    ///
    /// * `session` - logged-in user context
    pub fn new(session: &Session) -> Self {
        QueryEngine {
            owner: session.user().id,
            version: None,
            cache: HashMap::new(),
        }
    }

    /// Return transactions matching a filter, newest date first.
    ///
    /// * `store` - records of the engine's user
    /// * `filter` - filters to apply
    pub fn query<P, C>(&mut self, store: &RecordStore<P, C>, filter: &Filter) -> Result<&[Transaction]>
    where
        P: Persistence,
        C: Clock
    {
        if store.owner() != self.owner {
            return Err(Error::new(ErrorKind::Validation, "Records belong to another user")
                .with_extra(store.owner().to_string()));
        }

        if self.version != Some(store.version()) || self.cache.len() >= CACHE_CAPACITY {
            self.cache.clear();
            self.version = Some(store.version());
        }

        let key = QueryKey::new(filter, store.clock().now());
        let view = self.cache
            .entry(key)
            .or_insert_with_key(|key| {
                tracing::debug!(?key, "transaction view computed");
                key.run(store.funds(), store.expenses())
            });

        Ok(view.as_slice())
    }

    /// Return all transactions, newest date first.
    ///
    /// * `store` - records of the engine's user
    pub fn all<P, C>(&mut self, store: &RecordStore<P, C>) -> Result<&[Transaction]>
    where
        P: Persistence,
        C: Clock
    {
        self.query(store, &Filter::default())
    }
}


#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use rust_decimal_macros::dec;

    use super::*;
    use super::super::config::Config;
    use crate::core::test_utils::{date, expense, fund, session};
    use crate::auth::User;
    use crate::datetime::FixedClock;
    use crate::storage::{MemoryStorage, TransactionKind};

    fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
        date(year, month, day).and_hms_opt(hour, 0, 0).unwrap()
    }

    fn ids(result: &[Transaction]) -> Vec<(TransactionKind, Date)> {
        result
            .iter()
            .map(|t| (t.kind(), t.date()))
            .collect()
    }

    fn sample() -> (Vec<Fund>, Vec<Expense>) {
        let storage = MemoryStorage::new();
        let clock = FixedClock::at(2024, 3, 10).unwrap();
        let mut store = RecordStore::open(&session(), &storage, clock, &Config::default()).unwrap();

        store.add_fund(fund(dec!(1000), "Salary", date(2024, 3, 1))).unwrap();
        store.add_fund(fund(dec!(50), "Food stamps", date(2024, 2, 20))).unwrap();
        store.add_expense(expense(dec!(12.5), Category::Food, Some("Lunch"), date(2024, 3, 5))).unwrap();
        store.add_expense(expense(dec!(300), Category::Travel, Some("Train to food festival"), date(2024, 3, 10))).unwrap();
        store.add_expense(expense(dec!(80), Category::Bills, None, date(2024, 1, 15))).unwrap();
        store.add_expense(expense(dec!(25), Category::Shopping, Some("Shoes"), date(2024, 1, 16))).unwrap();

        (store.funds().to_vec(), store.expenses().to_vec())
    }

    fn run(filter: Filter, now: NaiveDateTime) -> Vec<Transaction> {
        let (funds, expenses) = sample();
        query_transactions(&funds, &expenses, &filter, now)
    }

    #[test]
    fn sorts_newest_first() {
        let result = run(Filter::default(), at(2024, 3, 10, 12));

        check!(ids(&result) == [
            (TransactionKind::Expense, date(2024, 3, 10)),
            (TransactionKind::Expense, date(2024, 3, 5)),
            (TransactionKind::Fund, date(2024, 3, 1)),
            (TransactionKind::Fund, date(2024, 2, 20)),
            (TransactionKind::Expense, date(2024, 1, 16)),
            (TransactionKind::Expense, date(2024, 1, 15)),
        ]);
    }

    #[test]
    fn equal_dates_keep_insertion_order() {
        let (mut funds, mut expenses) = sample();
        for fund in funds.iter_mut() {
            fund.date = date(2024, 1, 1);
        }
        for expense in expenses.iter_mut() {
            expense.date = date(2024, 1, 1);
        }

        let result = query_transactions(&funds, &expenses, &Filter::default(), at(2024, 3, 10, 12));
        let order: Vec<i64> = result.iter().map(Transaction::id).collect();
        let expected: Vec<i64> = funds.iter().map(|f| f.id)
            .chain(expenses.iter().map(|e| e.id))
            .collect();

        check!(order == expected);
    }

    #[test]
    fn tab_selects_collections() {
        let funds = run(Filter { tab: Tab::Funds, ..Default::default() }, at(2024, 3, 10, 12));
        check!(funds.len() == 2);
        check!(funds.iter().all(|t| t.kind() == TransactionKind::Fund));

        let expenses = run(Filter { tab: Tab::Expenses, ..Default::default() }, at(2024, 3, 10, 12));
        check!(expenses.len() == 4);
        check!(expenses.iter().all(|t| t.kind() == TransactionKind::Expense));
    }

    #[test]
    fn today_period() {
        let result = run(Filter { period: Period::Today, ..Default::default() }, at(2024, 3, 10, 23));
        check!(ids(&result) == [(TransactionKind::Expense, date(2024, 3, 10))]);
    }

    #[test]
    fn week_period_is_seven_days_back_from_now() {
        // A week before is 2024-03-03 12:00, so March 3rd itself is out
        let result = run(Filter { period: Period::Week, ..Default::default() }, at(2024, 3, 10, 12));
        check!(ids(&result) == [
            (TransactionKind::Expense, date(2024, 3, 10)),
            (TransactionKind::Expense, date(2024, 3, 5)),
        ]);

        // At midnight a week back lands exactly on March 1st
        let result = run(Filter { period: Period::Week, ..Default::default() }, at(2024, 3, 8, 0));
        check!(result.len() == 3);
    }

    #[test]
    fn week_period_crosses_year_boundary() {
        let storage = MemoryStorage::new();
        let clock = FixedClock::new(at(2024, 1, 3, 9));
        let mut store = RecordStore::open(&session(), &storage, clock, &Config::default()).unwrap();

        store.add_expense(expense(dec!(1), Category::Food, None, date(2023, 12, 27))).unwrap();
        store.add_expense(expense(dec!(2), Category::Food, None, date(2023, 12, 28))).unwrap();
        store.add_fund(fund(dec!(3), "Gift", date(2023, 12, 31))).unwrap();
        store.add_expense(expense(dec!(4), Category::Bills, None, date(2024, 1, 2))).unwrap();

        let filter = Filter { period: Period::Week, ..Default::default() };
        let result = query_transactions(store.funds(), store.expenses(), &filter, at(2024, 1, 3, 9));

        check!(ids(&result) == [
            (TransactionKind::Expense, date(2024, 1, 2)),
            (TransactionKind::Fund, date(2023, 12, 31)),
            (TransactionKind::Expense, date(2023, 12, 28)),
        ]);
    }

    #[test]
    fn month_period() {
        let result = run(Filter { period: Period::Month, ..Default::default() }, at(2024, 1, 31, 12));
        check!(ids(&result) == [
            (TransactionKind::Expense, date(2024, 1, 16)),
            (TransactionKind::Expense, date(2024, 1, 15)),
        ]);
    }

    #[test]
    fn custom_period_includes_end_date() {
        let filter = Filter {
            period: Period::Custom { from: Some(date(2024, 1, 10)), to: Some(date(2024, 1, 15)) },
            ..Default::default()
        };

        let result = run(filter, at(2024, 3, 10, 12));
        check!(ids(&result) == [(TransactionKind::Expense, date(2024, 1, 15))]);
    }

    #[test]
    fn custom_period_with_one_bound() {
        let from_only = Filter {
            period: Period::Custom { from: Some(date(2024, 3, 1)), to: None },
            ..Default::default()
        };
        check!(run(from_only, at(2024, 3, 10, 12)).len() == 3);

        let to_only = Filter {
            period: Period::Custom { from: None, to: Some(date(2024, 2, 20)) },
            ..Default::default()
        };
        check!(run(to_only, at(2024, 3, 10, 12)).len() == 3);

        let unbounded = Filter {
            period: Period::Custom { from: None, to: None },
            ..Default::default()
        };
        check!(run(unbounded, at(2024, 3, 10, 12)).len() == 6);
    }

    #[test]
    fn category_filter_drops_funds() {
        let filter = Filter { category: Some(Category::Food), ..Default::default() };
        let result = run(filter, at(2024, 3, 10, 12));

        check!(ids(&result) == [(TransactionKind::Expense, date(2024, 3, 5))]);
    }

    #[test]
    fn search_is_case_insensitive_over_all_fields() {
        let result = run(Filter { search: "FOOD".to_owned(), ..Default::default() }, at(2024, 3, 10, 12));

        // Category "Food", note "...food festival" and source "Food stamps"
        check!(ids(&result) == [
            (TransactionKind::Expense, date(2024, 3, 10)),
            (TransactionKind::Expense, date(2024, 3, 5)),
            (TransactionKind::Fund, date(2024, 2, 20)),
        ]);

        let by_amount = run(Filter { search: "12.5".to_owned(), ..Default::default() }, at(2024, 3, 10, 12));
        check!(ids(&by_amount) == [(TransactionKind::Expense, date(2024, 3, 5))]);
    }

    #[test]
    fn search_on_expenses_tab_returns_only_expenses() {
        let filter = Filter { tab: Tab::Expenses, search: "food".to_owned(), ..Default::default() };
        let result = run(filter, at(2024, 3, 10, 12));

        check!(result.len() == 2);
        for transaction in &result {
            let category = transaction.category().map(|c| c.label().to_lowercase()).unwrap_or_default();
            let note = transaction.note().unwrap_or_default().to_lowercase();
            check!(category.contains("food") || note.contains("food"));
        }
    }

    #[test]
    fn stages_combine() {
        let filter = Filter {
            tab: Tab::All,
            period: Period::Month,
            category: Some(Category::Travel),
            search: "train".to_owned(),
        };

        let result = run(filter, at(2024, 3, 10, 12));
        check!(ids(&result) == [(TransactionKind::Expense, date(2024, 3, 10))]);
    }

    #[test]
    fn filters_parse_from_names() {
        check!("funds".parse::<Tab>().unwrap() == Tab::Funds);
        check!("everything".parse::<Tab>().is_err());

        check!(Period::from_name("week", None, None).unwrap() == Period::Week);
        check!(Period::from_name("custom", Some(date(2024, 1, 1)), None).unwrap()
            == Period::Custom { from: Some(date(2024, 1, 1)), to: None });
        check!(Period::from_name("year", None, None).is_err());

        check!(Filter::category_from_str("all").unwrap() == None);
        check!(Filter::category_from_str("Bills").unwrap() == Some(Category::Bills));
    }

    #[test]
    fn engine_recomputes_after_mutation() {
        let storage = MemoryStorage::new();
        let session = session();
        let clock = FixedClock::at(2024, 3, 10).unwrap();
        let mut store = RecordStore::open(&session, &storage, clock, &Config::default()).unwrap();
        let mut engine = QueryEngine::new(&session);

        store.add_fund(fund(dec!(10), "Gift", date(2024, 3, 1))).unwrap();
        check!(engine.all(&store).unwrap().len() == 1);
        check!(engine.all(&store).unwrap().len() == 1);

        store.add_expense(expense(dec!(5), Category::Other, None, date(2024, 3, 2))).unwrap();
        check!(engine.all(&store).unwrap().len() == 2);
    }

    #[test]
    fn engine_tells_reopened_stores_apart() {
        let storage = MemoryStorage::new();
        let session = session();
        let clock = FixedClock::at(2024, 3, 10).unwrap();
        let mut engine = QueryEngine::new(&session);

        let before = RecordStore::open(&session, &storage, clock, &Config::default()).unwrap();
        check!(engine.all(&before).unwrap().is_empty());

        let mut writer = RecordStore::open(&session, &storage, clock, &Config::default()).unwrap();
        writer.add_fund(fund(dec!(10), "Gift", date(2024, 3, 1))).unwrap();

        let after = RecordStore::open(&session, &storage, clock, &Config::default()).unwrap();
        check!(after.revision() == before.revision());
        check!(engine.all(&after).unwrap().len() == 1);
        check!(engine.all(&before).unwrap().is_empty());
    }

    #[test]
    fn engine_refuses_foreign_store() {
        let storage = MemoryStorage::new();
        let clock = FixedClock::at(2024, 3, 10).unwrap();
        let store = RecordStore::open(&session(), &storage, clock, &Config::default()).unwrap();

        let stranger = Session::new(User {
            id: uuid::Uuid::from_u128(0x9999),
            name: "Stranger".to_owned(),
            email: "stranger@example.com".to_owned(),
            created_at: chrono::Utc::now(),
        });

        let mut engine = QueryEngine::new(&stranger);
        let_assert!(Err(e) = engine.all(&store));
        check!(e.kind() == ErrorKind::Validation);
    }
}
