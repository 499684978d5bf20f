//! Fixtures shared by unit tests across the crate.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::auth::{Session, User};
use crate::datetime::Date;
use crate::storage::{Amount, Category, NewExpense, NewFund};


pub(crate) fn date(year: i32, month: u32, day: u32) -> Date {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub(crate) fn amount(value: Decimal) -> Amount {
    Amount::new(value).unwrap()
}

/// Session of a fixed test user, identical across calls.
pub(crate) fn session() -> Session {
    Session::new(User {
        id: uuid::Uuid::from_u128(0x1234),
        name: "Test".to_owned(),
        email: "test@example.com".to_owned(),
        created_at: chrono::Utc::now(),
    })
}

pub(crate) fn fund(value: Decimal, source: &str, on: Date) -> NewFund {
    NewFund { amount: amount(value), source: source.to_owned(), date: on }
}

pub(crate) fn expense(value: Decimal, category: Category, note: Option<&str>, on: Date) -> NewExpense {
    NewExpense { amount: amount(value), category: category, note: note.map(str::to_owned), date: on }
}
