use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Serialize, Deserialize};

use crate::datetime::{Date, Timestamp};
use crate::error::{Error, Result};


/// Identifier type.
///
/// Unique within one collection (funds or expenses) of a user.
pub type Id = i64;


/// Non-negative exact monetary value.
///
/// Every way of constructing it, including deserialization,
/// rejects negative values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);


impl Amount {
    /// Zero amount.
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Wraps a decimal value.
    ///
    /// * `value` - value to wrap, must be non-negative
    pub fn new(value: Decimal) -> Result<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(Error::from_message("Amount cannot be negative")
                .with_extra(value.to_string()));
        }

        // Drop the sign of negative zero
        if value.is_zero() {
            return Ok(Amount::ZERO);
        }

        Ok(Amount(value))
    }

    /// Underlying decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }
}


impl FromStr for Amount {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value = Decimal::from_str(s.trim())
            .map_err(|e| Error::from(e).with_extra(format!("input: {:?}", s)))?;

        Self::new(value)
    }
}


impl TryFrom<Decimal> for Amount {
    type Error = Error;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}


impl From<Amount> for Decimal {
    fn from(value: Amount) -> Self {
        value.0
    }
}


impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.normalize().fmt(f)
    }
}


/// Fixed set of expense categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Food,
    Travel,
    Shopping,
    Bills,
    Other,
}


impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 5] = [
        Category::Food,
        Category::Travel,
        Category::Shopping,
        Category::Bills,
        Category::Other,
    ];

    /// User-visible label.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Food     => "Food",
            Category::Travel   => "Travel",
            Category::Shopping => "Shopping",
            Category::Bills    => "Bills",
            Category::Other    => "Other",
        }
    }
}


impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}


impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.label() == s)
            .ok_or_else(|| Error::from_message("Unknown category").with_extra(s))
    }
}


/// Types of transactions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Incomes
    Fund,

    /// Spendings
    Expense,
}


impl TransactionKind {
    /// User-visible label.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Fund    => "Fund",
            TransactionKind::Expense => "Expense",
        }
    }
}


impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Fund    => f.write_str("fund"),
            TransactionKind::Expense => f.write_str("expense"),
        }
    }
}


/// Income record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fund {
    /// Identifier, unique among funds
    pub id: Id,

    /// Amount of money received
    pub amount: Amount,

    /// Origin of money, e.g. "Salary"
    pub source: String,

    /// Day the fund is attributed to
    pub date: Date,

    /// Creation time, never changes
    pub created_at: Timestamp,
}


/// Spending record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// Identifier, unique among expenses
    pub id: Id,

    /// Amount of money spent
    pub amount: Amount,

    /// Category of spending
    pub category: Category,

    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// Day the expense is attributed to
    pub date: Date,

    /// Creation time, never changes
    pub created_at: Timestamp,
}


/// Either kind of record, tagged with its type.
#[derive(Clone, Debug, PartialEq)]
pub enum Transaction {
    Fund(Fund),
    Expense(Expense),
}


impl Transaction {
    pub fn id(&self) -> Id {
        match self {
            Transaction::Fund(fund) => fund.id,
            Transaction::Expense(expense) => expense.id,
        }
    }

    pub fn kind(&self) -> TransactionKind {
        match self {
            Transaction::Fund(_) => TransactionKind::Fund,
            Transaction::Expense(_) => TransactionKind::Expense,
        }
    }

    pub fn amount(&self) -> Amount {
        match self {
            Transaction::Fund(fund) => fund.amount,
            Transaction::Expense(expense) => expense.amount,
        }
    }

    pub fn date(&self) -> Date {
        match self {
            Transaction::Fund(fund) => fund.date,
            Transaction::Expense(expense) => expense.date,
        }
    }

    pub fn created_at(&self) -> Timestamp {
        match self {
            Transaction::Fund(fund) => fund.created_at,
            Transaction::Expense(expense) => expense.created_at,
        }
    }

    /// Source label, present for funds only.
    pub fn source(&self) -> Option<&str> {
        match self {
            Transaction::Fund(fund) => Some(&fund.source),
            Transaction::Expense(_) => None,
        }
    }

    /// Category, present for expenses only.
    pub fn category(&self) -> Option<Category> {
        match self {
            Transaction::Fund(_) => None,
            Transaction::Expense(expense) => Some(expense.category),
        }
    }

    /// Note, present for expenses only.
    pub fn note(&self) -> Option<&str> {
        match self {
            Transaction::Fund(_) => None,
            Transaction::Expense(expense) => expense.note.as_deref(),
        }
    }
}


/// Data of a fund to add. Identifier and creation time
/// are assigned by the store.
#[derive(Clone, Debug, PartialEq)]
pub struct NewFund {
    pub amount: Amount,
    pub source: String,
    pub date: Date,
}


/// Data of an expense to add. Identifier and creation time
/// are assigned by the store.
#[derive(Clone, Debug, PartialEq)]
pub struct NewExpense {
    pub amount: Amount,
    pub category: Category,
    pub note: Option<String>,
    pub date: Date,
}


/// Partial update of a fund. `None` fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FundPatch {
    pub amount: Option<Amount>,
    pub source: Option<String>,
    pub date: Option<Date>,
}


/// Partial update of an expense. `None` fields are left untouched,
/// `note: Some(None)` clears the note.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpensePatch {
    pub amount: Option<Amount>,
    pub category: Option<Category>,
    pub note: Option<Option<String>>,
    pub date: Option<Date>,
}


/// Partial update of either kind of record.
#[derive(Clone, Debug, PartialEq)]
pub enum Patch {
    Fund(FundPatch),
    Expense(ExpensePatch),
}


impl Patch {
    /// Kind of record the patch applies to.
    pub fn kind(&self) -> TransactionKind {
        match self {
            Patch::Fund(_) => TransactionKind::Fund,
            Patch::Expense(_) => TransactionKind::Expense,
        }
    }
}


impl FundPatch {
    pub(crate) fn apply(self, fund: &mut Fund) {
        if let Some(amount) = self.amount {
            fund.amount = amount;
        }

        if let Some(source) = self.source {
            fund.source = source;
        }

        if let Some(date) = self.date {
            fund.date = date;
        }
    }
}


impl ExpensePatch {
    pub(crate) fn apply(self, expense: &mut Expense) {
        if let Some(amount) = self.amount {
            expense.amount = amount;
        }

        if let Some(category) = self.category {
            expense.category = category;
        }

        if let Some(note) = self.note {
            expense.note = note;
        }

        if let Some(date) = self.date {
            expense.date = date;
        }
    }
}
