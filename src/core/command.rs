use crate::storage::{Amount, Id, NewExpense, NewFund, Patch, TransactionKind};
use super::query::Filter;


/// Request to change tracker's state.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Record an income
    AddFund(NewFund),

    /// Record a spending
    AddExpense(NewExpense),

    /// Overwrite fields of an existing record
    UpdateTransaction {
        id: Id,
        patch: Patch,
    },

    /// Remove a record permanently
    DeleteTransaction {
        id: Id,
        kind: TransactionKind,
    },

    /// Replace current transaction list filter
    SetFilter(Filter),

    /// Change monthly spending budget
    SetBudget(Amount),
}


/// Outcome of a successfully handled [`Command`].
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Added {
        id: Id,
        kind: TransactionKind,
    },

    Updated {
        id: Id,
        kind: TransactionKind,
    },

    Deleted {
        id: Id,
        kind: TransactionKind,
    },

    FilterChanged,

    BudgetChanged,
}
