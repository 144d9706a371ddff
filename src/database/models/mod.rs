pub mod expense;
pub mod job;
pub mod options;
pub mod user;

use chrono::NaiveDate;

pub use expense::{NewOneTimeExpense, NewRecurringExpense, OneTimeExpense, RecurringExpense};
pub use job::{Job, NewJob};
pub use options::{Category, Confirmation, InvalidOption, PaidBy, PaidTo, Recurrence, WorkedBy};
pub use user::{NewUser, User};

/// Inclusive date range used by the calendar query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// True when `[start, end]` shares at least one day with the window
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        end >= self.start && start <= self.end
    }
}
