// handlers/expenses - /admin/one-time-expenses and /admin/recurring-expenses
// Both kinds share the "Expense does not exist" 404 and the paidBy/category options.

pub mod one_time;
pub mod recurring;

const KIND: &str = "Expense";
