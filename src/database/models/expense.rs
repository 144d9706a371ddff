use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use super::options::{Category, PaidBy, Recurrence};

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OneTimeExpense {
    pub id: i32,
    pub merchant: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount_spent: Decimal,
    pub date: NaiveDate,
    pub paid_by: PaidBy,
    pub tax_deductible: bool,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOneTimeExpense {
    pub merchant: String,
    pub description: String,
    pub amount_spent: Decimal,
    pub date: NaiveDate,
    pub paid_by: PaidBy,
    pub tax_deductible: bool,
    pub category: Category,
}

impl NewOneTimeExpense {
    pub(crate) fn into_expense(self, id: i32) -> OneTimeExpense {
        OneTimeExpense {
            id,
            merchant: self.merchant,
            description: self.description,
            amount_spent: self.amount_spent,
            date: self.date,
            paid_by: self.paid_by,
            tax_deductible: self.tax_deductible,
            category: self.category,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RecurringExpense {
    pub id: i32,
    pub merchant: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub tax_deductible: bool,
    pub category: Category,
    pub recurrence: Recurrence,
    pub paid_by: PaidBy,
    pub start_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRecurringExpense {
    pub merchant: String,
    pub description: String,
    pub amount: Decimal,
    pub tax_deductible: bool,
    pub category: Category,
    pub recurrence: Recurrence,
    pub paid_by: PaidBy,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl NewRecurringExpense {
    pub(crate) fn into_expense(self, id: i32) -> RecurringExpense {
        RecurringExpense {
            id,
            merchant: self.merchant,
            description: self.description,
            amount: self.amount,
            tax_deductible: self.tax_deductible,
            category: self.category,
            recurrence: self.recurrence,
            paid_by: self.paid_by,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}
