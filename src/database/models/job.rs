use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use super::options::{Confirmation, PaidTo, WorkedBy};

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub client: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount_paid: Decimal,
    pub paid_to: PaidTo,
    pub worked_by: WorkedBy,
    pub confirmation: Confirmation,
    pub has_paid: bool,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Field values for inserting or replacing a job
#[derive(Debug, Clone, PartialEq)]
pub struct NewJob {
    pub client: String,
    pub description: String,
    pub amount_paid: Decimal,
    pub paid_to: PaidTo,
    pub worked_by: WorkedBy,
    pub confirmation: Confirmation,
    pub has_paid: bool,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl NewJob {
    pub(crate) fn into_job(self, id: i32) -> Job {
        Job {
            id,
            client: self.client,
            description: self.description,
            amount_paid: self.amount_paid,
            paid_to: self.paid_to,
            worked_by: self.worked_by,
            confirmation: self.confirmation,
            has_paid: self.has_paid,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}
