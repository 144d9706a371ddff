use serde::Serialize;
use std::sync::Arc;

use crate::database::models::{DateWindow, Job, OneTimeExpense};
use crate::database::{DatabaseError, Store};

/// Everything scheduled inside a window, each list in ascending id order.
#[derive(Debug, Clone, Serialize)]
pub struct Events {
    pub jobs: Vec<Job>,
    pub expenses: Vec<OneTimeExpense>,
}

#[derive(Clone)]
pub struct CalendarService {
    store: Arc<dyn Store>,
}

impl CalendarService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Jobs whose `[startDate, endDate]` touches the window and one-time
    /// expenses dated inside it. Both ends are inclusive; a reversed window
    /// selects nothing.
    pub async fn events(&self, window: DateWindow) -> Result<Events, DatabaseError> {
        if window.start > window.end {
            return Ok(Events {
                jobs: Vec::new(),
                expenses: Vec::new(),
            });
        }

        let jobs = self.store.jobs_overlapping(window).await?;
        let expenses = self.store.one_time_expenses_within(window).await?;
        tracing::debug!(
            "Events {}..{}: {} jobs, {} expenses",
            window.start,
            window.end,
            jobs.len(),
            expenses.len()
        );
        Ok(Events { jobs, expenses })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{
        Category, Confirmation, NewJob, NewOneTimeExpense, PaidBy, PaidTo, WorkedBy,
    };
    use crate::database::MemoryStore;
    use chrono::{Duration, NaiveDate};
    use rust_decimal::Decimal;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn job(client: &str, start: i64, end: i64) -> NewJob {
        NewJob {
            client: client.into(),
            description: "Sound".into(),
            amount_paid: Decimal::new(10000, 2),
            paid_to: PaidTo::Tyler,
            worked_by: WorkedBy::Tyler,
            confirmation: Confirmation::PencilledIn,
            has_paid: false,
            start_date: today() + Duration::days(start),
            end_date: today() + Duration::days(end),
        }
    }

    fn expense(merchant: &str, offset: i64) -> NewOneTimeExpense {
        NewOneTimeExpense {
            merchant: merchant.into(),
            description: "Cables".into(),
            amount_spent: Decimal::new(1999, 2),
            date: today() + Duration::days(offset),
            paid_by: PaidBy::Meghan,
            tax_deductible: true,
            category: Category::BusinessSupplies,
        }
    }

    #[tokio::test]
    async fn window_selects_overlapping_jobs_and_contained_expenses() {
        let store = Arc::new(MemoryStore::new());
        store.create_job(job("spanning", -2, 2)).await.unwrap();
        store.create_job(job("before", -5, -1)).await.unwrap();
        store.create_job(job("inside", 3, 3)).await.unwrap();
        store.create_job(job("after", 8, 9)).await.unwrap();
        store.create_one_time_expense(expense("start edge", 0)).await.unwrap();
        store.create_one_time_expense(expense("end edge", 7)).await.unwrap();
        store.create_one_time_expense(expense("outside", 8)).await.unwrap();

        let calendar = CalendarService::new(store);
        let window = DateWindow::new(today(), today() + Duration::days(7));
        let events = calendar.events(window).await.unwrap();

        let clients: Vec<&str> = events.jobs.iter().map(|j| j.client.as_str()).collect();
        assert_eq!(clients, vec!["spanning", "inside"]);
        let merchants: Vec<&str> = events.expenses.iter().map(|e| e.merchant.as_str()).collect();
        assert_eq!(merchants, vec!["start edge", "end edge"]);
    }

    #[tokio::test]
    async fn empty_store_gives_empty_lists() {
        let calendar = CalendarService::new(Arc::new(MemoryStore::new()));
        let events = calendar
            .events(DateWindow::new(today(), today()))
            .await
            .unwrap();
        assert!(events.jobs.is_empty());
        assert!(events.expenses.is_empty());
    }

    #[tokio::test]
    async fn reversed_window_selects_nothing() {
        let store = Arc::new(MemoryStore::new());
        store.create_job(job("long run", -10, 10)).await.unwrap();

        let calendar = CalendarService::new(store);
        let window = DateWindow::new(today() + Duration::days(2), today());
        let events = calendar.events(window).await.unwrap();
        assert!(events.jobs.is_empty());
    }
}
