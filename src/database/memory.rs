use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::models::{
    DateWindow, Job, NewJob, NewOneTimeExpense, NewRecurringExpense, NewUser, OneTimeExpense,
    RecurringExpense, User,
};
use super::{
    max_amount, DatabaseError, Store, JOBS_AMOUNT_PAID_NONNEGATIVE, JOBS_DATE_ORDER,
    MAX_IDENTITY_LEN, RECURRING_EXPENSES_DATE_ORDER, USERS_EMAIL_KEY, USERS_USERNAME_KEY,
};

/// One table: rows keyed by id plus the next id to hand out.
#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<i32, T>,
    next_id: i32,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }

    fn insert_with(&mut self, build: impl FnOnce(i32) -> T) -> T {
        let id = self.next_id;
        self.next_id += 1;
        let row = build(id);
        self.rows.insert(id, row.clone());
        row
    }

    fn replace_with(&mut self, id: i32, build: impl FnOnce(i32) -> T) -> Option<T> {
        let slot = self.rows.get_mut(&id)?;
        *slot = build(id);
        Some(slot.clone())
    }

    fn get(&self, id: i32) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    fn all(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }

    fn remove(&mut self, id: i32) -> bool {
        self.rows.remove(&id).is_some()
    }
}

#[derive(Debug)]
struct Tables {
    users: Table<User>,
    jobs: Table<Job>,
    one_time_expenses: Table<OneTimeExpense>,
    recurring_expenses: Table<RecurringExpense>,
}

impl Tables {
    fn new() -> Self {
        Self {
            users: Table::new(),
            jobs: Table::new(),
            one_time_expenses: Table::new(),
            recurring_expenses: Table::new(),
        }
    }
}

/// Process-local store enforcing the same constraints as the SQL schema.
/// Every write holds the table lock for its whole check-then-write.
#[derive(Debug)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::new()),
        }
    }

    fn check_amount(amount: Decimal) -> Result<(), DatabaseError> {
        if amount > max_amount() {
            return Err(DatabaseError::OutOfRange(format!(
                "numeric field overflow: {}",
                amount
            )));
        }
        Ok(())
    }

    fn check_user(user: &NewUser) -> Result<(), DatabaseError> {
        for value in [&user.username, &user.email] {
            if value.chars().count() > MAX_IDENTITY_LEN {
                return Err(DatabaseError::OutOfRange(format!(
                    "value too long for type character varying({})",
                    MAX_IDENTITY_LEN
                )));
            }
        }
        Ok(())
    }

    fn check_job(job: &NewJob) -> Result<(), DatabaseError> {
        Self::check_amount(job.amount_paid)?;
        if job.end_date < job.start_date {
            return Err(DatabaseError::CheckViolation(JOBS_DATE_ORDER.to_string()));
        }
        if job.amount_paid < Decimal::ZERO {
            return Err(DatabaseError::CheckViolation(
                JOBS_AMOUNT_PAID_NONNEGATIVE.to_string(),
            ));
        }
        Ok(())
    }

    fn check_recurring(expense: &NewRecurringExpense) -> Result<(), DatabaseError> {
        Self::check_amount(expense.amount)?;
        match expense.end_date {
            Some(end) if end < expense.start_date => Err(DatabaseError::CheckViolation(
                RECURRING_EXPENSES_DATE_ORDER.to_string(),
            )),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_schema(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn drop_schema(&self) -> Result<(), DatabaseError> {
        *self.tables.write().await = Tables::new();
        Ok(())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        Self::check_user(&user)?;
        let mut tables = self.tables.write().await;
        for existing in tables.users.rows.values() {
            if existing.username == user.username {
                return Err(DatabaseError::UniqueViolation(USERS_USERNAME_KEY.to_string()));
            }
            if existing.email == user.email {
                return Err(DatabaseError::UniqueViolation(USERS_EMAIL_KEY.to_string()));
            }
        }
        Ok(tables.users.insert_with(|id| user.into_user(id)))
    }

    async fn find_user(&self, id: i32) -> Result<Option<User>, DatabaseError> {
        Ok(self.tables.read().await.users.get(id))
    }

    async fn find_user_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .rows
            .values()
            .find(|u| u.username == identifier || u.email == identifier)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        Ok(self.tables.read().await.users.all())
    }

    async fn set_admin(
        &self,
        username: &str,
        is_admin: bool,
    ) -> Result<Option<User>, DatabaseError> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .users
            .rows
            .values_mut()
            .find(|u| u.username == username)
            .map(|u| {
                u.is_admin = is_admin;
                u.clone()
            }))
    }

    async fn create_job(&self, job: NewJob) -> Result<Job, DatabaseError> {
        Self::check_job(&job)?;
        let mut tables = self.tables.write().await;
        Ok(tables.jobs.insert_with(|id| job.into_job(id)))
    }

    async fn find_job(&self, id: i32) -> Result<Option<Job>, DatabaseError> {
        Ok(self.tables.read().await.jobs.get(id))
    }

    async fn list_jobs(&self) -> Result<Vec<Job>, DatabaseError> {
        Ok(self.tables.read().await.jobs.all())
    }

    async fn update_job(&self, id: i32, job: NewJob) -> Result<Option<Job>, DatabaseError> {
        Self::check_job(&job)?;
        let mut tables = self.tables.write().await;
        Ok(tables.jobs.replace_with(id, |id| job.into_job(id)))
    }

    async fn delete_job(&self, id: i32) -> Result<bool, DatabaseError> {
        Ok(self.tables.write().await.jobs.remove(id))
    }

    async fn jobs_overlapping(&self, window: DateWindow) -> Result<Vec<Job>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .jobs
            .rows
            .values()
            .filter(|job| window.overlaps(job.start_date, job.end_date))
            .cloned()
            .collect())
    }

    async fn create_one_time_expense(
        &self,
        expense: NewOneTimeExpense,
    ) -> Result<OneTimeExpense, DatabaseError> {
        Self::check_amount(expense.amount_spent)?;
        let mut tables = self.tables.write().await;
        Ok(tables
            .one_time_expenses
            .insert_with(|id| expense.into_expense(id)))
    }

    async fn find_one_time_expense(
        &self,
        id: i32,
    ) -> Result<Option<OneTimeExpense>, DatabaseError> {
        Ok(self.tables.read().await.one_time_expenses.get(id))
    }

    async fn list_one_time_expenses(&self) -> Result<Vec<OneTimeExpense>, DatabaseError> {
        Ok(self.tables.read().await.one_time_expenses.all())
    }

    async fn update_one_time_expense(
        &self,
        id: i32,
        expense: NewOneTimeExpense,
    ) -> Result<Option<OneTimeExpense>, DatabaseError> {
        Self::check_amount(expense.amount_spent)?;
        let mut tables = self.tables.write().await;
        Ok(tables
            .one_time_expenses
            .replace_with(id, |id| expense.into_expense(id)))
    }

    async fn delete_one_time_expense(&self, id: i32) -> Result<bool, DatabaseError> {
        Ok(self.tables.write().await.one_time_expenses.remove(id))
    }

    async fn one_time_expenses_within(
        &self,
        window: DateWindow,
    ) -> Result<Vec<OneTimeExpense>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .one_time_expenses
            .rows
            .values()
            .filter(|expense| window.contains(expense.date))
            .cloned()
            .collect())
    }

    async fn create_recurring_expense(
        &self,
        expense: NewRecurringExpense,
    ) -> Result<RecurringExpense, DatabaseError> {
        Self::check_recurring(&expense)?;
        let mut tables = self.tables.write().await;
        Ok(tables
            .recurring_expenses
            .insert_with(|id| expense.into_expense(id)))
    }

    async fn find_recurring_expense(
        &self,
        id: i32,
    ) -> Result<Option<RecurringExpense>, DatabaseError> {
        Ok(self.tables.read().await.recurring_expenses.get(id))
    }

    async fn list_recurring_expenses(&self) -> Result<Vec<RecurringExpense>, DatabaseError> {
        Ok(self.tables.read().await.recurring_expenses.all())
    }

    async fn update_recurring_expense(
        &self,
        id: i32,
        expense: NewRecurringExpense,
    ) -> Result<Option<RecurringExpense>, DatabaseError> {
        Self::check_recurring(&expense)?;
        let mut tables = self.tables.write().await;
        Ok(tables
            .recurring_expenses
            .replace_with(id, |id| expense.into_expense(id)))
    }

    async fn delete_recurring_expense(&self, id: i32) -> Result<bool, DatabaseError> {
        Ok(self.tables.write().await.recurring_expenses.remove(id))
    }
}
