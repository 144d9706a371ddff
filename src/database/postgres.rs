use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, Executor, PgPool};
use std::time::Duration;
use tracing::info;

use super::models::{
    DateWindow, Job, NewJob, NewOneTimeExpense, NewRecurringExpense, NewUser, OneTimeExpense,
    RecurringExpense, User,
};
use super::{DatabaseError, Store};

const SCHEMA: &str = include_str!("schema.sql");

const DROP_SCHEMA: &str = "
    DROP TABLE IF EXISTS recurring_expenses;
    DROP TABLE IF EXISTS one_time_expenses;
    DROP TABLE IF EXISTS jobs;
    DROP TABLE IF EXISTS users;
";

const USER_COLUMNS: &str = "id, username, email, password, active, is_admin";
const JOB_COLUMNS: &str = "id, client, description, amount_paid, paid_to, worked_by, \
    confirmation, has_paid, start_date, end_date";
const ONE_TIME_COLUMNS: &str = "id, merchant, description, amount_spent, date, paid_by, \
    tax_deductible, category";
const RECURRING_COLUMNS: &str = "id, merchant, description, amount, tax_deductible, category, \
    recurrence, paid_by, start_date, end_date";

/// PostgreSQL-backed store. Each write is a single statement, so a constraint
/// failure leaves no partial row behind.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, DatabaseError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_schema(&self) -> Result<(), DatabaseError> {
        self.pool.execute(SCHEMA).await?;
        info!("Schema created");
        Ok(())
    }

    async fn drop_schema(&self) -> Result<(), DatabaseError> {
        self.pool.execute(DROP_SCHEMA).await?;
        info!("Schema dropped");
        Ok(())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let query = format!(
            "INSERT INTO users (username, email, password) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        let created = sqlx::query_as::<_, User>(&query)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn find_user(&self, id: i32) -> Result<Option<User>, DatabaseError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<User>, DatabaseError> {
        let query = format!(
            "SELECT {} FROM users WHERE username = $1 OR email = $1 ORDER BY id LIMIT 1",
            USER_COLUMNS
        );
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        let query = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&query).fetch_all(&self.pool).await?)
    }

    async fn set_admin(
        &self,
        username: &str,
        is_admin: bool,
    ) -> Result<Option<User>, DatabaseError> {
        let query = format!(
            "UPDATE users SET is_admin = $2 WHERE username = $1 RETURNING {}",
            USER_COLUMNS
        );
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(username)
            .bind(is_admin)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_job(&self, job: NewJob) -> Result<Job, DatabaseError> {
        let query = format!(
            "INSERT INTO jobs (client, description, amount_paid, paid_to, worked_by, confirmation, \
             has_paid, start_date, end_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
            JOB_COLUMNS
        );
        Ok(sqlx::query_as::<_, Job>(&query)
            .bind(&job.client)
            .bind(&job.description)
            .bind(job.amount_paid)
            .bind(job.paid_to)
            .bind(job.worked_by)
            .bind(job.confirmation)
            .bind(job.has_paid)
            .bind(job.start_date)
            .bind(job.end_date)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_job(&self, id: i32) -> Result<Option<Job>, DatabaseError> {
        let query = format!("SELECT {} FROM jobs WHERE id = $1", JOB_COLUMNS);
        Ok(sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_jobs(&self) -> Result<Vec<Job>, DatabaseError> {
        let query = format!("SELECT {} FROM jobs ORDER BY id", JOB_COLUMNS);
        Ok(sqlx::query_as::<_, Job>(&query).fetch_all(&self.pool).await?)
    }

    async fn update_job(&self, id: i32, job: NewJob) -> Result<Option<Job>, DatabaseError> {
        let query = format!(
            "UPDATE jobs SET client = $2, description = $3, amount_paid = $4, paid_to = $5, \
             worked_by = $6, confirmation = $7, has_paid = $8, start_date = $9, end_date = $10 \
             WHERE id = $1 RETURNING {}",
            JOB_COLUMNS
        );
        Ok(sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .bind(&job.client)
            .bind(&job.description)
            .bind(job.amount_paid)
            .bind(job.paid_to)
            .bind(job.worked_by)
            .bind(job.confirmation)
            .bind(job.has_paid)
            .bind(job.start_date)
            .bind(job.end_date)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_job(&self, id: i32) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn jobs_overlapping(&self, window: DateWindow) -> Result<Vec<Job>, DatabaseError> {
        let query = format!(
            "SELECT {} FROM jobs WHERE end_date >= $1 AND start_date <= $2 ORDER BY id",
            JOB_COLUMNS
        );
        Ok(sqlx::query_as::<_, Job>(&query)
            .bind(window.start)
            .bind(window.end)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn create_one_time_expense(
        &self,
        expense: NewOneTimeExpense,
    ) -> Result<OneTimeExpense, DatabaseError> {
        let query = format!(
            "INSERT INTO one_time_expenses (merchant, description, amount_spent, date, paid_by, \
             tax_deductible, category) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            ONE_TIME_COLUMNS
        );
        Ok(sqlx::query_as::<_, OneTimeExpense>(&query)
            .bind(&expense.merchant)
            .bind(&expense.description)
            .bind(expense.amount_spent)
            .bind(expense.date)
            .bind(expense.paid_by)
            .bind(expense.tax_deductible)
            .bind(expense.category)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_one_time_expense(
        &self,
        id: i32,
    ) -> Result<Option<OneTimeExpense>, DatabaseError> {
        let query = format!(
            "SELECT {} FROM one_time_expenses WHERE id = $1",
            ONE_TIME_COLUMNS
        );
        Ok(sqlx::query_as::<_, OneTimeExpense>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_one_time_expenses(&self) -> Result<Vec<OneTimeExpense>, DatabaseError> {
        let query = format!(
            "SELECT {} FROM one_time_expenses ORDER BY id",
            ONE_TIME_COLUMNS
        );
        Ok(sqlx::query_as::<_, OneTimeExpense>(&query)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_one_time_expense(
        &self,
        id: i32,
        expense: NewOneTimeExpense,
    ) -> Result<Option<OneTimeExpense>, DatabaseError> {
        let query = format!(
            "UPDATE one_time_expenses SET merchant = $2, description = $3, amount_spent = $4, \
             date = $5, paid_by = $6, tax_deductible = $7, category = $8 \
             WHERE id = $1 RETURNING {}",
            ONE_TIME_COLUMNS
        );
        Ok(sqlx::query_as::<_, OneTimeExpense>(&query)
            .bind(id)
            .bind(&expense.merchant)
            .bind(&expense.description)
            .bind(expense.amount_spent)
            .bind(expense.date)
            .bind(expense.paid_by)
            .bind(expense.tax_deductible)
            .bind(expense.category)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_one_time_expense(&self, id: i32) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM one_time_expenses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn one_time_expenses_within(
        &self,
        window: DateWindow,
    ) -> Result<Vec<OneTimeExpense>, DatabaseError> {
        let query = format!(
            "SELECT {} FROM one_time_expenses WHERE date >= $1 AND date <= $2 ORDER BY id",
            ONE_TIME_COLUMNS
        );
        Ok(sqlx::query_as::<_, OneTimeExpense>(&query)
            .bind(window.start)
            .bind(window.end)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn create_recurring_expense(
        &self,
        expense: NewRecurringExpense,
    ) -> Result<RecurringExpense, DatabaseError> {
        let query = format!(
            "INSERT INTO recurring_expenses (merchant, description, amount, tax_deductible, \
             category, recurrence, paid_by, start_date, end_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
            RECURRING_COLUMNS
        );
        Ok(sqlx::query_as::<_, RecurringExpense>(&query)
            .bind(&expense.merchant)
            .bind(&expense.description)
            .bind(expense.amount)
            .bind(expense.tax_deductible)
            .bind(expense.category)
            .bind(expense.recurrence)
            .bind(expense.paid_by)
            .bind(expense.start_date)
            .bind(expense.end_date)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_recurring_expense(
        &self,
        id: i32,
    ) -> Result<Option<RecurringExpense>, DatabaseError> {
        let query = format!(
            "SELECT {} FROM recurring_expenses WHERE id = $1",
            RECURRING_COLUMNS
        );
        Ok(sqlx::query_as::<_, RecurringExpense>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_recurring_expenses(&self) -> Result<Vec<RecurringExpense>, DatabaseError> {
        let query = format!(
            "SELECT {} FROM recurring_expenses ORDER BY id",
            RECURRING_COLUMNS
        );
        Ok(sqlx::query_as::<_, RecurringExpense>(&query)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_recurring_expense(
        &self,
        id: i32,
        expense: NewRecurringExpense,
    ) -> Result<Option<RecurringExpense>, DatabaseError> {
        let query = format!(
            "UPDATE recurring_expenses SET merchant = $2, description = $3, amount = $4, \
             tax_deductible = $5, category = $6, recurrence = $7, paid_by = $8, \
             start_date = $9, end_date = $10 WHERE id = $1 RETURNING {}",
            RECURRING_COLUMNS
        );
        Ok(sqlx::query_as::<_, RecurringExpense>(&query)
            .bind(id)
            .bind(&expense.merchant)
            .bind(&expense.description)
            .bind(expense.amount)
            .bind(expense.tax_deductible)
            .bind(expense.category)
            .bind(expense.recurrence)
            .bind(expense.paid_by)
            .bind(expense.start_date)
            .bind(expense.end_date)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_recurring_expense(&self, id: i32) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM recurring_expenses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
