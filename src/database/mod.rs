pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;
use models::{
    DateWindow, Job, NewJob, NewOneTimeExpense, NewRecurringExpense, NewUser, OneTimeExpense,
    RecurringExpense, User,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

// Constraint names shared by the SQL schema and the in-memory store
pub const USERS_USERNAME_KEY: &str = "users_username_key";
pub const USERS_EMAIL_KEY: &str = "users_email_key";
pub const JOBS_DATE_ORDER: &str = "jobs_date_order";
pub const JOBS_AMOUNT_PAID_NONNEGATIVE: &str = "jobs_amount_paid_nonnegative";
pub const RECURRING_EXPENSES_DATE_ORDER: &str = "recurring_expenses_date_order";

/// Column widths from `schema.sql`: `VARCHAR(128)` identities, `NUMERIC(12, 2)` amounts
pub const MAX_IDENTITY_LEN: usize = 128;

/// Largest value a `NUMERIC(12, 2)` amount column holds
pub fn max_amount() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

// SQLSTATE classes for values that do not fit their column
const STRING_DATA_RIGHT_TRUNCATION: &str = "22001";
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error("Unsupported database scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Check constraint violated: {0}")]
    CheckViolation(String),

    #[error("Value does not fit its column: {0}")]
    OutOfRange(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or_default().to_string();
            if db_err.is_unique_violation() {
                return DatabaseError::UniqueViolation(constraint);
            }
            if db_err.is_check_violation() {
                return DatabaseError::CheckViolation(constraint);
            }
            if let Some(code) = db_err.code() {
                if code == STRING_DATA_RIGHT_TRUNCATION || code == NUMERIC_VALUE_OUT_OF_RANGE {
                    return DatabaseError::OutOfRange(db_err.message().to_string());
                }
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Persistence for every record kind. Lists are ordered by ascending id.
/// `update_*` and `delete_*` report an absent row as `None` / `false`.
#[async_trait]
pub trait Store: Send + Sync {
    async fn create_schema(&self) -> Result<(), DatabaseError>;
    async fn drop_schema(&self) -> Result<(), DatabaseError>;
    async fn health_check(&self) -> Result<(), DatabaseError>;

    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError>;
    async fn find_user(&self, id: i32) -> Result<Option<User>, DatabaseError>;
    /// Matches either the username or the email address
    async fn find_user_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<User>, DatabaseError>;
    async fn list_users(&self) -> Result<Vec<User>, DatabaseError>;
    async fn set_admin(
        &self,
        username: &str,
        is_admin: bool,
    ) -> Result<Option<User>, DatabaseError>;

    async fn create_job(&self, job: NewJob) -> Result<Job, DatabaseError>;
    async fn find_job(&self, id: i32) -> Result<Option<Job>, DatabaseError>;
    async fn list_jobs(&self) -> Result<Vec<Job>, DatabaseError>;
    async fn update_job(&self, id: i32, job: NewJob) -> Result<Option<Job>, DatabaseError>;
    async fn delete_job(&self, id: i32) -> Result<bool, DatabaseError>;
    async fn jobs_overlapping(&self, window: DateWindow) -> Result<Vec<Job>, DatabaseError>;

    async fn create_one_time_expense(
        &self,
        expense: NewOneTimeExpense,
    ) -> Result<OneTimeExpense, DatabaseError>;
    async fn find_one_time_expense(&self, id: i32) -> Result<Option<OneTimeExpense>, DatabaseError>;
    async fn list_one_time_expenses(&self) -> Result<Vec<OneTimeExpense>, DatabaseError>;
    async fn update_one_time_expense(
        &self,
        id: i32,
        expense: NewOneTimeExpense,
    ) -> Result<Option<OneTimeExpense>, DatabaseError>;
    async fn delete_one_time_expense(&self, id: i32) -> Result<bool, DatabaseError>;
    async fn one_time_expenses_within(
        &self,
        window: DateWindow,
    ) -> Result<Vec<OneTimeExpense>, DatabaseError>;

    async fn create_recurring_expense(
        &self,
        expense: NewRecurringExpense,
    ) -> Result<RecurringExpense, DatabaseError>;
    async fn find_recurring_expense(
        &self,
        id: i32,
    ) -> Result<Option<RecurringExpense>, DatabaseError>;
    async fn list_recurring_expenses(&self) -> Result<Vec<RecurringExpense>, DatabaseError>;
    async fn update_recurring_expense(
        &self,
        id: i32,
        expense: NewRecurringExpense,
    ) -> Result<Option<RecurringExpense>, DatabaseError>;
    async fn delete_recurring_expense(&self, id: i32) -> Result<bool, DatabaseError>;
}

/// Open the store named by `config.url`: `postgres://` / `postgresql://` for
/// PostgreSQL, `memory:` for a fresh in-process store.
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn Store>, DatabaseError> {
    let url = url::Url::parse(&config.url)
        .map_err(|e| DatabaseError::InvalidDatabaseUrl(e.to_string()))?;

    match url.scheme() {
        "memory" => {
            info!("Using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
        "postgres" | "postgresql" => {
            let store = PgStore::connect(
                url.as_str(),
                config.max_connections,
                Duration::from_secs(config.connection_timeout),
            )
            .await?;
            info!(
                "Connected to PostgreSQL at {}{}",
                url.host_str().unwrap_or("localhost"),
                url.path()
            );
            Ok(Arc::new(store))
        }
        other => Err(DatabaseError::UnsupportedScheme(other.to_string())),
    }
}
