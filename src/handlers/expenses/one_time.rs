use axum::extract::{Path, State};
use serde_json::json;
use tracing::info;

use super::KIND;
use crate::database::models::{Category, NewOneTimeExpense, PaidBy};
use crate::error::ApiError;
use crate::handlers::record_id;
use crate::middleware::{ApiResponse, ApiResult, Payload};
use crate::AppState;

const REQUIRED: &[&str] = &[
    "merchant",
    "description",
    "amountSpent",
    "date",
    "paidBy",
    "taxDeductible",
    "category",
];

fn expense_from_payload(payload: &Payload) -> Result<NewOneTimeExpense, ApiError> {
    payload.require(REQUIRED)?;
    let merchant = payload.text("merchant")?;
    let description = payload.text("description")?;
    let tax_deductible = payload.flag("taxDeductible")?;

    let paid_by: PaidBy = payload.option(PaidBy::FIELD)?;
    let category: Category = payload.option(Category::FIELD)?;

    let amount_spent = payload.amount("amountSpent")?;
    let date = payload.date("date")?;

    Ok(NewOneTimeExpense {
        merchant,
        description,
        amount_spent,
        date,
        paid_by,
        tax_deductible,
        category,
    })
}

pub async fn create(State(state): State<AppState>, payload: Payload) -> ApiResult {
    let expense = state
        .store
        .create_one_time_expense(expense_from_payload(&payload)?)
        .await?;
    info!("Created one-time expense {} at {}", expense.id, expense.merchant);

    Ok(ApiResponse::created()
        .message(format!("{} expense was added!", expense.merchant))
        .field("expense", expense))
}

pub async fn list(State(state): State<AppState>) -> ApiResult {
    let expenses = state.store.list_one_time_expenses().await?;
    Ok(ApiResponse::success().data(json!({ "one-time-expenses": expenses })))
}

pub async fn get(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult {
    let id = record_id(&raw_id, KIND)?;
    let expense = state
        .store
        .find_one_time_expense(id)
        .await?
        .ok_or_else(|| ApiError::not_found(KIND))?;
    Ok(ApiResponse::success().data(expense))
}

pub async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Payload,
) -> ApiResult {
    let id = record_id(&raw_id, KIND)?;
    let existing = state
        .store
        .find_one_time_expense(id)
        .await?
        .ok_or_else(|| ApiError::not_found(KIND))?;

    let changes = expense_from_payload(&payload.over(&existing)?)?;
    let expense = state
        .store
        .update_one_time_expense(id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found(KIND))?;

    Ok(ApiResponse::success()
        .message("Expense updated successfully")
        .field("expense", expense))
}

pub async fn delete(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult {
    let id = record_id(&raw_id, KIND)?;
    if !state.store.delete_one_time_expense(id).await? {
        return Err(ApiError::not_found(KIND));
    }
    info!("Deleted one-time expense {}", id);
    Ok(ApiResponse::success().message("Expense deleted successfully"))
}
