use axum::extract::{Path, State};
use serde_json::json;
use tracing::info;

use super::KIND;
use crate::database::models::{Category, NewRecurringExpense, PaidBy, Recurrence};
use crate::error::ApiError;
use crate::handlers::record_id;
use crate::middleware::{ApiResponse, ApiResult, Payload};
use crate::AppState;

const REQUIRED: &[&str] = &[
    "merchant",
    "description",
    "amount",
    "taxDeductible",
    "category",
    "recurrence",
    "paidBy",
    "startDate",
];

/// `endDate` is optional; an open-ended expense recurs indefinitely.
fn expense_from_payload(payload: &Payload) -> Result<NewRecurringExpense, ApiError> {
    payload.require(REQUIRED)?;
    let merchant = payload.text("merchant")?;
    let description = payload.text("description")?;
    let tax_deductible = payload.flag("taxDeductible")?;

    let category: Category = payload.option(Category::FIELD)?;
    let recurrence: Recurrence = payload.option(Recurrence::FIELD)?;
    let paid_by: PaidBy = payload.option(PaidBy::FIELD)?;

    let amount = payload.amount("amount")?;

    let start_date = payload.date("startDate")?;
    let end_date = payload.optional_date("endDate")?;

    Ok(NewRecurringExpense {
        merchant,
        description,
        amount,
        tax_deductible,
        category,
        recurrence,
        paid_by,
        start_date,
        end_date,
    })
}

pub async fn create(State(state): State<AppState>, payload: Payload) -> ApiResult {
    let expense = state
        .store
        .create_recurring_expense(expense_from_payload(&payload)?)
        .await?;
    info!("Created recurring expense {} at {}", expense.id, expense.merchant);

    Ok(ApiResponse::created()
        .message(format!("{} recurring expense was added!", expense.merchant))
        .field("expense", expense))
}

pub async fn list(State(state): State<AppState>) -> ApiResult {
    let expenses = state.store.list_recurring_expenses().await?;
    Ok(ApiResponse::success().data(json!({ "recurring-expenses": expenses })))
}

pub async fn get(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult {
    let id = record_id(&raw_id, KIND)?;
    let expense = state
        .store
        .find_recurring_expense(id)
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
        .find_recurring_expense(id)
        .await?
        .ok_or_else(|| ApiError::not_found(KIND))?;

    let changes = expense_from_payload(&payload.over(&existing)?)?;
    let expense = state
        .store
        .update_recurring_expense(id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found(KIND))?;

    Ok(ApiResponse::success()
        .message("Expense updated successfully")
        .field("expense", expense))
}

pub async fn delete(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult {
    let id = record_id(&raw_id, KIND)?;
    if !state.store.delete_recurring_expense(id).await? {
        return Err(ApiError::not_found(KIND));
    }
    info!("Deleted recurring expense {}", id);
    Ok(ApiResponse::success().message("Expense deleted successfully"))
}
