// handlers/jobs.rs - /admin/jobs handlers
// Reads are open; create, update and delete sit behind the user gate.

use axum::extract::{Path, State};
use serde_json::json;
use tracing::info;

use super::record_id;
use crate::database::models::{Confirmation, NewJob, PaidTo, WorkedBy};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Payload};
use crate::AppState;

const KIND: &str = "Job";

const REQUIRED: &[&str] = &[
    "client",
    "description",
    "amountPaid",
    "paidTo",
    "workedBy",
    "confirmation",
    "hasPaid",
    "startDate",
];

/// Validate in order: presence, options, amount, dates. Date ordering is left
/// to the store's constraint. `endDate` defaults to `startDate`.
fn job_from_payload(payload: &Payload) -> Result<NewJob, ApiError> {
    payload.require(REQUIRED)?;
    let client = payload.text("client")?;
    let description = payload.text("description")?;
    let has_paid = payload.flag("hasPaid")?;

    let paid_to: PaidTo = payload.option(PaidTo::FIELD)?;
    let worked_by: WorkedBy = payload.option(WorkedBy::FIELD)?;
    let confirmation: Confirmation = payload.option(Confirmation::FIELD)?;

    let amount_paid = payload.amount("amountPaid")?;

    let start_date = payload.date("startDate")?;
    let end_date = payload.optional_date("endDate")?.unwrap_or(start_date);

    Ok(NewJob {
        client,
        description,
        amount_paid,
        paid_to,
        worked_by,
        confirmation,
        has_paid,
        start_date,
        end_date,
    })
}

/**
 * POST /admin/jobs - Record a job
 *
 * Expected Input:
 * ```json
 * {
 *   "client": "Blue Note",
 *   "description": "Wedding reception",
 *   "amountPaid": 450,
 *   "paidTo": "Gladtime Audio",
 *   "workedBy": "Tyler and Meghan",
 *   "confirmation": "Confirmed",
 *   "hasPaid": false,
 *   "startDate": "2024-06-01",
 *   "endDate": "2024-06-02"      // Optional, defaults to startDate
 * }
 * ```
 */
pub async fn create(State(state): State<AppState>, payload: Payload) -> ApiResult {
    let job = state.store.create_job(job_from_payload(&payload)?).await?;
    info!("Created job {} for {}", job.id, job.client);

    Ok(ApiResponse::created()
        .message(format!("{} job was added!", job.client))
        .field("job", job))
}

pub async fn list(State(state): State<AppState>) -> ApiResult {
    let jobs = state.store.list_jobs().await?;
    Ok(ApiResponse::success().data(json!({ "jobs": jobs })))
}

pub async fn get(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult {
    let id = record_id(&raw_id, KIND)?;
    let job = state
        .store
        .find_job(id)
        .await?
        .ok_or_else(|| ApiError::not_found(KIND))?;
    Ok(ApiResponse::success().data(job))
}

/// POST /admin/jobs/:id - fields present in the body replace the stored ones
pub async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Payload,
) -> ApiResult {
    let id = record_id(&raw_id, KIND)?;
    let existing = state
        .store
        .find_job(id)
        .await?
        .ok_or_else(|| ApiError::not_found(KIND))?;

    let changes = job_from_payload(&payload.over(&existing)?)?;
    let job = state
        .store
        .update_job(id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found(KIND))?;
    info!("Updated job {}", job.id);

    Ok(ApiResponse::success()
        .message("Job updated successfully")
        .field("job", job))
}

pub async fn delete(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult {
    let id = record_id(&raw_id, KIND)?;
    if !state.store.delete_job(id).await? {
        return Err(ApiError::not_found(KIND));
    }
    info!("Deleted job {}", id);
    Ok(ApiResponse::success().message("Job deleted successfully"))
}
