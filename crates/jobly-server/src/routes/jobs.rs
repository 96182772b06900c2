//! `/jobs` endpoints.
//!
//! | Route              | Auth  | Success                  |
//! |--------------------|-------|--------------------------|
//! | `GET /jobs`        | none  | 200 `{ jobs: [...] }`    |
//! | `GET /jobs/{id}`   | none  | 200 job with its company |
//! | `POST /jobs`       | admin | 201 `{ job }`            |
//! | `PATCH /jobs/{id}` | admin | 200 `{ job }`            |
//! | `DELETE /jobs/{id}`| admin | 200 `{ deleted: id }`    |

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    routing::get,
};
use jobly_api::ApiError;
use jobly_auth::AdminAuth;
use jobly_storage::{Job, JobDetail, JobListing};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::server::AppState;
use crate::validation::{
    job_filter_from_query, job_update_from_body, new_job_from_body, parse_job_id,
};

#[derive(Debug, Serialize)]
pub struct JobsResponse {
    pub jobs: Vec<JobListing>,
}

#[derive(Debug, Serialize)]
pub struct JobResponse<T> {
    pub job: T,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: i32,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/jobs", get(list_jobs).post(create_job))
        .route(
            "/jobs/{id}",
            get(get_job).patch(update_job).delete(delete_job),
        )
}

fn job_id(path: Result<Path<String>, PathRejection>) -> Result<i32, ApiError> {
    let Path(raw) = path.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    parse_job_id(&raw)
}

fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

pub async fn list_jobs(
    State(state): State<AppState>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Result<Json<JobsResponse>, ApiError> {
    let Query(params) =
        query.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let filter = job_filter_from_query(&params)?;
    let jobs = state.storage.find_all(&filter).await?;
    Ok(Json(JobsResponse { jobs }))
}

pub async fn get_job(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<JobDetail>, ApiError> {
    let id = job_id(path)?;
    Ok(Json(state.storage.get(id).await?))
}

pub async fn create_job(
    State(state): State<AppState>,
    admin: AdminAuth,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<JobResponse<Job>>), ApiError> {
    let new_job = new_job_from_body(&json_body(body)?)?;
    let job = state.storage.create(&new_job).await?;
    info!(id = job.id, by = %admin.username, "Job created");
    Ok((StatusCode::CREATED, Json(JobResponse { job })))
}

pub async fn update_job(
    State(state): State<AppState>,
    admin: AdminAuth,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<JobResponse<Job>>, ApiError> {
    let id = job_id(path)?;
    let update = job_update_from_body(&json_body(body)?)?;
    let job = state.storage.update(id, &update).await?;
    info!(id, by = %admin.username, "Job updated");
    Ok(Json(JobResponse { job }))
}

pub async fn delete_job(
    State(state): State<AppState>,
    admin: AdminAuth,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let id = job_id(path)?;
    state.storage.remove(id).await?;
    info!(id, by = %admin.username, "Job deleted");
    Ok(Json(DeletedResponse { deleted: id }))
}
