use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{JobId, JobPatch, JobStatus};
use super::service::{JobDraft, JobError, JobService};
use crate::workflows::store::{JobRepository, RepositoryError};

/// Body for `POST /api/v1/jobs`. `publish: false` saves a draft.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateJobRequest {
    #[serde(flatten)]
    pub draft: JobDraft,
    #[serde(default)]
    pub publish: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusRequest {
    pub status: JobStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListJobsParams {
    pub status: Option<String>,
}

/// Router builder exposing job administration endpoints.
pub fn job_router<J>(service: Arc<JobService<J>>) -> Router
where
    J: JobRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/jobs",
            post(create_handler::<J>).get(list_handler::<J>),
        )
        .route(
            "/api/v1/jobs/:job_id",
            get(get_handler::<J>)
                .patch(update_handler::<J>)
                .delete(delete_handler::<J>),
        )
        .route("/api/v1/jobs/:job_id/status", post(status_handler::<J>))
        .with_state(service)
}

pub(crate) async fn create_handler<J>(
    State(service): State<Arc<JobService<J>>>,
    axum::Json(request): axum::Json<CreateJobRequest>,
) -> Response
where
    J: JobRepository + 'static,
{
    let result = if request.publish {
        service.publish(request.draft, None)
    } else {
        service.save_draft(request.draft, None)
    };

    match result {
        Ok(job) => (StatusCode::CREATED, axum::Json(job)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_handler<J>(
    State(service): State<Arc<JobService<J>>>,
    Query(params): Query<ListJobsParams>,
) -> Response
where
    J: JobRepository + 'static,
{
    let status = match params.status.as_deref().map(str::parse::<JobStatus>).transpose() {
        Ok(status) => status,
        Err(message) => {
            let payload = json!({
                "error": message,
            });
            return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
        }
    };

    match service.list(status) {
        Ok(jobs) => (StatusCode::OK, axum::Json(jobs)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn get_handler<J>(
    State(service): State<Arc<JobService<J>>>,
    Path(job_id): Path<String>,
) -> Response
where
    J: JobRepository + 'static,
{
    match service.get(&JobId(job_id)) {
        Ok(job) => (StatusCode::OK, axum::Json(job)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn update_handler<J>(
    State(service): State<Arc<JobService<J>>>,
    Path(job_id): Path<String>,
    axum::Json(patch): axum::Json<JobPatch>,
) -> Response
where
    J: JobRepository + 'static,
{
    match service.update(&JobId(job_id), patch) {
        Ok(job) => (StatusCode::OK, axum::Json(job)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn delete_handler<J>(
    State(service): State<Arc<JobService<J>>>,
    Path(job_id): Path<String>,
) -> Response
where
    J: JobRepository + 'static,
{
    match service.delete(&JobId(job_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn status_handler<J>(
    State(service): State<Arc<JobService<J>>>,
    Path(job_id): Path<String>,
    axum::Json(request): axum::Json<StatusRequest>,
) -> Response
where
    J: JobRepository + 'static,
{
    match service.set_status(&JobId(job_id), request.status) {
        Ok(job) => (StatusCode::OK, axum::Json(job)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: JobError) -> Response {
    match err {
        JobError::Invalid(errors) => {
            let payload = json!({
                "error": "job is incomplete",
                "fields": errors,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        JobError::NotFound(job_id) => {
            let payload = json!({
                "error": "job not found",
                "job_id": job_id,
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        JobError::InvalidTransition { from, to } => {
            let payload = json!({
                "error": "status change not allowed",
                "from": from,
                "to": to,
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        JobError::UnknownField(key) => {
            let payload = json!({
                "error": format!("unknown form field '{key}'"),
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        JobError::Repository(RepositoryError::Conflict) => {
            let payload = json!({
                "error": "job already exists",
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        other => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
