use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::Deserialize;
use serde_json::json;

use super::engine::FormValues;
use super::photo::{PhotoStore, PhotoUpload};
use super::service::{ApplicationService, ApplicationSubmission, SubmissionError};
use crate::workflows::jobs::domain::JobId;
use crate::workflows::store::{CandidateRepository, JobRepository};

/// JSON body for `POST /api/v1/jobs/:job_id/applications`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationRequest {
    #[serde(default)]
    pub values: FormValues,
    #[serde(default)]
    pub photo: Option<PhotoPayload>,
}

/// Photo captured by the applicant, base64 encoded.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoPayload {
    pub file_name: String,
    pub content_type: String,
    pub data: String,
}

impl PhotoPayload {
    fn decode(self) -> Result<PhotoUpload, base64::DecodeError> {
        let bytes = BASE64.decode(self.data.trim())?;
        Ok(PhotoUpload::new(self.file_name, self.content_type, bytes))
    }
}

/// Router builder exposing the applicant-facing form endpoints.
pub fn application_router<J, C, P>(service: Arc<ApplicationService<J, C, P>>) -> Router
where
    J: JobRepository + 'static,
    C: CandidateRepository + 'static,
    P: PhotoStore + 'static,
{
    Router::new()
        .route("/api/v1/jobs/:job_id/form", get(form_handler::<J, C, P>))
        .route(
            "/api/v1/jobs/:job_id/applications",
            post(submit_handler::<J, C, P>),
        )
        .with_state(service)
}

pub(crate) async fn form_handler<J, C, P>(
    State(service): State<Arc<ApplicationService<J, C, P>>>,
    Path(job_id): Path<String>,
) -> Response
where
    J: JobRepository + 'static,
    C: CandidateRepository + 'static,
    P: PhotoStore + 'static,
{
    match service.form(&JobId(job_id)) {
        Ok(form) => (StatusCode::OK, axum::Json(form)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn submit_handler<J, C, P>(
    State(service): State<Arc<ApplicationService<J, C, P>>>,
    Path(job_id): Path<String>,
    axum::Json(request): axum::Json<ApplicationRequest>,
) -> Response
where
    J: JobRepository + 'static,
    C: CandidateRepository + 'static,
    P: PhotoStore + 'static,
{
    let photo = match request.photo.map(PhotoPayload::decode).transpose() {
        Ok(photo) => photo,
        Err(err) => {
            let payload = json!({
                "error": format!("photo data is not valid base64: {err}"),
            });
            return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
        }
    };

    let submission = ApplicationSubmission {
        values: request.values,
        photo,
    };
    let cancel = service.shutdown_token().child_token();

    match service.submit(&JobId(job_id), submission, &cancel).await {
        Ok(candidate) => (StatusCode::CREATED, axum::Json(candidate)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: SubmissionError) -> Response {
    match err {
        SubmissionError::Rejected(errors) => {
            let payload = json!({
                "error": "validation failed",
                "fields": errors,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        SubmissionError::JobNotFound(job_id) => {
            let payload = json!({
                "error": "job not found",
                "job_id": job_id,
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        SubmissionError::JobClosed { job_id, status } => {
            let payload = json!({
                "error": "job is not accepting applications",
                "job_id": job_id,
                "status": status,
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        SubmissionError::UploadFailed(err) => {
            let payload = json!({
                "error": err.to_string(),
            });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
        SubmissionError::Cancelled => {
            let payload = json!({
                "error": "submission cancelled",
            });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
        other => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
