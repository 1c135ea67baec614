use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::applications::SubmissionError;
use crate::workflows::candidates::CandidateServiceError;
use crate::workflows::jobs::JobError;
use crate::workflows::store::RepositoryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Storage(RepositoryError),
    Jobs(JobError),
    Applications(SubmissionError),
    Candidates(CandidateServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Storage(err) => write!(f, "storage error: {}", err),
            AppError::Jobs(err) => write!(f, "job error: {}", err),
            AppError::Applications(err) => write!(f, "application error: {}", err),
            AppError::Candidates(err) => write!(f, "candidate error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Storage(err) => Some(err),
            AppError::Jobs(err) => Some(err),
            AppError::Applications(err) => Some(err),
            AppError::Candidates(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Jobs(JobError::NotFound(_))
            | AppError::Applications(SubmissionError::JobNotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Jobs(JobError::Invalid(_))
            | AppError::Applications(SubmissionError::Rejected(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Jobs(JobError::InvalidTransition { .. })
            | AppError::Applications(SubmissionError::JobClosed { .. }) => StatusCode::CONFLICT,
            AppError::Applications(SubmissionError::UploadFailed(_)) => StatusCode::BAD_GATEWAY,
            AppError::Applications(SubmissionError::Cancelled) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Jobs(JobError::UnknownField(_))
            | AppError::Candidates(CandidateServiceError::Grid(_))
            | AppError::Candidates(CandidateServiceError::Csv(_)) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Storage(_)
            | AppError::Jobs(_)
            | AppError::Applications(_)
            | AppError::Candidates(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<RepositoryError> for AppError {
    fn from(value: RepositoryError) -> Self {
        Self::Storage(value)
    }
}

impl From<JobError> for AppError {
    fn from(value: JobError) -> Self {
        Self::Jobs(value)
    }
}

impl From<SubmissionError> for AppError {
    fn from(value: SubmissionError) -> Self {
        Self::Applications(value)
    }
}

impl From<CandidateServiceError> for AppError {
    fn from(value: CandidateServiceError) -> Self {
        Self::Candidates(value)
    }
}
