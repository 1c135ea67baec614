use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::json;

use super::grid::query::{SortConfig, SortDirection};
use super::grid::{GridQuery, PageSize};
use super::service::{CandidateService, CandidateServiceError};
use crate::workflows::jobs::domain::JobId;
use crate::workflows::store::CandidateRepository;

/// Router builder exposing the admin candidate grid.
pub fn candidate_router<C>(service: Arc<CandidateService<C>>) -> Router
where
    C: CandidateRepository + 'static,
{
    Router::new()
        .route("/api/v1/jobs/:job_id/candidates", get(list_handler::<C>))
        .route(
            "/api/v1/jobs/:job_id/candidates/export",
            get(export_handler::<C>),
        )
        .with_state(service)
}

/// Build a grid query from `sort`, `direction`, `page`, `page_size`,
/// `filter[key]` and comma-separated `columns` parameters.
pub fn parse_grid_query(params: &[(String, String)]) -> Result<GridQuery, String> {
    let mut query = GridQuery::default();
    let mut sort_key = None;
    let mut direction = SortDirection::Asc;

    for (name, value) in params {
        match name.as_str() {
            "sort" if !value.is_empty() => sort_key = Some(value.clone()),
            "sort" => {}
            "direction" => direction = value.parse()?,
            "page" => {
                let page = value
                    .parse::<usize>()
                    .map_err(|_| format!("page must be a positive integer, got '{value}'"))?;
                query.page = Some(page);
            }
            "page_size" => {
                let rows = value
                    .parse::<usize>()
                    .map_err(|_| format!("page_size must be an integer, got '{value}'"))?;
                let size = PageSize::try_from(rows).map_err(|err| err.to_string())?;
                query.page_size = Some(size);
            }
            "columns" => {
                query.columns = Some(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|key| !key.is_empty())
                        .map(str::to_string)
                        .collect(),
                );
            }
            other => {
                if let Some(key) = other
                    .strip_prefix("filter[")
                    .and_then(|rest| rest.strip_suffix(']'))
                {
                    query.filters.set(key, value);
                }
            }
        }
    }

    query.sort = sort_key.map(|key| SortConfig { key, direction });
    Ok(query)
}

fn bad_request(message: String) -> Response {
    let payload = json!({
        "error": message,
    });
    (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
}

pub(crate) async fn list_handler<C>(
    State(service): State<Arc<CandidateService<C>>>,
    Path(job_id): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response
where
    C: CandidateRepository + 'static,
{
    let query = match parse_grid_query(&params) {
        Ok(query) => query,
        Err(message) => return bad_request(message),
    };

    match service.view(&JobId(job_id), &query) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn export_handler<C>(
    State(service): State<Arc<CandidateService<C>>>,
    Path(job_id): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response
where
    C: CandidateRepository + 'static,
{
    let query = match parse_grid_query(&params) {
        Ok(query) => query,
        Err(message) => return bad_request(message),
    };

    let job_id = JobId(job_id);
    match service.export(&job_id, &query) {
        Ok(csv) => {
            let disposition = format!("attachment; filename=\"candidates-{job_id}.csv\"");
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                csv,
            )
                .into_response()
        }
        Err(err) => error_response(err),
    }
}

fn error_response(err: CandidateServiceError) -> Response {
    match err {
        CandidateServiceError::Grid(err) => bad_request(err.to_string()),
        other => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
