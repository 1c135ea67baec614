use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use job_board::workflows::applications::{application_router, ApplicationService, PhotoStore};
use job_board::workflows::candidates::{candidate_router, CandidateService};
use job_board::workflows::jobs::{job_router, JobService};
use job_board::workflows::store::{CandidateRepository, JobRepository};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_job_board_routes<J, C, P>(
    jobs: Arc<JobService<J>>,
    applications: Arc<ApplicationService<J, C, P>>,
    candidates: Arc<CandidateService<C>>,
) -> axum::Router
where
    J: JobRepository + 'static,
    C: CandidateRepository + 'static,
    P: PhotoStore + 'static,
{
    job_router(jobs)
        .merge(application_router(applications))
        .merge(candidate_router(candidates))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    // Cleared again while draining on shutdown.
    if state.readiness.load(std::sync::atomic::Ordering::Acquire) {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unavailable" })),
        )
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::InMemoryPhotoStore;
    use axum::body::Body;
    use axum::http::Request;
    use job_board::workflows::applications::FormEngine;
    use job_board::workflows::store::{InMemoryCandidateStore, InMemoryJobStore};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    fn app(ready: bool) -> axum::Router {
        let jobs = Arc::new(InMemoryJobStore::default());
        let candidates = Arc::new(InMemoryCandidateStore::default());
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };

        with_job_board_routes(
            Arc::new(JobService::new(jobs.clone())),
            Arc::new(ApplicationService::new(
                jobs,
                candidates.clone(),
                Arc::new(InMemoryPhotoStore::default()),
                FormEngine::default(),
            )),
            Arc::new(CandidateService::new(candidates)),
        )
        .layer(Extension(state))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn readiness_reflects_the_flag() {
        let response = app(false)
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = app(true)
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ready");
    }

    #[tokio::test]
    async fn published_job_serves_its_form_and_empty_grid() {
        let router = app(true);

        let response = router
            .clone()
            .oneshot(
                Request::post("/api/v1/jobs")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({
                            "title": "Frontend Developer",
                            "type": "Full Time",
                            "description": "Ship the careers page.",
                            "department": "Engineering",
                            "candidates_needed": 1,
                            "publish": true,
                        })
                        .to_string(),
                    ))
                    .expect("request"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::CREATED);
        let job = body_json(response).await;
        let job_id = job["id"].as_str().expect("job id").to_string();

        let response = router
            .clone()
            .oneshot(
                Request::get(format!("/api/v1/jobs/{job_id}/form"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["accepting_applications"], true);

        let response = router
            .oneshot(
                Request::get(format!("/api/v1/jobs/{job_id}/candidates"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
        let view = body_json(response).await;
        assert_eq!(view["page"]["total"], 0);
        assert_eq!(view["rows"].as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn readiness_flag_can_flip_after_startup() {
        let flag = Arc::new(AtomicBool::new(false));
        let state = AppState {
            readiness: flag.clone(),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        flag.store(true, Ordering::Release);

        let response = readiness_endpoint(Extension(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
