use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use super::seeded_store;
use crate::workflows::candidates::grid::query::SortDirection;
use crate::workflows::candidates::grid::PageSize;
use crate::workflows::candidates::router::parse_grid_query;
use crate::workflows::candidates::{candidate_router, CandidateService};

fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

fn router() -> axum::Router {
    candidate_router(Arc::new(CandidateService::new(Arc::new(seeded_store()))))
}

async fn get(uri: &str) -> axum::response::Response {
    router()
        .oneshot(Request::get(uri).body(Body::empty()).expect("request builds"))
        .await
        .expect("router responds")
}

#[test]
fn query_parameters_map_onto_a_grid_query() {
    let query = parse_grid_query(&params(&[
        ("sort", "email"),
        ("direction", "desc"),
        ("page", "2"),
        ("page_size", "25"),
        ("filter[domicile]", "jakarta"),
        ("filter[gender]", ""),
        ("columns", "full_name, email"),
    ]))
    .expect("valid query");

    let sort = query.sort.expect("sort set");
    assert_eq!(sort.key, "email");
    assert_eq!(sort.direction, SortDirection::Desc);
    assert_eq!(query.page, Some(2));
    assert_eq!(query.page_size, Some(PageSize::TwentyFive));
    assert_eq!(query.filters.get("domicile"), Some("jakarta"));
    assert_eq!(query.filters.len(), 1);
    assert_eq!(
        query.columns,
        Some(vec!["full_name".to_string(), "email".to_string()])
    );
}

#[test]
fn invalid_parameters_are_rejected() {
    assert!(parse_grid_query(&params(&[("page_size", "20")])).is_err());
    assert!(parse_grid_query(&params(&[("page", "two")])).is_err());
    assert!(parse_grid_query(&params(&[("direction", "sideways")])).is_err());
    assert!(parse_grid_query(&params(&[("sort", "")]))
        .expect("empty sort is ignored")
        .sort
        .is_none());
}

#[tokio::test]
async fn list_route_returns_grid_view() {
    let response = get(
        "/api/v1/jobs/job_20251019_0001/candidates?sort=email&filter%5Bdomicile%5D=jakarta",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    let view: Value = serde_json::from_slice(&body).expect("json body");

    assert_eq!(view["page"]["total"], 2);
    assert_eq!(view["page"]["page_size"], 10);
    assert_eq!(view["sort"]["direction"], "asc");
    assert_eq!(view["rows"][0]["cells"][2], "a@example.com");
    assert_eq!(view["columns"].as_array().map(Vec::len), Some(8));
}

#[tokio::test]
async fn list_route_rejects_bad_page_size() {
    let response = get("/api/v1/jobs/job_20251019_0001/candidates?page_size=7").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn export_route_serves_csv() {
    let response =
        get("/api/v1/jobs/job_20251019_0001/candidates/export?columns=full_name&sort=full_name")
            .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        Some("text/csv; charset=utf-8")
    );
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    assert_eq!(
        std::str::from_utf8(&body).expect("utf8"),
        "Nama Lengkap\nAyu Lestari\nBudi Santoso\nCitra Dewi\n"
    );
}
