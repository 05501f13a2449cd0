use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use tower::ServiceExt;

use super::common::*;
use crate::recommendation::repository::RerunPolicy;
use crate::recommendation::RecommendationService;

const PATH: &str = "/api/v1/recommendations/youth-01/resp-1";

fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn post_runs_recommendations() {
    let (service, repository) = build_service(RerunPolicy::Replace);
    let router = router_with_service(service);

    let response = router
        .oneshot(request(Method::POST, PATH))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert_eq!(body["run"], 1);
    assert_eq!(body["stored_rows"], 9);
    assert_eq!(body["key"]["user_id"], "youth-01");
    assert_eq!(body["regions"][0]["region_code"], SEOUL);
    assert_eq!(repository.all_rows(&key()).len(), 9);
}

#[tokio::test]
async fn get_returns_grouped_view() {
    let (service, _) = build_service(RerunPolicy::Replace);
    service.recompute(&key()).expect("run");
    let router = router_with_service(service);

    let response = router
        .oneshot(request(Method::GET, PATH))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    let groups = body.as_array().expect("group list");
    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0]["region_display_name"], "Seoul");
    assert_eq!(groups[0]["policies"][0]["rank"], 1);
    assert_eq!(
        groups[0]["policies"][0]["policy"]["policy_code"],
        "P-SEOUL-JOB"
    );
    assert!(groups[1].get("region_description").is_none());
}

#[tokio::test]
async fn unknown_response_is_not_found() {
    let (service, _) = build_service(RerunPolicy::Replace);
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(request(Method::GET, "/api/v1/recommendations/ghost/resp-9"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = router
        .oneshot(request(Method::POST, "/api/v1/recommendations/ghost/resp-9"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("ghost"));
}

#[tokio::test]
async fn reasons_use_username_query() {
    let (service, _) = build_service(RerunPolicy::Replace);
    service.recompute(&key()).expect("run");
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(request(Method::GET, &format!("{PATH}/reasons?username=minji")))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body[0]["username"], "minji");
    assert_eq!(body[0]["reasons"].as_array().map(Vec::len), Some(4));

    let response = router
        .oneshot(request(Method::GET, &format!("{PATH}/reasons")))
        .await
        .expect("response");
    let body = read_json_body(response).await;
    assert_eq!(body[0]["username"], "youth-01");
}

#[tokio::test]
async fn repository_outage_is_service_unavailable() {
    let service = RecommendationService::with_engine(
        Arc::new(MemorySurveys::with(key(), default_survey())),
        Arc::new(UnavailableRepository),
        Arc::new(catalog()),
        engine(),
        RerunPolicy::Replace,
        4,
    );
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(request(Method::POST, PATH))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("database offline"));

    let response = router
        .oneshot(request(Method::GET, PATH))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
