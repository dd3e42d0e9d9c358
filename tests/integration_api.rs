#![cfg(feature = "api")]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use tower::util::ServiceExt;

use rate_impact_sim::api::{AppState, router};
use rate_impact_sim::config::StudyConfig;

fn app(study: StudyConfig) -> axum::Router {
    router(Arc::new(AppState::from_study(study)))
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

async fn json_body(resp: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

#[tokio::test]
async fn defaults_reflect_server_study() {
    let resp = app(StudyConfig::pjm())
        .oneshot(
            Request::builder()
                .uri("/defaults")
                .body(Body::empty())
                .expect("request should build"),
        )
        .await
        .expect("request should complete");
    assert_eq!(resp.status(), StatusCode::OK);

    let json = json_body(resp).await;
    assert_eq!(json["utility"]["market_type"], "iso-capacity-market");
    assert_eq!(json["data_center"]["capacity_mw"], 1500.0);
}

#[tokio::test]
async fn defaults_round_trip_into_summary() {
    let study = StudyConfig::ercot();
    let body = serde_json::json!({
        "utility": study.utility,
        "data_center": study.data_center,
        "years": 15,
    });
    let resp = app(StudyConfig::regulated())
        .oneshot(post_json("/summary", body))
        .await
        .expect("request should complete");
    assert_eq!(resp.status(), StatusCode::OK);

    let json = json_body(resp).await;
    assert_eq!(json["trajectories"]["firm"].as_array().map(Vec::len), Some(16));
    let firm = json["summary"]["final_year_bills"]["firm"]
        .as_f64()
        .expect("firm final bill");
    let dispatchable = json["summary"]["final_year_bills"]["dispatchable"]
        .as_f64()
        .expect("dispatchable final bill");
    assert!(dispatchable <= firm);
}

#[tokio::test]
async fn out_of_range_years_rejected() {
    let resp = app(StudyConfig::regulated())
        .oneshot(post_json("/trajectories", serde_json::json!({"years": 31})))
        .await
        .expect("request should complete");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let json = json_body(resp).await;
    assert_eq!(json["field"], "projection.years");
}

#[tokio::test]
async fn onsite_above_capacity_rejected() {
    let body = serde_json::json!({
        "data_center": {"capacity_mw": 100.0, "onsite_generation_mw": 150.0}
    });
    let resp = app(StudyConfig::regulated())
        .oneshot(post_json("/summary", body))
        .await
        .expect("request should complete");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let json = json_body(resp).await;
    assert_eq!(json["field"], "data_center.onsite_generation_mw");
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request should build")
}

#[tokio::test]
async fn utility_catalog_listed() {
    let resp = app(StudyConfig::regulated())
        .oneshot(get("/utilities"))
        .await
        .expect("request should complete");
    assert_eq!(resp.status(), StatusCode::OK);

    let json = json_body(resp).await;
    let entries = json.as_array().expect("catalog array");
    assert_eq!(entries.len(), 14);
    assert_eq!(entries[0]["id"], "pso-oklahoma");
    assert_eq!(entries[0]["market"]["kind"], "spp");
}

#[tokio::test]
async fn utility_study_feeds_summary() {
    let resp = app(StudyConfig::regulated())
        .oneshot(get("/utilities/dominion-virginia"))
        .await
        .expect("request should complete");
    assert_eq!(resp.status(), StatusCode::OK);
    let study = json_body(resp).await;
    assert_eq!(study["utility"]["market_type"], "iso-capacity-market");

    let body = serde_json::json!({
        "utility": study["utility"],
        "data_center": study["data_center"],
        "years": 20,
    });
    let resp = app(StudyConfig::regulated())
        .oneshot(post_json("/summary", body))
        .await
        .expect("request should complete");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_utility_is_404() {
    let resp = app(StudyConfig::regulated())
        .oneshot(get("/utilities/nope"))
        .await
        .expect("request should complete");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let json = json_body(resp).await;
    assert_eq!(json["field"], "utility_id");
}

#[tokio::test]
async fn unknown_route_is_404() {
    let resp = app(StudyConfig::regulated())
        .oneshot(
            Request::builder()
                .uri("/nope")
                .body(Body::empty())
                .expect("request should build"),
        )
        .await
        .expect("request should complete");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
