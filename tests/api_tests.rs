/// HTTP route tests
/// Drives the router in-process against an in-memory store and the built-in
/// analysis providers
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use feedback_insights_api::analysis_cache::AnalysisCache;
use feedback_insights_api::analyzer::TextAnalyzer;
use feedback_insights_api::config::Config;
use feedback_insights_api::db::Database;
use feedback_insights_api::db_storage::FeedbackStorage;
use feedback_insights_api::handlers::AppState;
use feedback_insights_api::router::build_router;

async fn test_app() -> Router {
    let config = Config::default();
    let db = Database::new("sqlite::memory:").await.unwrap();
    let analyzer = TextAnalyzer::from_config(&config).unwrap();

    let state = Arc::new(AppState {
        storage: FeedbackStorage::new(db.pool.clone()),
        config,
        analyzer,
        analysis_cache: AnalysisCache::new(Duration::from_secs(60), 100),
    });
    build_router(state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn submit(app: &Router, body: Value) -> Value {
    let (status, value) = send(app, Method::POST, "/feedback", Some(body)).await;
    assert_eq!(status, StatusCode::OK, "unexpected response {}", value);
    value
}

#[tokio::test]
async fn health_reports_healthy() {
    let app = test_app().await;
    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn analyze_returns_full_analysis() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/analyze",
        Some(json!({ "text": "Great service, the staff were friendly and helpful!" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sentiment"], "Positive");
    assert_eq!(body["emotion"], "joy");
    assert_eq!(body["urgency"], false);

    let confidence = body["confidence"].as_f64().unwrap();
    assert!(confidence > 0.0 && confidence <= 1.0);
    let intensity = body["intensity"].as_f64().unwrap();
    assert!(intensity > 0.0 && intensity <= 1.0);
    assert!(body["keywords"].as_array().unwrap().len() <= 5);
}

#[tokio::test]
async fn analyze_flags_urgent_text() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/analyze",
        Some(json!({ "text": "Internet down since Monday, please fix ASAP" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["urgency"], true);
}

#[tokio::test]
async fn analyze_rejects_blank_text() {
    let app = test_app().await;
    let (status, body) = send(&app, Method::POST, "/analyze", Some(json!({ "text": "   " }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("non-empty"));
}

#[tokio::test]
async fn analyze_rejects_missing_text_field() {
    let app = test_app().await;
    let (status, _) = send(&app, Method::POST, "/analyze", Some(json!({ "body": "hi" }))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn create_feedback_assigns_increasing_ids() {
    let app = test_app().await;

    let first = submit(&app, json!({ "text": "Billing was terrible", "service_type": "Billing" })).await;
    let second = submit(&app, json!({ "text": "Support was great" })).await;

    let first_id = first["id"].as_i64().unwrap();
    let second_id = second["id"].as_i64().unwrap();
    assert!(first_id > 0);
    assert!(second_id > first_id);
    assert_eq!(first["sentiment"], "Negative");
    assert_eq!(second["sentiment"], "Positive");
}

#[tokio::test]
async fn create_feedback_rejects_blank_text_without_storing() {
    let app = test_app().await;

    let (status, _) = send(&app, Method::POST, "/feedback", Some(json!({ "text": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, listed) = send(&app, Method::GET, "/feedback", None).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn empty_report_is_all_zeros() {
    let app = test_app().await;
    let (status, body) = send(&app, Method::GET, "/report", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "totals": { "total_feedback": 0, "positive": 0, "negative": 0, "neutral": 0 },
            "by_service": {},
            "top_pain_points": [],
            "top_positives": [],
            "urgent_count": 0,
            "recommendations": []
        })
    );
}

#[tokio::test]
async fn report_aggregates_stored_feedback() {
    let app = test_app().await;

    submit(
        &app,
        json!({
            "text": "Terrible billing, the invoice was wrong again",
            "service_type": "Billing",
            "gender": "Female",
            "location": "Porto"
        }),
    )
    .await;
    submit(
        &app,
        json!({
            "text": "Great internet, fast and reliable",
            "service_type": "Internet",
            "gender": "Male",
            "location": "Lisbon"
        }),
    )
    .await;
    submit(
        &app,
        json!({ "text": "Router down since Monday, this is a bad outage", "location": "Lisbon" }),
    )
    .await;

    let (status, report) = send(&app, Method::GET, "/report", None).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(report["totals"]["total_feedback"], 3);
    assert_eq!(report["totals"]["positive"], 1);
    assert_eq!(report["totals"]["negative"], 2);
    assert_eq!(report["totals"]["neutral"], 0);
    assert!(report["totals"].get("other").is_none());

    assert_eq!(report["by_service"]["Billing"]["negative"], 1);
    assert_eq!(report["by_service"]["Internet"]["positive"], 1);
    assert_eq!(report["by_service"]["Unknown"]["negative"], 1);

    assert_eq!(report["urgent_count"], 1);
    let recommendations: Vec<&str> = report["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(recommendations.contains(&"Address 1 urgent customer complaints quickly."));

    let (_, filtered) = send(&app, Method::GET, "/report?location=Lisbon", None).await;
    assert_eq!(filtered["totals"]["total_feedback"], 2);
    assert!(filtered["by_service"].get("Billing").is_none());
}

#[tokio::test]
async fn list_feedback_filters_by_service_type() {
    let app = test_app().await;

    submit(&app, json!({ "text": "Billing portal is slow", "service_type": "Billing" })).await;
    submit(&app, json!({ "text": "Streaming works fine", "service_type": "Streaming" })).await;

    let (status, all) = send(&app, Method::GET, "/feedback", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, billing) = send(&app, Method::GET, "/feedback?service_type=Billing", None).await;
    let billing = billing.as_array().unwrap();
    assert_eq!(billing.len(), 1);
    assert_eq!(billing[0]["text"], "Billing portal is slow");
}

#[tokio::test]
async fn segment_summary_counts_per_value() {
    let app = test_app().await;

    submit(&app, json!({ "text": "Love the new plan", "gender": "Female" })).await;
    submit(&app, json!({ "text": "Fair pricing", "gender": "Female" })).await;
    submit(&app, json!({ "text": "Slow support line" })).await;

    let (status, body) = send(&app, Method::GET, "/report/segments/gender", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "Female": 2, "Unknown": 1 }));
}

#[tokio::test]
async fn segment_summary_rejects_unknown_dimension() {
    let app = test_app().await;
    let (status, body) = send(&app, Method::GET, "/report/segments/shoe_size", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("shoe_size"));
}

#[tokio::test]
async fn openapi_document_lists_routes() {
    let app = test_app().await;
    let (status, body) = send(&app, Method::GET, "/api-docs/openapi.json", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"].get("/analyze").is_some());
    assert!(body["paths"].get("/report").is_some());
}
