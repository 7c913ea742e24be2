use crate::handlers::{self, AppState};
use crate::models::*;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Feedback Insights API",
        description = "Sentiment, emotion, urgency and keyword analysis of customer feedback"
    ),
    paths(
        handlers::health,
        handlers::analyze,
        handlers::create_feedback,
        handlers::list_feedback,
        handlers::get_report,
        handlers::get_segment_summary,
    ),
    components(schemas(
        AnalyzeRequest,
        AnalyzeResponse,
        FeedbackCreate,
        FeedbackResponse,
        FeedbackRecord,
        Report,
        ReportTotals,
        SentimentCounts,
        SegmentDimension,
        Sentiment,
        Emotion,
    ))
)]
pub struct ApiDoc;

/// Serves the generated OpenAPI document as JSON.
async fn serve_openapi_spec() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// Serves a Swagger UI page pointed at `/api-docs/openapi.json`.
async fn serve_swagger_ui() -> impl IntoResponse {
    let html = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Feedback Insights API - Swagger UI</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        body { margin: 0; padding: 0; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = function() {
            window.ui = SwaggerUIBundle({
                url: "/api-docs/openapi.json",
                dom_id: '#swagger-ui',
                deepLinking: true
            });
        };
    </script>
</body>
</html>
"#;
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
}

/// CORS from configured origins; `*` (or no valid origin) falls back to permissive.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", o);
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Application routes (API endpoints, docs and health) with tracing and CORS.
///
/// Rate limiting and body limits are layered on by the server binary.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/docs", get(serve_swagger_ui))
        .route("/api-docs/openapi.json", get(serve_openapi_spec))
        .route("/analyze", post(handlers::analyze))
        .route(
            "/feedback",
            post(handlers::create_feedback).get(handlers::list_feedback),
        )
        .route("/report", get(handlers::get_report))
        .route(
            "/report/segments/:dimension",
            get(handlers::get_segment_summary),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
