use crate::analysis_cache::AnalysisCache;
use crate::analyzer::TextAnalyzer;
use crate::config::Config;
use crate::db_storage::FeedbackStorage;
use crate::errors::{AppError, ResultExt};
use crate::models::*;
use crate::report::{build_report, segment_summary};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Append-only feedback store.
    pub storage: FeedbackStorage,
    /// Application configuration.
    pub config: Config,
    /// Analysis pipeline, built once at startup.
    pub analyzer: TextAnalyzer,
    /// SHA-256 keyed cache of analysis results.
    pub analysis_cache: AnalysisCache,
}

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "feedback-insights-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /analyze
///
/// Analyzes a text without storing it.
#[utoipa::path(
    post,
    path = "/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Analysis of the text", body = AnalyzeResponse),
        (status = 400, description = "Missing or empty text"),
        (status = 502, description = "Sentiment classifier unavailable"),
        (status = 504, description = "Analysis timed out")
    )
)]
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    tracing::info!("POST /analyze - {} chars", req.text.len());

    let result = state
        .analysis_cache
        .get_or_analyze(&state.analyzer, &req.text)
        .await?;

    Ok(Json(AnalyzeResponse::from(&result)))
}

/// POST /feedback
///
/// Analyzes a feedback submission and stores it with its analysis.
#[utoipa::path(
    post,
    path = "/feedback",
    request_body = FeedbackCreate,
    responses(
        (status = 200, description = "Stored feedback with analysis", body = FeedbackResponse),
        (status = 400, description = "Missing or empty text"),
        (status = 500, description = "Feedback could not be stored")
    )
)]
pub async fn create_feedback(
    State(state): State<Arc<AppState>>,
    Json(submission): Json<FeedbackCreate>,
) -> Result<Json<FeedbackResponse>, AppError> {
    tracing::info!(
        "POST /feedback - customer: {:?}, service: {:?}",
        submission.customer_id,
        submission.service_type
    );

    let analysis = state
        .analysis_cache
        .get_or_analyze(&state.analyzer, &submission.text)
        .await?;

    let record = state
        .storage
        .insert(&NewFeedback::from_analysis(submission, &analysis))
        .await
        .context("Persisting analyzed feedback")?;

    Ok(Json(FeedbackResponse::from(&record)))
}

/// GET /feedback
///
/// Lists stored feedback in insertion order.
#[utoipa::path(
    get,
    path = "/feedback",
    params(RecordFilter),
    responses((status = 200, description = "Stored feedback", body = [FeedbackRecord]))
)]
pub async fn list_feedback(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<RecordFilter>,
) -> Result<Json<Vec<FeedbackRecord>>, AppError> {
    let records = load_filtered(&state, &filter).await?;
    tracing::info!("GET /feedback - {} records", records.len());
    Ok(Json(records))
}

/// GET /report
///
/// Aggregates all (optionally filtered) feedback into a report.
#[utoipa::path(
    get,
    path = "/report",
    params(RecordFilter),
    responses((status = 200, description = "Aggregated feedback report", body = Report))
)]
pub async fn get_report(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<RecordFilter>,
) -> Result<Json<Report>, AppError> {
    let records = load_filtered(&state, &filter).await?;
    let report = build_report(&records);

    tracing::info!(
        "GET /report - {} records, {} urgent, {} recommendations",
        report.totals.total_feedback,
        report.urgent_count,
        report.recommendations.len()
    );
    Ok(Json(report))
}

/// GET /report/segments/:dimension
///
/// Counts feedback per value of a demographic or analysis field.
#[utoipa::path(
    get,
    path = "/report/segments/{dimension}",
    params(
        ("dimension" = SegmentDimension, Path, description = "gender, age_group, location, service_type, sentiment or emotion"),
        RecordFilter
    ),
    responses(
        (status = 200, description = "Record count per segment value"),
        (status = 400, description = "Unknown dimension")
    )
)]
pub async fn get_segment_summary(
    State(state): State<Arc<AppState>>,
    Path(dimension): Path<String>,
    Query(filter): Query<RecordFilter>,
) -> Result<Json<BTreeMap<String, usize>>, AppError> {
    let dimension: SegmentDimension =
        serde_json::from_value(serde_json::Value::String(dimension.clone()))
            .map_err(|_| AppError::BadRequest(format!("Unknown segment dimension: {}", dimension)))?;

    let records = load_filtered(&state, &filter).await?;
    Ok(Json(segment_summary(&records, dimension)))
}

async fn load_filtered(
    state: &AppState,
    filter: &RecordFilter,
) -> Result<Vec<FeedbackRecord>, AppError> {
    let mut records = state.storage.list_all().await?;
    records.retain(|r| filter.matches(r));
    Ok(records)
}
