//! Customer Feedback Insights API Library
//!
//! Turns free-text customer feedback into sentiment, emotion, urgency and
//! keyword signals, stores the analyzed records and aggregates them into
//! per-service reports with recommendations.
//!
//! # Modules
//!
//! - `api`: HTTP-facing components.
//! - `core`: Analysis and reporting logic.
//! - `integrations`: Hosted classification model clients.
//! - `analysis_cache`: SHA-256 keyed cache of analysis results.
//! - `analyzer`: Text analysis pipeline.
//! - `circuit_breaker`: Circuit breaker for hosted model calls.
//! - `config`: Configuration management.
//! - `db`: Database connection and schema setup.
//! - `db_storage`: Append-only feedback store.
//! - `emotion`: Emotion classification.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `keywords`: Statistical keyword extraction.
//! - `models`: Core data models.
//! - `report`: Report aggregation.
//! - `router`: Route table, CORS and OpenAPI document.
//! - `sentiment`: Sentiment classification.
//! - `services`: Hosted model clients.
//! - `urgency`: Urgency pattern detection.

pub mod api;
pub mod core;
pub mod integrations;

pub mod analysis_cache;
pub mod analyzer;
pub mod circuit_breaker;
pub mod config;
pub mod db;
pub mod db_storage;
pub mod emotion;
pub mod errors;
pub mod handlers;
pub mod keywords;
pub mod models;
pub mod report;
pub mod router;
pub mod sentiment;
pub mod services;
pub mod urgency;
