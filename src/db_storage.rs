use crate::errors::{AppError, ResultExt};
use crate::models::{FeedbackRecord, NewFeedback};
use sqlx::types::Json;
use sqlx::SqlitePool;

/// Append-only store of analyzed feedback.
///
/// Ids come from SQLite `AUTOINCREMENT`, so they are strictly increasing and
/// never reused. There are no update or delete operations.
#[derive(Clone)]
pub struct FeedbackStorage {
    pool: SqlitePool,
}

impl FeedbackStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persists `feedback` in a transaction and returns it with its new id.
    pub async fn insert(&self, feedback: &NewFeedback) -> Result<FeedbackRecord, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Starting feedback insert transaction")?;

        let record = sqlx::query_as::<_, FeedbackRecord>(
            r#"
            INSERT INTO feedback (
                customer_id, name, age_group, gender, location, tenure_months,
                service_type, text, sentiment, confidence, intensity, keywords,
                urgency, emotion, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&feedback.customer_id)
        .bind(&feedback.name)
        .bind(&feedback.age_group)
        .bind(&feedback.gender)
        .bind(&feedback.location)
        .bind(feedback.tenure_months)
        .bind(&feedback.service_type)
        .bind(&feedback.text)
        .bind(&feedback.sentiment)
        .bind(feedback.confidence)
        .bind(feedback.intensity)
        .bind(Json(&feedback.keywords))
        .bind(feedback.urgency)
        .bind(&feedback.emotion)
        .bind(feedback.created_at)
        .fetch_one(&mut *tx)
        .await
        .context("Inserting feedback")?;

        tx.commit().await.context("Committing feedback insert")?;

        tracing::info!(
            "Stored feedback {} ({}, service: {})",
            record.id,
            record.sentiment,
            record.service_type.as_deref().unwrap_or("Unknown")
        );
        Ok(record)
    }

    /// All records in insertion order.
    pub async fn list_all(&self) -> Result<Vec<FeedbackRecord>, AppError> {
        sqlx::query_as::<_, FeedbackRecord>("SELECT * FROM feedback ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .context("Listing feedback")
    }
}
