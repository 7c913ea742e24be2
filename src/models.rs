use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use std::fmt;
use utoipa::{IntoParams, ToSchema};

// ============ Analysis Types ============

/// Overall polarity of a piece of feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
}

impl Sentiment {
    /// Canonical class order used for tie-breaking: the first maximum wins.
    pub const ORDER: [Sentiment; 3] = [Sentiment::Negative, Sentiment::Neutral, Sentiment::Positive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
            Sentiment::Positive => "Positive",
        }
    }

    /// Case-insensitive match of a persisted label against the three class
    /// names. Model aliases such as `LABEL_2` are not accepted here.
    pub fn from_stored_label(label: &str) -> Option<Self> {
        Self::ORDER
            .into_iter()
            .find(|class| class.as_str().eq_ignore_ascii_case(label))
    }

    /// Case-insensitive parse of a model-produced label, including the
    /// `LABEL_0/1/2` aliases.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "negative" | "label_0" => Some(Sentiment::Negative),
            "neutral" | "label_1" => Some(Sentiment::Neutral),
            "positive" | "label_2" => Some(Sentiment::Positive),
            _ => None,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse emotion bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Joy,
    Sadness,
    Anger,
    Fear,
    Neutral,
}

impl Emotion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Joy => "joy",
            Emotion::Sadness => "sadness",
            Emotion::Anger => "anger",
            Emotion::Fear => "fear",
            Emotion::Neutral => "neutral",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "joy" => Some(Emotion::Joy),
            "sadness" => Some(Emotion::Sadness),
            "anger" => Some(Emotion::Anger),
            "fear" => Some(Emotion::Fear),
            "neutral" => Some(Emotion::Neutral),
            _ => None,
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Probability distribution over the three sentiment classes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassProbabilities {
    pub negative: f64,
    pub neutral: f64,
    pub positive: f64,
}

impl ClassProbabilities {
    pub fn get(&self, class: Sentiment) -> f64 {
        match class {
            Sentiment::Negative => self.negative,
            Sentiment::Neutral => self.neutral,
            Sentiment::Positive => self.positive,
        }
    }

    /// Highest-probability class and its probability. Ties go to the first
    /// maximum in `Sentiment::ORDER`.
    pub fn top(&self) -> (Sentiment, f64) {
        let mut best = (Sentiment::Negative, self.negative);
        for class in Sentiment::ORDER.into_iter().skip(1) {
            let p = self.get(class);
            if p > best.1 {
                best = (class, p);
            }
        }
        best
    }

    /// `P(Positive) - P(Negative)`, clamped to [-1, 1].
    pub fn intensity(&self) -> f64 {
        (self.positive - self.negative).clamp(-1.0, 1.0)
    }
}

/// Output of the analysis pipeline for one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub intensity: f64,
    pub keywords: Vec<String>,
    pub urgency: bool,
    pub emotion: Option<Emotion>,
    /// Distribution the label, confidence and intensity were derived from.
    pub probabilities: ClassProbabilities,
    /// Set when keyword or emotion extraction failed and fell back to its default.
    #[serde(skip)]
    pub degraded: bool,
}

// ============ Database Models ============

/// One submitted and analyzed piece of feedback.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct FeedbackRecord {
    pub id: i64,
    pub customer_id: Option<String>,
    pub name: Option<String>,
    pub age_group: Option<String>,
    pub gender: Option<String>,
    pub location: Option<String>,
    pub tenure_months: Option<i64>,
    /// Internet, Billing, Support, Streaming, ...
    pub service_type: Option<String>,
    pub text: String,
    /// Stored label; compared case-insensitively when reporting.
    pub sentiment: String,
    pub confidence: f64,
    /// [-1..+1]
    pub intensity: f64,
    #[sqlx(json)]
    pub keywords: Vec<String>,
    pub urgency: bool,
    pub emotion: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A record ready for insertion; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFeedback {
    pub customer_id: Option<String>,
    pub name: Option<String>,
    pub age_group: Option<String>,
    pub gender: Option<String>,
    pub location: Option<String>,
    pub tenure_months: Option<i64>,
    pub service_type: Option<String>,
    pub text: String,
    pub sentiment: String,
    pub confidence: f64,
    pub intensity: f64,
    pub keywords: Vec<String>,
    pub urgency: bool,
    pub emotion: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewFeedback {
    /// Folds an analysis into a submission. `created_at` is fixed here.
    pub fn from_analysis(submission: FeedbackCreate, analysis: &AnalysisResult) -> Self {
        Self {
            customer_id: submission.customer_id,
            name: submission.name,
            age_group: submission.age_group,
            gender: submission.gender,
            location: submission.location,
            tenure_months: submission.tenure_months,
            service_type: submission.service_type,
            text: submission.text,
            sentiment: analysis.sentiment.to_string(),
            confidence: analysis.confidence,
            intensity: analysis.intensity,
            keywords: analysis.keywords.clone(),
            urgency: analysis.urgency,
            emotion: analysis.emotion.map(|e| e.to_string()),
            created_at: Utc::now(),
        }
    }
}

// ============ API Request/Response Models ============

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct AnalyzeResponse {
    pub sentiment: String,
    pub confidence: f64,
    pub intensity: f64,
    pub keywords: Vec<String>,
    pub urgency: bool,
    pub emotion: Option<String>,
}

impl From<&AnalysisResult> for AnalyzeResponse {
    fn from(result: &AnalysisResult) -> Self {
        Self {
            sentiment: result.sentiment.to_string(),
            confidence: round4(result.confidence),
            intensity: round4(result.intensity),
            keywords: result.keywords.clone(),
            urgency: result.urgency,
            emotion: result.emotion.map(|e| e.to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct FeedbackCreate {
    pub customer_id: Option<String>,
    pub name: Option<String>,
    pub age_group: Option<String>,
    pub gender: Option<String>,
    pub location: Option<String>,
    pub tenure_months: Option<i64>,
    pub service_type: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct FeedbackResponse {
    pub id: i64,
    #[serde(flatten)]
    pub analysis: AnalyzeResponse,
}

impl From<&FeedbackRecord> for FeedbackResponse {
    fn from(record: &FeedbackRecord) -> Self {
        Self {
            id: record.id,
            analysis: AnalyzeResponse {
                sentiment: record.sentiment.clone(),
                confidence: round4(record.confidence),
                intensity: round4(record.intensity),
                keywords: record.keywords.clone(),
                urgency: record.urgency,
                emotion: record.emotion.clone(),
            },
        }
    }
}

/// Optional record filters shared by the listing and report endpoints.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecordFilter {
    /// Exact match on the record's location.
    pub location: Option<String>,
    /// Exact match on the record's service type.
    pub service_type: Option<String>,
}

impl RecordFilter {
    pub fn matches(&self, record: &FeedbackRecord) -> bool {
        fn field_matches(wanted: &Option<String>, actual: &Option<String>) -> bool {
            match wanted.as_deref().filter(|w| !w.is_empty()) {
                Some(w) => actual.as_deref() == Some(w),
                None => true,
            }
        }
        field_matches(&self.location, &record.location)
            && field_matches(&self.service_type, &record.service_type)
    }
}

// ============ Report Models ============

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReportTotals {
    pub total_feedback: usize,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    /// Records whose stored label is not one of the three canonical classes.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub other: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SentimentCounts {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub other: usize,
}

impl SentimentCounts {
    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral + self.other
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Report {
    pub totals: ReportTotals,
    pub by_service: BTreeMap<String, SentimentCounts>,
    pub top_pain_points: Vec<String>,
    pub top_positives: Vec<String>,
    pub urgent_count: usize,
    pub recommendations: Vec<String>,
}

/// Demographic or analysis field used to bucket records in segment summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SegmentDimension {
    Gender,
    AgeGroup,
    Location,
    ServiceType,
    Sentiment,
    Emotion,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

/// Rounds to 4 decimal places for API output.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
