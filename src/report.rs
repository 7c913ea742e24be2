/// Report aggregation over stored feedback.
///
/// Every report is a full scan of the records passed in; nothing is cached.
use crate::models::{
    FeedbackRecord, Report, ReportTotals, SegmentDimension, Sentiment, SentimentCounts,
};
use std::collections::{BTreeMap, HashMap};

/// Distinct keywords reported per list.
pub const TOP_KEYWORDS: usize = 5;

/// Bucket used for records with no service type (or other missing segment value).
pub const UNKNOWN_BUCKET: &str = "Unknown";

pub fn build_report(records: &[FeedbackRecord]) -> Report {
    if records.is_empty() {
        return Report::default();
    }

    let mut totals = ReportTotals {
        total_feedback: records.len(),
        ..ReportTotals::default()
    };
    let mut by_service: BTreeMap<String, SentimentCounts> = BTreeMap::new();

    for record in records {
        let label = Sentiment::from_stored_label(&record.sentiment);
        match label {
            Some(Sentiment::Positive) => totals.positive += 1,
            Some(Sentiment::Negative) => totals.negative += 1,
            Some(Sentiment::Neutral) => totals.neutral += 1,
            None => {
                tracing::warn!(
                    "Feedback {} has unrecognized sentiment label {:?}",
                    record.id,
                    record.sentiment
                );
                totals.other += 1;
            }
        }

        let service = bucket_name(record.service_type.as_deref());
        let counts = by_service.entry(service).or_default();
        match label {
            Some(Sentiment::Positive) => counts.positive += 1,
            Some(Sentiment::Negative) => counts.negative += 1,
            Some(Sentiment::Neutral) => counts.neutral += 1,
            None => counts.other += 1,
        }
    }

    let top_pain_points = top_keywords(records, Sentiment::Negative, TOP_KEYWORDS);
    let top_positives = top_keywords(records, Sentiment::Positive, TOP_KEYWORDS);
    let urgent_count = records.iter().filter(|r| r.urgency).count();
    let recommendations = recommendations(&top_pain_points, urgent_count, &top_positives);

    Report {
        totals,
        by_service,
        top_pain_points,
        top_positives,
        urgent_count,
        recommendations,
    }
}

/// Most frequent keywords among records labeled `sentiment`, ties broken by
/// first appearance.
pub fn top_keywords(records: &[FeedbackRecord], sentiment: Sentiment, limit: usize) -> Vec<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records
        .iter()
        .filter(|r| Sentiment::from_stored_label(&r.sentiment) == Some(sentiment))
    {
        for keyword in &record.keywords {
            match index.get(keyword.as_str()) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    index.insert(keyword.as_str(), counts.len());
                    counts.push((keyword.as_str(), 1));
                }
            }
        }
    }

    // Stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(limit)
        .map(|(k, _)| k.to_string())
        .collect()
}

pub fn recommendations(
    pain_points: &[String],
    urgent_count: usize,
    positives: &[String],
) -> Vec<String> {
    let mut recs = Vec::new();
    if !pain_points.is_empty() {
        recs.push(format!("Work on improving {}.", pain_points.join(", ")));
    }
    if urgent_count > 0 {
        recs.push(format!(
            "Address {} urgent customer complaints quickly.",
            urgent_count
        ));
    }
    if !positives.is_empty() {
        recs.push(format!("Promote strengths such as {}.", positives.join(", ")));
    }
    recs
}

/// Counts records per value of `dimension`; missing values land in "Unknown".
pub fn segment_summary(
    records: &[FeedbackRecord],
    dimension: SegmentDimension,
) -> BTreeMap<String, usize> {
    let mut summary = BTreeMap::new();
    for record in records {
        let value = match dimension {
            SegmentDimension::Gender => bucket_name(record.gender.as_deref()),
            SegmentDimension::AgeGroup => bucket_name(record.age_group.as_deref()),
            SegmentDimension::Location => bucket_name(record.location.as_deref()),
            SegmentDimension::ServiceType => bucket_name(record.service_type.as_deref()),
            SegmentDimension::Emotion => bucket_name(record.emotion.as_deref()),
            SegmentDimension::Sentiment => Sentiment::from_stored_label(&record.sentiment)
                .map(|s| s.to_string())
                .unwrap_or_else(|| bucket_name(Some(&record.sentiment))),
        };
        *summary.entry(value).or_insert(0) += 1;
    }
    summary
}

/// Values are free-form: only an absent or empty value maps to "Unknown".
fn bucket_name(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => UNKNOWN_BUCKET.to_string(),
    }
}
