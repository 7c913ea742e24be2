use crate::errors::AppError;
use crate::models::Emotion;
use async_trait::async_trait;

/// Capability that labels a text with one emotion bucket.
#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Emotion, AppError>;
}

/// Buckets in priority order. The first bucket with any word occurring as a
/// substring of the lower-cased text wins.
const EMOTION_BUCKETS: &[(Emotion, &[&str])] = &[
    (
        Emotion::Joy,
        &["happy", "joy", "excited", "glad", "great", "love"],
    ),
    (
        Emotion::Sadness,
        &["sad", "unhappy", "depressed", "cry", "bad"],
    ),
    (
        Emotion::Anger,
        &["angry", "mad", "furious", "rage", "hate"],
    ),
    (
        Emotion::Fear,
        &["fear", "scared", "afraid", "nervous", "worried"],
    ),
];

/// Keyword-bucket emotion detection.
pub fn detect_emotion(text: &str) -> Emotion {
    let lowered = text.to_lowercase();

    EMOTION_BUCKETS
        .iter()
        .find(|(_, words)| words.iter().any(|w| lowered.contains(w)))
        .map(|(emotion, _)| *emotion)
        .unwrap_or(Emotion::Neutral)
}

/// Default emotion provider backed by [`detect_emotion`]. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordEmotionClassifier;

#[async_trait]
impl EmotionClassifier for KeywordEmotionClassifier {
    async fn classify(&self, text: &str) -> Result<Emotion, AppError> {
        Ok(detect_emotion(text))
    }
}
