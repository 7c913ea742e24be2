//! Sentiment classification capability and the built-in lexicon classifier.
//!
//! Providers return a full probability distribution over Negative, Neutral and
//! Positive. The analyzer derives the label, confidence and intensity from it.

use crate::errors::AppError;
use crate::models::ClassProbabilities;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Capability that scores a text against the three sentiment classes.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<ClassProbabilities, AppError>;
}

static POSITIVE_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "good", "great", "excellent", "amazing", "wonderful", "fantastic", "superb",
        "outstanding", "brilliant", "love", "loved", "loving", "best", "better", "happy",
        "glad", "pleased", "perfect", "awesome", "nice", "friendly", "helpful", "fast",
        "quick", "quickly", "reliable", "stable", "smooth", "easy", "affordable", "fair",
        "satisfied", "satisfying", "recommend", "recommended", "impressive", "efficient",
        "effective", "polite", "professional", "resolved", "fixed", "thanks", "thank",
        "appreciate", "appreciated", "enjoy", "enjoyed", "convenient", "clear",
    ]
    .into_iter()
    .collect()
});

static NEGATIVE_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "bad", "terrible", "awful", "horrible", "poor", "worst", "worse", "hate", "hated",
        "dislike", "disappointing", "disappointed", "failure", "failed", "fail", "failing",
        "sad", "unhappy", "angry", "annoyed", "frustrated", "frustrating", "problem",
        "problems", "issue", "issues", "broken", "crash", "crashed", "error", "errors",
        "wrong", "useless", "waste", "slow", "slowly", "difficult", "confusing",
        "expensive", "overpriced", "rude", "unreliable", "outage", "outages", "down",
        "dropped", "dropping", "delay", "delayed", "late", "overcharged", "unresolved",
        "unacceptable", "nobody", "ignored", "cancel", "refund",
    ]
    .into_iter()
    .collect()
});

static NEGATORS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "not", "no", "never", "don't", "doesn't", "didn't", "isn't", "wasn't", "aren't",
        "won't", "can't", "cannot", "hardly", "without",
    ]
    .into_iter()
    .collect()
});

/// Word-list polarity scorer.
///
/// Hits are counted per token; a hit directly preceded by a negator counts
/// towards the opposite class. Counts become a distribution through a softmax
/// over `[negative, neutral_prior, positive]` scaled by `sharpness`, so text
/// without any polar word lands on Neutral.
#[derive(Debug, Clone)]
pub struct LexiconSentimentClassifier {
    neutral_prior: f64,
    sharpness: f64,
}

impl Default for LexiconSentimentClassifier {
    fn default() -> Self {
        Self {
            neutral_prior: 0.5,
            sharpness: 2.0,
        }
    }
}

impl LexiconSentimentClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `(positive_hits, negative_hits)` after negation handling.
    pub fn polarity_counts(&self, text: &str) -> (usize, usize) {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = lowered
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .map(|t| t.trim_matches('\''))
            .filter(|t| !t.is_empty())
            .collect();

        let mut positive = 0;
        let mut negative = 0;
        for (i, token) in tokens.iter().enumerate() {
            let polarity = if POSITIVE_WORDS.contains(token) {
                1
            } else if NEGATIVE_WORDS.contains(token) {
                -1
            } else {
                continue;
            };
            let negated = i > 0 && NEGATORS.contains(tokens[i - 1]);
            match (polarity, negated) {
                (1, false) | (-1, true) => positive += 1,
                _ => negative += 1,
            }
        }
        (positive, negative)
    }

    pub fn score(&self, text: &str) -> ClassProbabilities {
        let (positive, negative) = self.polarity_counts(text);
        let logits = [
            negative as f64 * self.sharpness,
            self.neutral_prior * self.sharpness,
            positive as f64 * self.sharpness,
        ];
        let max = logits.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
        let sum: f64 = exps.iter().sum();

        ClassProbabilities {
            negative: exps[0] / sum,
            neutral: exps[1] / sum,
            positive: exps[2] / sum,
        }
    }
}

#[async_trait]
impl SentimentClassifier for LexiconSentimentClassifier {
    async fn classify(&self, text: &str) -> Result<ClassProbabilities, AppError> {
        Ok(self.score(text))
    }
}
