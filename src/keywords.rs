//! Unsupervised single-word keyword extraction.
//!
//! Candidates are scored with the YAKE statistical features (casing, position,
//! frequency, context relatedness and sentence spread). Lower scores are more
//! relevant.

use crate::errors::AppError;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Capability that returns ranked single-word keywords, most relevant first.
pub trait KeywordExtractor: Send + Sync {
    fn extract(&self, text: &str) -> Result<Vec<String>, AppError>;
}

static STOPWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and",
        "any", "are", "as", "at", "be", "because", "been", "before", "being", "below",
        "between", "both", "but", "by", "can", "can't", "cannot", "could", "couldn't", "did",
        "didn't", "do", "does", "doesn't", "doing", "don't", "down", "during", "each", "even",
        "ever", "every", "few", "for", "from", "further", "get", "got", "had", "hadn't",
        "has", "hasn't", "have", "haven't", "having", "he", "her", "here", "hers", "herself",
        "him", "himself", "his", "how", "i", "i'm", "i've", "if", "in", "into", "is", "isn't",
        "it", "it's", "its", "itself", "just", "let", "me", "more", "most", "much", "my",
        "myself", "no", "nor", "not", "now", "of", "off", "on", "once", "one", "only", "or",
        "other", "our", "ours", "ourselves", "out", "over", "own", "please", "really",
        "same", "she", "should", "since", "so", "some", "still", "such", "than", "that",
        "the", "their", "theirs", "them", "themselves", "then", "there", "these", "they",
        "this", "those", "through", "to", "too", "under", "until", "up", "us", "very", "was",
        "wasn't", "we", "were", "weren't", "what", "when", "where", "which", "while", "who",
        "whom", "why", "will", "with", "won't", "would", "you", "your", "yours", "yourself",
    ]
    .into_iter()
    .collect()
});

/// Per-term statistics gathered in one pass over the text.
#[derive(Debug, Default)]
struct TermStats {
    tf: usize,
    tf_capitalized: usize,
    tf_acronym: usize,
    first_seen: usize,
    sentence_ids: Vec<usize>,
    left: Vec<String>,
    right: Vec<String>,
}

/// YAKE-style extractor restricted to single-word keywords.
#[derive(Debug, Clone)]
pub struct YakeKeywordExtractor {
    top: usize,
    min_len: usize,
}

impl Default for YakeKeywordExtractor {
    fn default() -> Self {
        Self { top: 6, min_len: 3 }
    }
}

impl YakeKeywordExtractor {
    pub fn new(top: usize) -> Self {
        Self {
            top,
            ..Self::default()
        }
    }

    fn split_sentences(text: &str) -> Vec<Vec<String>> {
        text.split(|c: char| matches!(c, '.' | '!' | '?' | ';' | '\n'))
            .map(|sentence| {
                sentence
                    .split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '-'))
                    .map(|t| t.trim_matches(|c: char| c == '\'' || c == '-'))
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|tokens| !tokens.is_empty())
            .collect()
    }

    fn is_candidate(&self, lowered: &str) -> bool {
        lowered.chars().count() >= self.min_len
            && !STOPWORDS.contains(lowered)
            && !lowered.chars().all(|c| c.is_ascii_digit())
    }

    /// Scores every candidate term. Lower is better.
    pub fn score_terms(&self, text: &str) -> Vec<(String, f64)> {
        let sentences = Self::split_sentences(text);
        if sentences.is_empty() {
            return Vec::new();
        }

        let mut stats: HashMap<String, TermStats> = HashMap::new();
        let mut position = 0usize;

        for (sentence_id, tokens) in sentences.iter().enumerate() {
            let lowered: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
            for (i, token) in tokens.iter().enumerate() {
                position += 1;
                let key = &lowered[i];
                if !self.is_candidate(key) {
                    continue;
                }
                let entry = stats.entry(key.clone()).or_insert_with(|| TermStats {
                    first_seen: position,
                    ..TermStats::default()
                });
                entry.tf += 1;
                entry.sentence_ids.push(sentence_id);

                let is_acronym = token.chars().count() > 1
                    && token.chars().all(|c| !c.is_alphabetic() || c.is_uppercase())
                    && token.chars().any(|c| c.is_alphabetic());
                if is_acronym {
                    entry.tf_acronym += 1;
                } else if i > 0 && token.chars().next().is_some_and(char::is_uppercase) {
                    entry.tf_capitalized += 1;
                }
                if i > 0 {
                    entry.left.push(lowered[i - 1].clone());
                }
                if i + 1 < lowered.len() {
                    entry.right.push(lowered[i + 1].clone());
                }
            }
        }

        if stats.is_empty() {
            return Vec::new();
        }

        let tfs: Vec<f64> = stats.values().map(|s| s.tf as f64).collect();
        let mean_tf = tfs.iter().sum::<f64>() / tfs.len() as f64;
        let std_tf =
            (tfs.iter().map(|tf| (tf - mean_tf).powi(2)).sum::<f64>() / tfs.len() as f64).sqrt();
        let max_tf = tfs.iter().cloned().fold(0.0, f64::max);
        let sentence_count = sentences.len() as f64;

        let mut scored: Vec<(String, f64, usize)> = stats
            .into_iter()
            .map(|(term, s)| {
                let tf = s.tf as f64;
                let casing = s.tf_capitalized.max(s.tf_acronym) as f64 / (1.0 + tf.ln());

                let mut ids = s.sentence_ids.clone();
                ids.sort_unstable();
                let median = if ids.len() % 2 == 1 {
                    ids[ids.len() / 2] as f64
                } else {
                    (ids[ids.len() / 2 - 1] + ids[ids.len() / 2]) as f64 / 2.0
                };
                let position = (3.0 + median).ln().ln();

                let frequency = tf / (mean_tf + std_tf);

                let dispersion = |neighbours: &[String]| {
                    if neighbours.is_empty() {
                        0.0
                    } else {
                        let unique: HashSet<&String> = neighbours.iter().collect();
                        unique.len() as f64 / neighbours.len() as f64
                    }
                };
                let relatedness =
                    1.0 + (dispersion(&s.left) + dispersion(&s.right)) * (tf / max_tf);

                ids.dedup();
                let spread = ids.len() as f64 / sentence_count;

                let score = (relatedness * position)
                    / (casing + frequency / relatedness + spread / relatedness);
                (term, score, s.first_seen)
            })
            .collect();

        scored.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.2.cmp(&b.2)));
        scored.into_iter().map(|(t, s, _)| (t, s)).collect()
    }
}

impl KeywordExtractor for YakeKeywordExtractor {
    fn extract(&self, text: &str) -> Result<Vec<String>, AppError> {
        let ranked = self.score_terms(text);
        if ranked.iter().any(|(_, score)| !score.is_finite()) {
            return Err(AppError::CapabilityUnavailable(
                "keyword scoring produced a non-finite score".to_string(),
            ));
        }
        Ok(ranked
            .into_iter()
            .take(self.top)
            .map(|(term, _)| term)
            .collect())
    }
}
