use crate::analyzer::TextAnalyzer;
use crate::errors::AppError;
use crate::models::AnalysisResult;
use moka::future::Cache;
use sha2::{Digest, Sha256};
use std::time::Duration;

/// Memoizes analysis results by the SHA-256 of the input text.
///
/// Only complete analyses are cached. Failed runs and runs where keyword or
/// emotion extraction fell back to its default are recomputed on the next call.
#[derive(Clone)]
pub struct AnalysisCache {
    inner: Cache<String, AnalysisResult>,
}

impl AnalysisCache {
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        Self {
            inner: Cache::builder()
                .time_to_live(ttl)
                .max_capacity(max_capacity)
                .build(),
        }
    }

    /// Hex-encoded SHA-256 of `text`.
    pub fn cache_key(text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub async fn get_or_analyze(
        &self,
        analyzer: &TextAnalyzer,
        text: &str,
    ) -> Result<AnalysisResult, AppError> {
        let key = Self::cache_key(text);
        if let Some(cached) = self.inner.get(&key).await {
            tracing::debug!("Analysis cache hit for {}", &key[..12]);
            return Ok(cached);
        }

        let result = analyzer.analyze(text).await?;
        if result.degraded {
            tracing::debug!("Not caching degraded analysis for {}", &key[..12]);
        } else {
            self.inner.insert(key, result.clone()).await;
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::emotion::EmotionClassifier;
    use crate::keywords::YakeKeywordExtractor;
    use crate::models::Emotion;
    use crate::sentiment::LexiconSentimentClassifier;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Fails on its first call, then answers joy.
    #[derive(Default)]
    struct FlakyEmotion {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmotionClassifier for FlakyEmotion {
        async fn classify(&self, _text: &str) -> Result<Emotion, AppError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(AppError::CapabilityUnavailable("emotion model warming up".into()))
            } else {
                Ok(Emotion::Joy)
            }
        }
    }

    #[test]
    fn test_cache_key_is_stable_sha256() {
        assert_eq!(
            AnalysisCache::cache_key("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_ne!(AnalysisCache::cache_key("abc"), AnalysisCache::cache_key("abd"));
    }

    #[tokio::test]
    async fn test_hit_returns_same_result() {
        let analyzer = TextAnalyzer::from_config(&Config::default()).unwrap();
        let cache = AnalysisCache::new(Duration::from_secs(60), 100);

        let first = cache.get_or_analyze(&analyzer, "Great support team").await.unwrap();
        let second = cache.get_or_analyze(&analyzer, "Great support team").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let analyzer = TextAnalyzer::from_config(&Config::default()).unwrap();
        let cache = AnalysisCache::new(Duration::from_secs(60), 100);

        assert!(cache.get_or_analyze(&analyzer, "  ").await.is_err());
        assert!(cache.inner.get(&AnalysisCache::cache_key("  ")).await.is_none());
    }

    #[tokio::test]
    async fn test_degraded_results_are_not_cached() {
        let analyzer = TextAnalyzer::new(
            Arc::new(LexiconSentimentClassifier::new()),
            Arc::new(YakeKeywordExtractor::default()),
            Some(Arc::new(FlakyEmotion::default())),
            Duration::from_secs(2),
        );
        let cache = AnalysisCache::new(Duration::from_secs(60), 100);

        let first = cache.get_or_analyze(&analyzer, "I love it").await.unwrap();
        assert_eq!(first.emotion, None);
        assert!(cache.inner.get(&AnalysisCache::cache_key("I love it")).await.is_none());

        let second = cache.get_or_analyze(&analyzer, "I love it").await.unwrap();
        assert_eq!(second.emotion, Some(Emotion::Joy));
        assert!(cache.inner.get(&AnalysisCache::cache_key("I love it")).await.is_some());

        let third = cache.get_or_analyze(&analyzer, "I love it").await.unwrap();
        assert_eq!(third, second);
    }
}
