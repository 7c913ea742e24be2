/// Feedback text analysis pipeline.
///
/// Runs the sentiment, keyword, urgency and emotion stages over one text:
/// 1. Sentiment distribution from the classifier (fatal on failure)
/// 2. Keyword ranking on the blocking pool (empty on failure)
/// 3. Urgency pattern match
/// 4. Emotion label (absent on failure)
use crate::config::Config;
use crate::emotion::{EmotionClassifier, KeywordEmotionClassifier};
use crate::errors::{AppError, ResultExt};
use crate::keywords::{KeywordExtractor, YakeKeywordExtractor};
use crate::models::{AnalysisResult, Emotion};
use crate::sentiment::{LexiconSentimentClassifier, SentimentClassifier};
use crate::services::{HostedModelClient, RemoteEmotionClassifier, RemoteSentimentClassifier};
use crate::urgency::detect_urgency;
use std::sync::Arc;
use std::time::Duration;

/// Keywords kept per text after ranking.
pub const MAX_KEYWORDS: usize = 5;

/// Analysis pipeline over long-lived capability providers.
#[derive(Clone)]
pub struct TextAnalyzer {
    sentiment: Arc<dyn SentimentClassifier>,
    keywords: Arc<dyn KeywordExtractor>,
    emotion: Option<Arc<dyn EmotionClassifier>>,
    timeout: Duration,
}

impl TextAnalyzer {
    pub fn new(
        sentiment: Arc<dyn SentimentClassifier>,
        keywords: Arc<dyn KeywordExtractor>,
        emotion: Option<Arc<dyn EmotionClassifier>>,
        timeout: Duration,
    ) -> Self {
        Self {
            sentiment,
            keywords,
            emotion,
            timeout,
        }
    }

    /// Builds the providers selected by configuration: hosted models when their
    /// URLs are set, the built-in lexicon and keyword-bucket classifiers otherwise.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let sentiment: Arc<dyn SentimentClassifier> = match config.sentiment_model_url {
            Some(ref url) => {
                let client = HostedModelClient::new(
                    url.clone(),
                    config.model_api_token.clone(),
                    config.classifier_max_retries,
                )
                .context("Creating sentiment model client")?;
                Arc::new(RemoteSentimentClassifier::new(client))
            }
            None => Arc::new(LexiconSentimentClassifier::new()),
        };

        let emotion: Arc<dyn EmotionClassifier> = match config.emotion_model_url {
            Some(ref url) => {
                let client = HostedModelClient::new(
                    url.clone(),
                    config.model_api_token.clone(),
                    config.classifier_max_retries,
                )
                .context("Creating emotion model client")?;
                Arc::new(RemoteEmotionClassifier::new(client))
            }
            None => Arc::new(KeywordEmotionClassifier),
        };

        Ok(Self::new(
            sentiment,
            Arc::new(YakeKeywordExtractor::default()),
            Some(emotion),
            config.analysis_timeout(),
        ))
    }

    /// Analyzes `text`, bounded by the configured timeout.
    ///
    /// Empty or whitespace-only text is rejected before any provider runs.
    pub async fn analyze(&self, text: &str) -> Result<AnalysisResult, AppError> {
        if text.trim().is_empty() {
            return Err(AppError::BadRequest(
                "text must be a non-empty string".to_string(),
            ));
        }

        tokio::time::timeout(self.timeout, self.run_pipeline(text))
            .await
            .map_err(|_| {
                AppError::Timeout(format!(
                    "analysis exceeded {} ms",
                    self.timeout.as_millis()
                ))
            })?
    }

    async fn run_pipeline(&self, text: &str) -> Result<AnalysisResult, AppError> {
        let probabilities = self
            .sentiment
            .classify(text)
            .await
            .context("Sentiment classification failed")?;
        let (sentiment, confidence) = probabilities.top();

        let (keywords, keywords_ok) = match self.extract_keywords(text).await {
            Some(keywords) => (keywords, true),
            None => (Vec::new(), false),
        };
        let urgency = detect_urgency(text);
        let (emotion, emotion_ok) = match self.detect_emotion(text).await {
            Ok(emotion) => (emotion, true),
            Err(e) => {
                tracing::warn!("Emotion classification unavailable: {}", e);
                (None, false)
            }
        };

        tracing::debug!(
            "Analyzed text ({} chars): {} ({:.4}), {} keywords, urgency={}, emotion={:?}",
            text.len(),
            sentiment,
            confidence,
            keywords.len(),
            urgency,
            emotion
        );

        Ok(AnalysisResult {
            sentiment,
            confidence,
            intensity: probabilities.intensity(),
            keywords,
            urgency,
            emotion,
            probabilities,
            degraded: !(keywords_ok && emotion_ok),
        })
    }

    /// `None` when the extractor failed.
    async fn extract_keywords(&self, text: &str) -> Option<Vec<String>> {
        let extractor = Arc::clone(&self.keywords);
        let owned = text.to_string();

        match tokio::task::spawn_blocking(move || extractor.extract(&owned)).await {
            Ok(Ok(mut keywords)) => {
                keywords.truncate(MAX_KEYWORDS);
                Some(keywords)
            }
            Ok(Err(e)) => {
                tracing::warn!("Keyword extraction failed, using no keywords: {}", e);
                None
            }
            Err(e) => {
                tracing::warn!("Keyword extraction task aborted: {}", e);
                None
            }
        }
    }

    async fn detect_emotion(&self, text: &str) -> Result<Option<Emotion>, AppError> {
        match self.emotion {
            Some(ref classifier) => classifier.classify(text).await.map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClassProbabilities, Sentiment};
    use async_trait::async_trait;

    struct FixedSentiment(ClassProbabilities);

    #[async_trait]
    impl SentimentClassifier for FixedSentiment {
        async fn classify(&self, _text: &str) -> Result<ClassProbabilities, AppError> {
            Ok(self.0)
        }
    }

    struct FailingSentiment;

    #[async_trait]
    impl SentimentClassifier for FailingSentiment {
        async fn classify(&self, _text: &str) -> Result<ClassProbabilities, AppError> {
            Err(AppError::CapabilityUnavailable("model not loaded".into()))
        }
    }

    struct SlowSentiment;

    #[async_trait]
    impl SentimentClassifier for SlowSentiment {
        async fn classify(&self, _text: &str) -> Result<ClassProbabilities, AppError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(ClassProbabilities::default())
        }
    }

    struct FailingKeywords;

    impl KeywordExtractor for FailingKeywords {
        fn extract(&self, _text: &str) -> Result<Vec<String>, AppError> {
            Err(AppError::CapabilityUnavailable("extractor crashed".into()))
        }
    }

    struct ManyKeywords;

    impl KeywordExtractor for ManyKeywords {
        fn extract(&self, _text: &str) -> Result<Vec<String>, AppError> {
            Ok(["a", "b", "c", "d", "e", "f"].map(String::from).to_vec())
        }
    }

    struct FailingEmotion;

    #[async_trait]
    impl EmotionClassifier for FailingEmotion {
        async fn classify(&self, _text: &str) -> Result<Emotion, AppError> {
            Err(AppError::CapabilityUnavailable("emotion model missing".into()))
        }
    }

    fn probs(negative: f64, neutral: f64, positive: f64) -> ClassProbabilities {
        ClassProbabilities {
            negative,
            neutral,
            positive,
        }
    }

    fn analyzer_with(
        sentiment: Arc<dyn SentimentClassifier>,
        keywords: Arc<dyn KeywordExtractor>,
        emotion: Option<Arc<dyn EmotionClassifier>>,
    ) -> TextAnalyzer {
        TextAnalyzer::new(sentiment, keywords, emotion, Duration::from_secs(2))
    }

    #[tokio::test]
    async fn test_label_confidence_and_intensity_from_same_distribution() {
        let analyzer = analyzer_with(
            Arc::new(FixedSentiment(probs(0.2, 0.5, 0.3))),
            Arc::new(YakeKeywordExtractor::default()),
            Some(Arc::new(KeywordEmotionClassifier)),
        );

        let result = analyzer.analyze("Service was okay overall").await.unwrap();
        assert_eq!(result.sentiment, Sentiment::Neutral);
        assert_eq!(result.confidence, 0.5);
        assert!((result.intensity - 0.1).abs() < 1e-12);
        assert_eq!(result.probabilities, probs(0.2, 0.5, 0.3));
    }

    #[tokio::test]
    async fn test_empty_text_rejected() {
        let analyzer = TextAnalyzer::from_config(&Config::default()).unwrap();
        for text in ["", "   ", "\n\t"] {
            let err = analyzer.analyze(text).await.unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)));
        }
    }

    #[tokio::test]
    async fn test_sentiment_failure_propagates() {
        let analyzer = analyzer_with(
            Arc::new(FailingSentiment),
            Arc::new(YakeKeywordExtractor::default()),
            None,
        );
        let err = analyzer.analyze("anything").await.unwrap_err();
        assert!(matches!(err.root(), AppError::CapabilityUnavailable(_)));
    }

    #[tokio::test]
    async fn test_keyword_failure_degrades_to_empty() {
        let analyzer = analyzer_with(
            Arc::new(LexiconSentimentClassifier::new()),
            Arc::new(FailingKeywords),
            Some(Arc::new(KeywordEmotionClassifier)),
        );
        let result = analyzer.analyze("The billing page is broken").await.unwrap();
        assert!(result.keywords.is_empty());
        assert_eq!(result.sentiment, Sentiment::Negative);
        assert!(result.degraded);
    }

    #[tokio::test]
    async fn test_keywords_truncated_to_five() {
        let analyzer = analyzer_with(
            Arc::new(LexiconSentimentClassifier::new()),
            Arc::new(ManyKeywords),
            None,
        );
        let result = analyzer.analyze("anything at all").await.unwrap();
        assert_eq!(result.keywords, vec!["a", "b", "c", "d", "e"]);
    }

    #[tokio::test]
    async fn test_emotion_failure_degrades_to_none() {
        let analyzer = analyzer_with(
            Arc::new(LexiconSentimentClassifier::new()),
            Arc::new(YakeKeywordExtractor::default()),
            Some(Arc::new(FailingEmotion)),
        );
        let result = analyzer.analyze("I love it").await.unwrap();
        assert_eq!(result.emotion, None);
        assert!(result.degraded);
    }

    #[tokio::test]
    async fn test_missing_emotion_provider_is_none() {
        let analyzer = analyzer_with(
            Arc::new(LexiconSentimentClassifier::new()),
            Arc::new(YakeKeywordExtractor::default()),
            None,
        );
        let result = analyzer.analyze("I love it").await.unwrap();
        assert_eq!(result.emotion, None);
        assert!(!result.degraded);
    }

    #[tokio::test]
    async fn test_slow_classifier_times_out() {
        let analyzer = TextAnalyzer::new(
            Arc::new(SlowSentiment),
            Arc::new(YakeKeywordExtractor::default()),
            None,
            Duration::from_millis(50),
        );
        let err = analyzer.analyze("hello there").await.unwrap_err();
        assert!(matches!(err, AppError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_default_pipeline_end_to_end() {
        let analyzer = TextAnalyzer::from_config(&Config::default()).unwrap();
        let result = analyzer
            .analyze("Internet down since Monday, support is slow and I am angry. Fix it asap!")
            .await
            .unwrap();

        assert_eq!(result.sentiment, Sentiment::Negative);
        assert!(result.urgency);
        assert_eq!(result.emotion, Some(Emotion::Anger));
        assert!(result.keywords.len() <= MAX_KEYWORDS);
        assert!(!result.keywords.is_empty());
        assert!(!result.degraded);
    }
}
