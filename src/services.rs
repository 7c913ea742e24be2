use crate::circuit_breaker::{create_classifier_circuit_breaker, ClassifierCircuitBreaker};
use crate::emotion::EmotionClassifier;
use crate::errors::AppError;
use crate::models::{ClassProbabilities, Emotion, Sentiment};
use crate::sentiment::SentimentClassifier;
use async_trait::async_trait;
use failsafe::futures::CircuitBreaker;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// One class score as returned by a hosted text-classification model.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassScore {
    pub label: String,
    pub score: f64,
}

/// Hosted models answer either `[[{label, score}, ...]]` (one list per input)
/// or a flat `[{label, score}, ...]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScoresPayload {
    Batched(Vec<Vec<ClassScore>>),
    Flat(Vec<ClassScore>),
}

impl ScoresPayload {
    fn into_scores(self) -> Vec<ClassScore> {
        match self {
            ScoresPayload::Batched(mut batches) => {
                if batches.is_empty() {
                    Vec::new()
                } else {
                    batches.swap_remove(0)
                }
            }
            ScoresPayload::Flat(scores) => scores,
        }
    }
}

/// HTTP client for a hosted text-classification endpoint.
///
/// Every call goes through a circuit breaker and is retried up to
/// `max_retries` times with linear backoff.
#[derive(Clone)]
pub struct HostedModelClient {
    client: Client,
    url: String,
    token: Option<String>,
    max_retries: u32,
    retry_delay: Duration,
    breaker: ClassifierCircuitBreaker,
}

impl HostedModelClient {
    pub fn new(url: String, token: Option<String>, max_retries: u32) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::CapabilityUnavailable(format!("Failed to create model client: {}", e))
            })?;

        Ok(Self {
            client,
            url,
            token,
            max_retries,
            retry_delay: Duration::from_millis(200),
            breaker: create_classifier_circuit_breaker(),
        })
    }

    /// Overrides the pause between retries.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Posts `text` to the model and returns its class scores.
    pub async fn classify(&self, text: &str) -> Result<Vec<ClassScore>, AppError> {
        let mut attempt = 0;
        loop {
            let result = self.breaker.call(self.request_once(text)).await;
            let err = match result {
                Ok(scores) => return Ok(scores),
                Err(failsafe::Error::Rejected) => {
                    tracing::warn!("Circuit open for model endpoint {}", self.url);
                    return Err(AppError::CapabilityUnavailable(format!(
                        "Model endpoint {} is failing, circuit open",
                        self.url
                    )));
                }
                Err(failsafe::Error::Inner(e)) => e,
            };

            if attempt >= self.max_retries {
                return Err(err);
            }
            attempt += 1;
            tracing::warn!(
                "Model call failed (attempt {}/{}): {}",
                attempt,
                self.max_retries + 1,
                err
            );
            tokio::time::sleep(self.retry_delay * attempt).await;
        }
    }

    async fn request_once(&self, text: &str) -> Result<Vec<ClassScore>, AppError> {
        let mut request = self.client.post(&self.url).json(&json!({ "inputs": text }));
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            AppError::CapabilityUnavailable(format!("Model request failed: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Model endpoint returned error {}: {}", status, error_text);
            return Err(AppError::CapabilityUnavailable(format!(
                "Model endpoint returned status {}: {}",
                status, error_text
            )));
        }

        let payload: ScoresPayload = response.json().await.map_err(|e| {
            AppError::CapabilityUnavailable(format!("Failed to parse model response: {}", e))
        })?;

        let scores = payload.into_scores();
        if scores.is_empty() {
            return Err(AppError::CapabilityUnavailable(
                "Model returned no class scores".to_string(),
            ));
        }
        Ok(scores)
    }
}

/// 3-class sentiment model served over HTTP.
///
/// Accepts `LABEL_0/1/2` (negative/neutral/positive) or the class names
/// themselves; classes missing from the response count as probability 0.
#[derive(Clone)]
pub struct RemoteSentimentClassifier {
    client: HostedModelClient,
}

impl RemoteSentimentClassifier {
    pub fn new(client: HostedModelClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SentimentClassifier for RemoteSentimentClassifier {
    async fn classify(&self, text: &str) -> Result<ClassProbabilities, AppError> {
        let scores = self.client.classify(text).await?;

        let mut probs = ClassProbabilities::default();
        let mut recognized = 0;
        for score in &scores {
            match Sentiment::from_label(&score.label) {
                Some(Sentiment::Negative) => probs.negative = score.score,
                Some(Sentiment::Neutral) => probs.neutral = score.score,
                Some(Sentiment::Positive) => probs.positive = score.score,
                None => {
                    tracing::debug!("Ignoring unknown sentiment label {}", score.label);
                    continue;
                }
            }
            recognized += 1;
        }

        if recognized == 0 {
            return Err(AppError::CapabilityUnavailable(
                "Sentiment model returned no recognizable labels".to_string(),
            ));
        }
        Ok(probs)
    }
}

/// Emotion model served over HTTP. The top-scoring label must be one of the
/// five emotion buckets, otherwise the call fails.
#[derive(Clone)]
pub struct RemoteEmotionClassifier {
    client: HostedModelClient,
}

impl RemoteEmotionClassifier {
    pub fn new(client: HostedModelClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EmotionClassifier for RemoteEmotionClassifier {
    async fn classify(&self, text: &str) -> Result<Emotion, AppError> {
        let scores = self.client.classify(text).await?;

        let top = scores
            .iter()
            .fold(None::<&ClassScore>, |best, s| match best {
                Some(b) if b.score >= s.score => Some(b),
                _ => Some(s),
            })
            .ok_or_else(|| AppError::CapabilityUnavailable("Empty emotion scores".to_string()))?;

        Emotion::from_label(&top.label).ok_or_else(|| {
            AppError::CapabilityUnavailable(format!("Unsupported emotion label {}", top.label))
        })
    }
}
