use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Allowed CORS origins; a single `*` means permissive.
    pub cors_origins: Vec<String>,
    /// Hosted 3-class sentiment model. `None` selects the built-in lexicon classifier.
    pub sentiment_model_url: Option<String>,
    /// Hosted emotion model. `None` selects the keyword-bucket classifier.
    pub emotion_model_url: Option<String>,
    pub model_api_token: Option<String>,
    pub analysis_timeout_secs: u64,
    pub classifier_max_retries: u32,
    pub analysis_cache_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: validate_database_url(resolve_database_url(
                std::env::var("DATABASE_URL").ok(),
                std::env::var("DB_URL").ok(),
            ))?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://127.0.0.1:5500,http://localhost:5500".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            sentiment_model_url: optional_url("SENTIMENT_MODEL_URL")?,
            emotion_model_url: optional_url("EMOTION_MODEL_URL")?,
            model_api_token: std::env::var("MODEL_API_TOKEN")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            analysis_timeout_secs: parse_or("ANALYSIS_TIMEOUT_SECS", 30)?,
            classifier_max_retries: parse_or("CLASSIFIER_MAX_RETRIES", 2)?,
            analysis_cache_ttl_secs: parse_or("ANALYSIS_CACHE_TTL_SECS", 3600)?,
        };

        if config.analysis_timeout_secs == 0 {
            anyhow::bail!("ANALYSIS_TIMEOUT_SECS must be greater than zero");
        }

        tracing::debug!("Database URL: {}", config.database_url);
        tracing::debug!("CORS origins: {:?}", config.cors_origins);
        match config.sentiment_model_url {
            Some(ref url) => tracing::info!("Hosted sentiment model configured: {}", url),
            None => tracing::info!("Using built-in lexicon sentiment classifier"),
        }
        if let Some(ref url) = config.emotion_model_url {
            tracing::info!("Hosted emotion model configured: {}", url);
        }
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    pub fn analysis_timeout(&self) -> Duration {
        Duration::from_secs(self.analysis_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            sentiment_model_url: None,
            emotion_model_url: None,
            model_api_token: None,
            analysis_timeout_secs: 30,
            classifier_max_retries: 2,
            analysis_cache_ttl_secs: 3600,
        }
    }
}

/// `DATABASE_URL` wins over the `DB_URL` alias; blank values count as unset.
fn resolve_database_url(database_url: Option<String>, db_url: Option<String>) -> String {
    database_url
        .into_iter()
        .chain(db_url)
        .find(|url| !url.trim().is_empty())
        .unwrap_or_else(|| "sqlite://feedback.db".to_string())
}

fn validate_database_url(url: String) -> anyhow::Result<String> {
    if url.trim().is_empty() {
        anyhow::bail!("DATABASE_URL cannot be empty");
    }
    if !url.starts_with("sqlite:") {
        anyhow::bail!("DATABASE_URL must start with sqlite:");
    }
    Ok(url)
}

fn optional_url(var: &str) -> anyhow::Result<Option<String>> {
    match std::env::var(var).ok().filter(|s| !s.trim().is_empty()) {
        Some(url) => {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("{} must start with http:// or https://", var);
            }
            Ok(Some(url))
        }
        None => Ok(None),
    }
}

fn parse_or<T: std::str::FromStr>(var: &str, default: T) -> anyhow::Result<T> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number", var)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_url_preferred_over_alias() {
        assert_eq!(
            resolve_database_url(
                Some("sqlite://primary.db".to_string()),
                Some("sqlite://alias.db".to_string())
            ),
            "sqlite://primary.db"
        );
        assert_eq!(
            resolve_database_url(None, Some("sqlite://alias.db".to_string())),
            "sqlite://alias.db"
        );
        assert_eq!(
            resolve_database_url(Some("  ".to_string()), Some("sqlite://alias.db".to_string())),
            "sqlite://alias.db"
        );
        assert_eq!(resolve_database_url(None, None), "sqlite://feedback.db");
    }

    #[test]
    fn test_database_url_must_be_sqlite() {
        assert!(validate_database_url("postgres://localhost/db".to_string()).is_err());
        assert!(validate_database_url("".to_string()).is_err());
        assert!(validate_database_url("sqlite::memory:".to_string()).is_ok());
    }
}
