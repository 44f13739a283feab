//! Client for the external text-classification endpoint.
//!
//! The gateway is strictly advisory. Every failure mode (timeout,
//! connect error, non-2xx, malformed body) yields `None`, so issue
//! submission proceeds whether or not the classifier is up.

use std::time::Duration;

use moka::future::Cache;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use civicwatch_core::config::SuggestConfig;
use civicwatch_core::error::AppError;
use civicwatch_core::result::AppResult;

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    description: &'a str,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    predicted_category: String,
}

/// Fail-open gateway to the category classifier.
#[derive(Debug, Clone)]
pub struct SuggestGateway {
    client: reqwest::Client,
    endpoint_url: String,
    min_description_chars: usize,
    /// Successful predictions keyed by trimmed description, so
    /// keystroke-level repeat queries never hit the classifier twice.
    cache: Cache<String, String>,
}

impl SuggestGateway {
    /// Build the gateway from configuration.
    pub fn new(config: &SuggestConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::configuration(format!("Failed to build suggestion client: {e}"))
            })?;

        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(Duration::from_secs(config.cache_ttl_seconds))
            .build();

        Ok(Self {
            client,
            endpoint_url: config.endpoint_url.clone(),
            min_description_chars: config.min_description_chars,
            cache,
        })
    }

    /// Suggest a category for an issue description.
    ///
    /// Returns `None` without any network call when the trimmed
    /// description is at or below the configured minimum length.
    pub async fn suggest(&self, description: &str) -> Option<String> {
        let trimmed = description.trim();
        if trimmed.chars().count() <= self.min_description_chars {
            return None;
        }

        if let Some(cached) = self.cache.get(trimmed).await {
            debug!("Category suggestion served from cache");
            return Some(cached);
        }

        let category = self.predict(trimmed).await?;
        self.cache
            .insert(trimmed.to_string(), category.clone())
            .await;
        Some(category)
    }

    async fn predict(&self, description: &str) -> Option<String> {
        let response = match self
            .client
            .post(&self.endpoint_url)
            .json(&PredictRequest { description })
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "Category classifier unreachable");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(status = %response.status(), "Category classifier returned an error");
            return None;
        }

        match response.json::<PredictResponse>().await {
            Ok(body) => Some(body.predicted_category),
            Err(e) => {
                warn!(error = %e, "Malformed classifier response");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> SuggestGateway {
        // Port 9 is discard; nothing listens there, so any request the
        // gateway should not be making would fail loudly in the logs
        // rather than silently succeed.
        SuggestGateway::new(&SuggestConfig {
            endpoint_url: "http://127.0.0.1:9/predict".to_string(),
            request_timeout_seconds: 1,
            min_description_chars: 10,
            cache_capacity: 16,
            cache_ttl_seconds: 60,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_short_description_skips_network() {
        let gw = gateway();
        assert_eq!(gw.suggest("pothole").await, None);
        // Exactly at the threshold still skips; only strictly longer runs.
        assert_eq!(gw.suggest("   keep it up   ").await, None);
    }

    #[tokio::test]
    async fn test_unreachable_classifier_fails_open() {
        let gw = gateway();
        assert_eq!(
            gw.suggest("a long enough description of a broken streetlight")
                .await,
            None
        );
    }
}
