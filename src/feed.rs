use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::FeedError;
use crate::models::feed::WarningBatch;

const MAX_RETRIES: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// HTTP client for the upstream warning feed.
pub struct FeedClient {
    client: Client,
    url: String,
}

impl FeedClient {
    pub fn new(url: &str, timeout_secs: u64) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// Fetch one batch from the feed.
    ///
    /// Transient failures (connection errors, 5xx) are retried up to
    /// [`MAX_RETRIES`] times with exponential backoff; 4xx and shape
    /// violations fail immediately.
    pub async fn fetch(&self) -> Result<WarningBatch, FeedError> {
        let mut attempt = 0;
        loop {
            match self.fetch_once().await {
                Ok(batch) => {
                    info!(features = batch.len(), "Fetched warning feed");
                    return Ok(batch);
                }
                Err(e) if attempt < MAX_RETRIES && is_transient(&e) => {
                    let delay = RETRY_BASE_DELAY * 2u32.pow(attempt);
                    warn!(
                        error = %e,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Feed fetch failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self) -> Result<WarningBatch, FeedError> {
        let response = self
            .client
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(WarningBatch::empty());
        }
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text)
            .map_err(|e| FeedError::InvalidFormat(e.to_string()))?;
        parse_batch(body)
    }
}

/// Validate the top-level feed shape: an object with a `features` array.
fn parse_batch(body: Value) -> Result<WarningBatch, FeedError> {
    let features = body
        .as_object()
        .and_then(|o| o.get("features"))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            FeedError::InvalidFormat("expected an object with a features array".to_string())
        })?;
    Ok(WarningBatch {
        features: features.clone(),
    })
}

fn is_transient(error: &FeedError) -> bool {
    match error {
        FeedError::Network(_) => true,
        FeedError::Status(code) => *code >= 500,
        FeedError::InvalidFormat(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_batch_accepts_features_array() {
        let batch = parse_batch(json!({"type": "FeatureCollection", "features": [{}, {}]}));
        assert_eq!(batch.unwrap().len(), 2);
    }

    #[test]
    fn test_parse_batch_accepts_empty_features() {
        let batch = parse_batch(json!({"features": []})).unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_parse_batch_rejects_missing_features() {
        assert!(matches!(
            parse_batch(json!({"type": "FeatureCollection"})),
            Err(FeedError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_parse_batch_rejects_non_array_features() {
        assert!(parse_batch(json!({"features": "none"})).is_err());
        assert!(parse_batch(json!(["features"])).is_err());
    }

    #[test]
    fn test_transient_classification() {
        assert!(is_transient(&FeedError::Status(500)));
        assert!(is_transient(&FeedError::Status(503)));
        assert!(!is_transient(&FeedError::Status(404)));
        assert!(!is_transient(&FeedError::InvalidFormat("x".to_string())));
    }
}
