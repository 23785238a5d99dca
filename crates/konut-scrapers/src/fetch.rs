use konut_core::{KonutError, Result};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use crate::config::ScraperConfig;

/// A page body that came back with HTTP 200.
#[derive(Debug, Clone)]
pub struct RawPage {
    pub url: Url,
    pub html: String,
}

pub struct PageFetcher {
    client: Client,
    max_retries: u32,
    backoff: Duration,
}

impl PageFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
            backoff: config.retry_backoff(),
        })
    }

    /// GET `url`. Anything but a 200 is a `KonutError::Fetch`; transport
    /// failures, 429 and 5xx answers are retried with exponential backoff
    /// up to the configured limit.
    pub async fn fetch(&self, url: &Url, cancel: &CancellationToken) -> Result<RawPage> {
        let mut attempt: u32 = 0;

        loop {
            match self.fetch_once(url, cancel).await {
                Ok(html) => {
                    return Ok(RawPage {
                        url: url.clone(),
                        html,
                    })
                }
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.backoff.saturating_mul(2u32.saturating_pow(attempt - 1));
                    warn!(
                        "{} - retrying in {:?} (attempt {}/{})",
                        e,
                        delay,
                        attempt + 1,
                        self.max_retries + 1
                    );

                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = cancel.cancelled() => return Err(cancelled(url)),
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self, url: &Url, cancel: &CancellationToken) -> Result<String> {
        if cancel.is_cancelled() {
            return Err(cancelled(url));
        }

        debug!("Fetching {}", url);

        let request = async {
            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| transport_error(url, e))?;

            let status = response.status();
            if status != StatusCode::OK {
                return Err(KonutError::Fetch {
                    url: url.to_string(),
                    status: Some(status.as_u16()),
                    reason: format!("HTTP {}", status),
                });
            }

            response.text().await.map_err(|e| transport_error(url, e))
        };

        tokio::select! {
            result = request => result,
            _ = cancel.cancelled() => Err(cancelled(url)),
        }
    }
}

fn transport_error(url: &Url, error: reqwest::Error) -> KonutError {
    KonutError::Fetch {
        url: url.to_string(),
        status: None,
        reason: error.to_string(),
    }
}

fn cancelled(url: &Url) -> KonutError {
    KonutError::Cancelled {
        url: url.to_string(),
    }
}
