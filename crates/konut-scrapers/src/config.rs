use konut_core::{KonutError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.emlakjet.com";
pub const DEFAULT_LISTING_TYPE: &str = "kiralik-konut";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36";

/// What to do when a listing detail page cannot be fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Abort the whole run and return no dataset.
    #[default]
    FailFast,
    /// Record the failure on the dataset and keep going.
    SkipAndContinue,
}

/// CSS selectors for the parts of the site's markup the scraper reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupConfig {
    pub listing_anchor: String,
    pub listing_price: String,
    pub price_text: String,
    pub detail_attribute: String,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            listing_anchor: "a._3qUI9q".to_string(),
            listing_price: "p._2C5UCT".to_string(),
            price_text: "span".to_string(),
            detail_attribute: "div._1bVOdb".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub base_url: String,
    pub listing_type: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    /// Detail pages fetched at once. 1 fetches strictly in link order.
    pub concurrency: usize,
    pub failure_policy: FailurePolicy,
    pub markup: MarkupConfig,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            listing_type: DEFAULT_LISTING_TYPE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            max_retries: 2,
            retry_backoff_ms: 500,
            concurrency: 1,
            failure_policy: FailurePolicy::FailFast,
            markup: MarkupConfig::default(),
        }
    }
}

impl ScraperConfig {
    /// Load a JSON config file. Missing keys keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Reject settings that would make every request fail.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(KonutError::Config(
                "timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(KonutError::Config(
                "concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}
