pub mod config;
pub mod emlakjet;
pub mod fetch;

use async_trait::async_trait;
use konut_core::text::normalize_label;
use konut_core::{Dataset, Result};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

pub use config::{FailurePolicy, MarkupConfig, ScraperConfig};
pub use emlakjet::EmlakjetScraper;
pub use fetch::{PageFetcher, RawPage};

/// Enum representing the supported listing sites
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScraperType {
    /// Emlakjet - Turkish real estate classifieds
    Emlakjet,
}

/// Where to search: a city and, optionally, one of its districts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTarget {
    pub city: String,
    pub district: Option<String>,
}

impl SearchTarget {
    /// An empty district is treated as no district.
    pub fn new(city: &str, district: Option<&str>) -> Self {
        Self {
            city: city.to_string(),
            district: district.filter(|d| !d.is_empty()).map(str::to_string),
        }
    }

    /// Build a target from what a user typed, folding Turkish letters and
    /// spaces the way the site's URLs expect.
    pub fn from_user_input(city: &str, district: Option<&str>) -> Self {
        let district = district.map(normalize_label);
        Self::new(&normalize_label(city), district.as_deref())
    }

    /// `city` or `city-district`, as used in search URLs.
    pub fn slug(&self) -> String {
        match &self.district {
            Some(district) => format!("{}-{}", self.city, district),
            None => self.city.clone(),
        }
    }
}

impl fmt::Display for SearchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

/// Trait for building a dataset from one search results page of a listing site
#[async_trait]
pub trait ListingScraper: Send + Sync {
    /// The search results URL for `target`
    fn search_url(&self, target: &SearchTarget) -> Result<Url>;

    /// Fetch the search page, every listing on it, and assemble the dataset.
    /// Cancelling `cancel` aborts the run with `KonutError::Cancelled`.
    async fn scrape(&self, target: &SearchTarget, cancel: &CancellationToken) -> Result<Dataset>;
}

/// Factory for creating scraper instances
pub struct ScraperFactory;

impl ScraperFactory {
    /// Create a new scraper instance based on the specified type
    pub fn create_scraper(scraper_type: ScraperType, config: ScraperConfig) -> Result<Arc<dyn ListingScraper>> {
        match scraper_type {
            ScraperType::Emlakjet => Ok(Arc::new(EmlakjetScraper::new(config)?)),
        }
    }
}
