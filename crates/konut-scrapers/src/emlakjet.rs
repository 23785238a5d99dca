use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use konut_core::{
    aggregate, normalize, Dataset, KonutError, ListingFailure, ListingLink, ListingRecord,
    NormalizedRecord, RawFieldPair, RawPriceText, Result,
};
use scraper::{Html, Selector};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::{FailurePolicy, MarkupConfig, ScraperConfig};
use crate::fetch::PageFetcher;
use crate::{ListingScraper, SearchTarget};

/// Compiled selectors for the search and detail page markup.
#[derive(Debug, Clone)]
pub struct ListingSelectors {
    listing_anchor: Selector,
    listing_price: Selector,
    price_text: Selector,
    detail_attribute: Selector,
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| KonutError::Scraping(format!("{}: {}", selector, e)))
}

impl ListingSelectors {
    pub fn new(markup: &MarkupConfig) -> Result<Self> {
        Ok(Self {
            listing_anchor: parse_selector(&markup.listing_anchor)?,
            listing_price: parse_selector(&markup.listing_price)?,
            price_text: parse_selector(&markup.price_text)?,
            detail_attribute: parse_selector(&markup.detail_attribute)?,
        })
    }
}

/// `<base>/<listing type>/<city>[-<district>]`. City and district are used
/// as given; callers pass identifiers that already went through
/// `normalize_label`.
pub fn build_search_url(base_url: &str, listing_type: &str, target: &SearchTarget) -> String {
    format!(
        "{}/{}/{}",
        base_url.trim_end_matches('/'),
        listing_type,
        target.slug()
    )
}

fn element_text(element: scraper::ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Listing links and price texts from a search results page, each in
/// document order and indexed from zero. The two lists are not aligned
/// here and may differ in length.
pub fn extract_links_and_prices(
    html: &str,
    selectors: &ListingSelectors,
) -> (Vec<ListingLink>, Vec<RawPriceText>) {
    let document = Html::parse_document(html);

    let links = document
        .select(&selectors.listing_anchor)
        .enumerate()
        .map(|(index, anchor)| ListingLink {
            index,
            href: anchor
                .value()
                .attr("href")
                .map(str::trim)
                .filter(|href| !href.is_empty())
                .map(str::to_string),
        })
        .collect();

    let prices = document
        .select(&selectors.listing_price)
        .enumerate()
        .map(|(index, price)| RawPriceText {
            index,
            text: price.select(&selectors.price_text).next().map(element_text),
        })
        .collect();

    (links, prices)
}

/// Label/value pairs from a detail page. Matching elements alternate label,
/// value, label, value; a trailing label without a value is dropped.
pub fn extract_raw_pairs(html: &str, selectors: &ListingSelectors) -> Vec<RawFieldPair> {
    let document = Html::parse_document(html);
    let cells: Vec<String> = document
        .select(&selectors.detail_attribute)
        .map(element_text)
        .collect();

    cells
        .chunks_exact(2)
        .map(|pair| RawFieldPair {
            label: pair[0].clone(),
            value: pair[1].clone(),
        })
        .collect()
}

pub struct EmlakjetScraper {
    config: ScraperConfig,
    fetcher: PageFetcher,
    selectors: ListingSelectors,
    base_url: Url,
}

impl EmlakjetScraper {
    pub fn new(config: ScraperConfig) -> Result<Self> {
        config.validate()?;
        let fetcher = PageFetcher::new(&config)?;
        let selectors = ListingSelectors::new(&config.markup)?;
        let base_url = Url::parse(&config.base_url)?;

        Ok(Self {
            config,
            fetcher,
            selectors,
            base_url,
        })
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// `<base>/<href>` for site-relative links, keeping any path prefix on
    /// the base URL. Absolute links are used as they are.
    fn detail_url(&self, href: &str) -> Result<Url> {
        if let Ok(url) = Url::parse(href) {
            return Ok(url);
        }

        let url = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            href.trim_start_matches('/')
        );
        Ok(Url::parse(&url)?)
    }

    /// Fetch and normalize one listing. Links without an href produce an
    /// empty record so the listing keeps its place next to its price.
    async fn scrape_listing(
        &self,
        link: ListingLink,
        cancel: &CancellationToken,
    ) -> (ListingLink, Result<NormalizedRecord>) {
        let Some(href) = link.href.as_deref() else {
            debug!("Listing {} has no link, leaving it empty", link.index);
            return (link, Ok(NormalizedRecord::new()));
        };

        let result = match self.detail_url(href) {
            Ok(url) => self.fetcher.fetch(&url, cancel).await.map(|page| {
                let pairs = extract_raw_pairs(&page.html, &self.selectors);
                let record = normalize(&pairs);
                debug!(
                    "Listing {} ({}): {} attributes, {} recognized",
                    link.index,
                    url,
                    pairs.len(),
                    record.len()
                );
                record
            }),
            Err(e) => Err(e),
        };

        (link, result)
    }
}

#[async_trait]
impl ListingScraper for EmlakjetScraper {
    fn search_url(&self, target: &SearchTarget) -> Result<Url> {
        let url = build_search_url(&self.config.base_url, &self.config.listing_type, target);
        Ok(Url::parse(&url)?)
    }

    async fn scrape(&self, target: &SearchTarget, cancel: &CancellationToken) -> Result<Dataset> {
        let url = self.search_url(target)?;
        info!("Scraping search page: {}", url);

        let page = match self.fetcher.fetch(&url, cancel).await {
            Ok(page) => page,
            Err(e) => {
                error!("Unable to fetch the search page for {}: {}", target, e);
                return Err(e);
            }
        };

        let (links, prices) = extract_links_and_prices(&page.html, &self.selectors);
        info!("Found {} listing links and {} prices", links.len(), prices.len());
        if links.len() != prices.len() {
            warn!(
                "Link and price counts differ ({} vs {}), unmatched listings will be dropped",
                links.len(),
                prices.len()
            );
        }

        let mut records = Vec::with_capacity(links.len());
        let mut failures = Vec::new();

        let mut details = stream::iter(links)
            .map(|link| self.scrape_listing(link, cancel))
            .buffered(self.config.concurrency.max(1));

        while let Some((link, result)) = details.next().await {
            match result {
                Ok(fields) => records.push(ListingRecord::new(link.index, link.href, fields)),
                Err(e @ KonutError::Cancelled { .. }) => {
                    warn!("Scrape of {} cancelled", target);
                    return Err(e);
                }
                Err(e) => match self.config.failure_policy {
                    FailurePolicy::FailFast => {
                        error!("Unable to fetch listing {} for {}: {}", link.index, target, e);
                        return Err(e);
                    }
                    FailurePolicy::SkipAndContinue => {
                        warn!("Skipping listing {}: {}", link.index, e);
                        failures.push(ListingFailure {
                            index: link.index,
                            url: link.href.clone().unwrap_or_default(),
                            reason: e.to_string(),
                        });
                        records.push(ListingRecord::new(link.index, link.href, NormalizedRecord::new()));
                    }
                },
            }
        }

        let mut dataset = Dataset::new(target.to_string(), aggregate(records, &prices));
        dataset.failures = failures;

        info!(
            "Scraped {} listings for {} ({} failed)",
            dataset.len(),
            target,
            dataset.failures.len()
        );

        Ok(dataset)
    }
}
