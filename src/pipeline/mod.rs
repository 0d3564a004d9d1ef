//! Pipeline orchestrator: fetch → extract → filter → dedup/rank → summary.
//!
//! ## Run model
//!
//! Every `run()` is one independent lookup: a cold page fetch, pure
//! post-processing, no retries, no caching, no partial results. The only
//! short-circuits are fetch failures and an empty distinct set after
//! filtering, which surfaces as [`PriceError::NoQuotesFound`].

pub mod ranking;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};
use url::Url;

use crate::config::AppConfig;
use crate::error::PriceError;
use crate::models::{FilterConfig, PriceReport};
use crate::scraper::{extract, PageFetcher};

use self::ranking::{build_quotes, dedup_ascending, filter_prices, summarize};

pub struct PricePipeline {
    fetcher: Arc<dyn PageFetcher>,
    base_url: Url,
    marketplaces: Vec<String>,
    defaults: FilterConfig,
}

impl PricePipeline {
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: &AppConfig) -> Result<Self> {
        let base_url = Url::parse(config.scraper.base_url.trim_end_matches('/'))
            .with_context(|| format!("Invalid base URL {:?}", config.scraper.base_url))?;
        Ok(Self {
            fetcher,
            base_url,
            marketplaces: config.marketplaces.clone(),
            defaults: config.filter.clone(),
        })
    }

    /// The configured filter profile, before per-request overrides.
    pub fn default_filter(&self) -> &FilterConfig {
        &self.defaults
    }

    /// URL for an item page. Slugs may span several path segments,
    /// e.g. `glove/sport-gloves-arctic/factory-new`.
    fn item_url(&self, slug: &str) -> Result<Url, PriceError> {
        let slug = slug.trim_matches('/');
        let joined = format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), slug);
        Url::parse(&joined).map_err(|err| {
            PriceError::FetchFailed(format!("invalid item URL for {:?}: {}", slug, err))
        })
    }

    pub async fn run(&self, slug: &str, filter: &FilterConfig) -> Result<PriceReport, PriceError> {
        let url = self.item_url(slug)?;

        // ── 1. Fetch the rendered page ────────────────────────────────────────
        info!("Fetching {}", url);
        let snapshot = self.fetcher.fetch_page(&url).await?;
        debug!(
            "Rendered {} bytes of markup, {} bytes of text",
            snapshot.html.len(),
            snapshot.visible_text.len()
        );

        // ── 2. Extract, filter, dedup ─────────────────────────────────────────
        let candidates = extract::extract_prices(&snapshot);
        let candidate_count = candidates.len();

        let in_bounds = filter_prices(candidates, filter);
        let in_bounds_count = in_bounds.len();

        let distinct = dedup_ascending(in_bounds, filter.max_results);
        debug!(
            "{}: {} tokens | {} in [{}, {}] | {} distinct",
            slug, candidate_count, in_bounds_count, filter.min_price, filter.max_price,
            distinct.len()
        );

        if distinct.is_empty() {
            info!("{}: no quotes survived extraction and filtering", slug);
            return Err(PriceError::NoQuotesFound);
        }

        // ── 3. Rank, label, summarize ─────────────────────────────────────────
        let quotes = build_quotes(distinct, &self.marketplaces);
        let summary = summarize(&quotes);
        info!(
            "{}: {} quotes | best {} | avg {}",
            slug, summary.total, summary.best_price, summary.avg_price
        );

        Ok(PriceReport { quotes, summary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PageSnapshot;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::time::Duration;
    use tokio_test::assert_ok;

    struct FixedFetcher {
        html: &'static str,
        visible_text: &'static str,
    }

    #[async_trait]
    impl PageFetcher for FixedFetcher {
        async fn fetch_page(&self, _url: &Url) -> Result<PageSnapshot, PriceError> {
            Ok(PageSnapshot {
                html: self.html.to_string(),
                visible_text: self.visible_text.to_string(),
            })
        }
    }

    struct TimedOutFetcher;

    #[async_trait]
    impl PageFetcher for TimedOutFetcher {
        async fn fetch_page(&self, _url: &Url) -> Result<PageSnapshot, PriceError> {
            Err(PriceError::FetchTimeout {
                limit: Duration::from_secs(40),
            })
        }
    }

    fn pipeline_with(fetcher: impl PageFetcher + 'static) -> PricePipeline {
        PricePipeline::new(Arc::new(fetcher), &AppConfig::default()).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_run_ranks_and_labels_marketplace_quotes() {
        let pipeline = pipeline_with(FixedFetcher {
            html: "<span>$199.99</span> <span>$199.99</span> <span>$250.00</span> <span>$1,000.00</span>",
            visible_text: "",
        });
        let filter = FilterConfig::narrow();

        let report = assert_ok!(pipeline.run("item/test-slug", &filter).await);

        assert_eq!(report.quotes.len(), 2);
        assert_eq!(report.quotes[0].marketplace, "CSFloat");
        assert_eq!(report.quotes[0].price_usd, dec("199.99"));
        assert_eq!(report.quotes[0].rank, 1);
        assert_eq!(report.quotes[1].marketplace, "Skinport");
        assert_eq!(report.quotes[1].price_usd, dec("250.00"));
        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.best_price, dec("199.99"));
        assert_eq!(report.summary.avg_price, dec("225.00"));
    }

    #[tokio::test]
    async fn test_run_uses_text_fallback_when_markup_has_no_tokens() {
        let pipeline = pipeline_with(FixedFetcher {
            html: "<div class=\"prices\">loading</div>",
            visible_text: "Best offer 199.99 next 205.50",
        });

        let report = pipeline
            .run("item/test-slug", &FilterConfig::wide())
            .await
            .unwrap();

        assert_eq!(report.quotes.len(), 2);
        assert_eq!(report.summary.best_price, dec("199.99"));
    }

    #[tokio::test]
    async fn test_empty_page_is_no_quotes_found() {
        let pipeline = pipeline_with(FixedFetcher {
            html: "<html><body>nothing for sale</body></html>",
            visible_text: "nothing for sale",
        });

        let err = pipeline
            .run("item/test-slug", &FilterConfig::wide())
            .await
            .unwrap_err();

        assert!(matches!(err, PriceError::NoQuotesFound));
    }

    #[tokio::test]
    async fn test_all_out_of_bounds_is_no_quotes_found() {
        let pipeline = pipeline_with(FixedFetcher {
            html: "<span>$5.00</span> <span>$9,999.99</span>",
            visible_text: "",
        });

        let err = pipeline
            .run("item/test-slug", &FilterConfig::wide())
            .await
            .unwrap_err();

        assert!(matches!(err, PriceError::NoQuotesFound));
    }

    #[tokio::test]
    async fn test_fetch_timeout_propagates_unchanged() {
        let pipeline = pipeline_with(TimedOutFetcher);

        let err = pipeline
            .run("item/test-slug", &FilterConfig::wide())
            .await
            .unwrap_err();

        assert!(matches!(err, PriceError::FetchTimeout { .. }));
    }

    #[test]
    fn test_item_url_joins_multi_segment_slugs() {
        let pipeline = pipeline_with(FixedFetcher {
            html: "",
            visible_text: "",
        });
        let url = pipeline
            .item_url("glove/sport-gloves-arctic/factory-new")
            .unwrap();
        assert!(url
            .as_str()
            .ends_with("/glove/sport-gloves-arctic/factory-new"));
    }
}
