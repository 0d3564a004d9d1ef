pub mod browser;
pub mod extract;

use async_trait::async_trait;
use url::Url;

use crate::config::ScraperConfig;
use crate::error::PriceError;
use crate::models::PageSnapshot;

// ── Fetcher trait ─────────────────────────────────────────────────────────────

/// Swappable page-rendering abstraction. The pipeline only ever sees this
/// seam, which keeps every stage past fetching testable without a browser.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &Url) -> Result<PageSnapshot, PriceError>;
}

// ── Headless fetcher ──────────────────────────────────────────────────────────

/// Renders pages with a dedicated headless Chromium per call.
pub struct HeadlessFetcher {
    config: ScraperConfig,
}

impl HeadlessFetcher {
    pub fn new(config: &ScraperConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

#[async_trait]
impl PageFetcher for HeadlessFetcher {
    async fn fetch_page(&self, url: &Url) -> Result<PageSnapshot, PriceError> {
        browser::render_page(&self.config, url).await
    }
}
