//! Headless Chromium driving for dynamically rendered marketplace pages.
//!
//! Every call launches a fresh, isolated browser, renders exactly one page
//! and tears the process down again. There is deliberately no pooling or
//! reuse: N concurrent lookups cost N browser processes, in exchange every
//! lookup observes live page state with zero cross-request bleed.

use std::future::Future;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetTimezoneOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::error::CdpError;
use chromiumoxide::handler::viewport::Viewport;
use futures::StreamExt;
use tracing::{debug, warn};
use url::Url;

use crate::config::ScraperConfig;
use crate::error::PriceError;
use crate::models::PageSnapshot;
use crate::scraper::extract;

/// Registered before any page script runs; masks the obvious automation
/// fingerprints that aggregator pages check before rendering prices.
const STEALTH_INIT: &str = r#"
Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
window.chrome = { runtime: {} };
const originalQuery = window.navigator.permissions.query;
window.navigator.permissions.query = (parameters) => (
    parameters.name === 'notifications'
        ? Promise.resolve({ state: 'denied' })
        : originalQuery(parameters)
);
"#;

const BODY_TEXT_JS: &str = "document.body ? document.body.innerText : ''";

/// Render `url` and harvest markup plus visible body text.
///
/// The browser is torn down on every exit path, success or failure.
/// Navigation runs under `nav_timeout_secs`; the settle delay afterwards
/// gives client-side rendering time to populate price elements.
pub async fn render_page(config: &ScraperConfig, url: &Url) -> Result<PageSnapshot, PriceError> {
    let browser_config = build_browser_config(config).map_err(PriceError::FetchFailed)?;

    let (mut browser, mut handler) = Browser::launch(browser_config).await?;
    let cdp_loop = tokio::spawn(async move { while handler.next().await.is_some() {} });

    let result = render(&browser, config, url).await;

    if let Err(err) = browser.close().await {
        warn!("Browser close failed, killing the process: {}", err);
        let _ = browser.kill().await;
    }
    let _ = browser.wait().await;
    cdp_loop.abort();

    result
}

fn build_browser_config(config: &ScraperConfig) -> Result<BrowserConfig, String> {
    BrowserConfig::builder()
        .viewport(Some(Viewport {
            width: config.viewport_width,
            height: config.viewport_height,
            device_scale_factor: Some(1.0),
            ..Default::default()
        }))
        .args(vec![
            "--no-sandbox".to_string(),
            "--disable-blink-features=AutomationControlled".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-gpu".to_string(),
            "--lang=en-US".to_string(),
            format!("--user-agent={}", config.user_agent),
        ])
        .build()
}

async fn render(
    browser: &Browser,
    config: &ScraperConfig,
    url: &Url,
) -> Result<PageSnapshot, PriceError> {
    let page = browser.new_page("about:blank").await?;

    // Must be injected before navigation so it runs ahead of page scripts.
    page.execute(AddScriptToEvaluateOnNewDocumentParams::new(STEALTH_INIT))
        .await?;
    // Timezone is pinned per page, alongside the UA, viewport and locale set
    // at launch.
    page.execute(SetTimezoneOverrideParams::new(config.timezone_id.clone()))
        .await?;

    let limit = Duration::from_secs(config.nav_timeout_secs);
    with_nav_timeout(limit, async {
        page.goto(url.as_str()).await?;
        page.wait_for_navigation().await?;
        Ok::<_, CdpError>(())
    })
    .await?;

    // Prices appear well after the load event on these pages.
    tokio::time::sleep(Duration::from_millis(config.settle_ms)).await;

    let html = page.content().await?;

    let visible_text = match page.evaluate(BODY_TEXT_JS).await {
        Ok(value) => value.into_value::<String>().unwrap_or_default(),
        Err(err) => {
            debug!("Body text evaluation failed: {}", err);
            String::new()
        }
    };
    let visible_text = if visible_text.trim().is_empty() && !html.is_empty() {
        extract::visible_text_from_markup(&html)
    } else {
        visible_text
    };

    Ok(PageSnapshot { html, visible_text })
}

/// Bound a navigation future: elapsed deadline becomes [`PriceError::FetchTimeout`],
/// failures inside the window keep their own mapping.
async fn with_nav_timeout<T, E>(
    limit: Duration,
    fut: impl Future<Output = Result<T, E>>,
) -> Result<T, PriceError>
where
    PriceError: From<E>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(PriceError::from(err)),
        Err(_) => Err(PriceError::FetchTimeout { limit }),
    }
}
