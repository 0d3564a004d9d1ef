use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::models::FilterConfig;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub scraper: ScraperConfig,

    #[serde(default)]
    pub filter: FilterConfig,

    /// Label table for ranked quotes, cheapest first. Ranks past the end
    /// wrap around.
    #[serde(default = "default_marketplaces")]
    pub marketplaces: Vec<String>,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Headless fetch configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScraperConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Deadline for navigation plus the page load wait.
    #[serde(default = "default_nav_timeout_secs")]
    pub nav_timeout_secs: u64,

    /// Post-load allowance for client-side price rendering.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// IANA zone reported to page scripts, pinned independently of the host.
    #[serde(default = "default_timezone_id")]
    pub timezone_id: String,

    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,

    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_base_url() -> String {
    "https://pricempire.com/cs2-items".to_string()
}
fn default_nav_timeout_secs() -> u64 {
    40
}
fn default_settle_ms() -> u64 {
    12_000
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}
fn default_timezone_id() -> String {
    "UTC".to_string()
}
fn default_viewport_width() -> u32 {
    1920
}
fn default_viewport_height() -> u32 {
    1080
}

fn default_marketplaces() -> Vec<String> {
    [
        "CSFloat",
        "Skinport",
        "TradeIt.GG",
        "CS.MONEY",
        "Skins.com",
        "Lis-skins",
        "SkinBaron",
        "White.Market",
        "SkinOut",
        "Buff.163",
        "Youpin",
        "DMarket",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("SKINPRICE").separator("__"))
            .build()?;

        let app_cfg: AppConfig = cfg.try_deserialize().unwrap_or_else(|_| AppConfig::default());
        Ok(app_cfg)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            scraper: ScraperConfig::default(),
            filter: FilterConfig::default(),
            marketplaces: default_marketplaces(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            nav_timeout_secs: default_nav_timeout_secs(),
            settle_ms: default_settle_ms(),
            user_agent: default_user_agent(),
            timezone_id: default_timezone_id(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scraper_defaults_pin_the_fingerprint() {
        let scraper = ScraperConfig::default();
        assert_eq!(scraper.timezone_id, "UTC");
        assert_eq!(scraper.viewport_width, 1920);
        assert_eq!(scraper.viewport_height, 1080);
        assert!(scraper.user_agent.contains("Chrome/"));
    }
}
