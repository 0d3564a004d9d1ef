use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ── Page snapshot ─────────────────────────────────────────────────────────────

/// What the fetcher hands downstream: the rendered markup plus the visible
/// text of the body. Extraction scans the markup first and only falls back
/// to the text when the markup carries no symbol-anchored price tokens.
#[derive(Debug, Clone, Default)]
pub struct PageSnapshot {
    pub html: String,
    pub visible_text: String,
}

// ── Price quote ───────────────────────────────────────────────────────────────

/// One distinct price with its 1-based rank and synthetic marketplace label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceQuote {
    pub marketplace: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price_usd: Decimal,
    pub rank: u32,
}

// ── Summary ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceSummary {
    pub total: usize,
    /// The rank-1 price, i.e. the cheapest after dedup.
    #[serde(with = "rust_decimal::serde::float")]
    pub best_price: Decimal,
    /// Mean over the final list, rounded half away from zero to 2 dp.
    #[serde(with = "rust_decimal::serde::float")]
    pub avg_price: Decimal,
}

/// Full result of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceReport {
    pub quotes: Vec<PriceQuote>,
    pub summary: PriceSummary,
}

// ── Filter profile ────────────────────────────────────────────────────────────

/// Inclusive plausibility bounds plus the result cap for one run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilterConfig {
    #[serde(default = "default_min_price")]
    pub min_price: Decimal,
    #[serde(default = "default_max_price")]
    pub max_price: Decimal,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_min_price() -> Decimal {
    Decimal::from(50)
}

fn default_max_price() -> Decimal {
    Decimal::from(3000)
}

fn default_max_results() -> usize {
    15
}

impl FilterConfig {
    /// Catch-all profile for arbitrary items.
    pub fn wide() -> Self {
        Self {
            min_price: Decimal::from(50),
            max_price: Decimal::from(3000),
            max_results: 15,
        }
    }

    /// Tight profile tuned for a known mid-range item band.
    pub fn narrow() -> Self {
        Self {
            min_price: Decimal::from(190),
            max_price: Decimal::from(350),
            max_results: 12,
        }
    }

    /// This profile with any provided per-request overrides applied.
    pub fn merged(
        &self,
        min_price: Option<Decimal>,
        max_price: Option<Decimal>,
        max_results: Option<usize>,
    ) -> Self {
        Self {
            min_price: min_price.unwrap_or(self.min_price),
            max_price: max_price.unwrap_or(self.max_price),
            max_results: max_results.unwrap_or(self.max_results),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self::wide()
    }
}
