//! Currency-token extraction from rendered page content.
//!
//! Two passes over one [`PageSnapshot`]:
//!
//! 1. Primary: symbol-anchored tokens (`$1,234.56`) in the raw markup.
//! 2. Fallback: the same shape with an optional symbol, scanned over the
//!    rendered body text. Only runs when the primary pass matches nothing,
//!    which happens on pages that compose the currency symbol client-side.
//!
//! Tokens that fail to parse are dropped silently; extraction never fails,
//! it just yields fewer candidates.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use scraper::{Html, Selector};
use tracing::debug;

use crate::models::PageSnapshot;

// ── Token patterns ────────────────────────────────────────────────────────────

/// `$` + 1-3 digits + comma-separated 3-digit groups + exactly two decimals.
static PRICE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(\d{1,3}(?:,\d{3})*\.\d{2})").unwrap()
});

/// Same numeric shape, but the symbol (and any gap after it) is optional.
static FALLBACK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$?\s*(\d{1,3}(?:,\d{3})*\.\d{2})").unwrap()
});

// ── Extraction ────────────────────────────────────────────────────────────────

/// Candidate prices for one snapshot, in encounter order, unfiltered.
pub fn extract_prices(snapshot: &PageSnapshot) -> Vec<Decimal> {
    let primary: Vec<Decimal> = scan_tokens(&PRICE_PATTERN, &snapshot.html)
        .filter_map(parse_price_token)
        .collect();
    if !primary.is_empty() {
        return primary;
    }

    debug!("No symbol-anchored tokens in markup, scanning rendered text");
    scan_tokens(&FALLBACK_PATTERN, &snapshot.visible_text)
        .filter_map(parse_price_token)
        .collect()
}

/// Lazily yield the numeric capture of every non-overlapping match.
fn scan_tokens<'a>(pattern: &'a Regex, text: &'a str) -> impl Iterator<Item = &'a str> {
    pattern
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}

/// One raw token (`"1,234.56"`) to a 2 dp price. Noise yields `None`.
pub fn parse_price_token(raw: &str) -> Option<Decimal> {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    let value: Decimal = cleaned.parse().ok()?;
    Some(value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

// ── Visible text ──────────────────────────────────────────────────────────────

/// Approximate the rendered body text from markup alone. Used when the
/// in-page `innerText` evaluation comes back empty.
pub fn visible_text_from_markup(html: &str) -> String {
    let doc = Html::parse_document(html);
    let Ok(body) = Selector::parse("body") else {
        return String::new();
    };
    let texts: Vec<&str> = match doc.select(&body).next() {
        Some(el) => el.text().collect(),
        None => doc.root_element().text().collect(),
    };
    texts.join(" ")
}
