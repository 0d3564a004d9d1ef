//! Pure post-extraction stages: bounds filter, dedup, rank, label, summary.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{FilterConfig, PriceQuote, PriceSummary};

// ── Filter ────────────────────────────────────────────────────────────────────

/// Keep values inside the inclusive plausibility bounds, encounter order.
pub fn filter_prices(values: Vec<Decimal>, filter: &FilterConfig) -> Vec<Decimal> {
    values
        .into_iter()
        .filter(|v| filter.min_price <= *v && *v <= filter.max_price)
        .collect()
}

// ── Dedup + rank ──────────────────────────────────────────────────────────────

/// Collapse to distinct values, cheapest first, truncated to the cap.
/// Truncation drops the most expensive values, never the cheapest.
pub fn dedup_ascending(mut values: Vec<Decimal>, max_results: usize) -> Vec<Decimal> {
    values.sort();
    values.dedup();
    values.truncate(max_results);
    values
}

/// Attach 1-based ranks and marketplace labels to an ascending distinct list.
pub fn build_quotes(values: Vec<Decimal>, marketplaces: &[String]) -> Vec<PriceQuote> {
    values
        .into_iter()
        .enumerate()
        .map(|(idx, price_usd)| {
            let rank = idx as u32 + 1;
            PriceQuote {
                marketplace: label_for_rank(marketplaces, rank),
                price_usd,
                rank,
            }
        })
        .collect()
}

/// Label for a 1-based rank; wraps past the table end so every rank gets
/// one. An empty table degrades to a positional placeholder.
pub fn label_for_rank(marketplaces: &[String], rank: u32) -> String {
    if marketplaces.is_empty() {
        return format!("Market_{rank}");
    }
    marketplaces[(rank as usize - 1) % marketplaces.len()].clone()
}

// ── Summary ───────────────────────────────────────────────────────────────────

/// Aggregate over the final ranked list. The average rounds half away from
/// zero at two decimal places.
pub fn summarize(quotes: &[PriceQuote]) -> PriceSummary {
    let total = quotes.len();
    let best_price = quotes.first().map(|q| q.price_usd).unwrap_or_default();
    let avg_price = if total == 0 {
        Decimal::ZERO
    } else {
        let sum: Decimal = quotes.iter().map(|q| q.price_usd).sum();
        (sum / Decimal::from(total))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    };
    PriceSummary {
        total,
        best_price,
        avg_price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::collection::vec;
    use proptest::prelude::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn decs(values: &[&str]) -> Vec<Decimal> {
        values.iter().map(|s| dec(s)).collect()
    }

    fn table(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    /// Realistic 2 dp prices between $10.00 and $4000.00.
    fn arb_price() -> impl Strategy<Value = Decimal> {
        (1_000i64..=400_000).prop_map(|cents| Decimal::new(cents, 2))
    }

    #[test]
    fn test_filter_bounds_are_inclusive() {
        let filter = FilterConfig::wide();
        let kept = filter_prices(decs(&["49.99", "50.00", "3000.00", "3000.01"]), &filter);
        assert_eq!(kept, decs(&["50.00", "3000.00"]));
    }

    #[test]
    fn test_dedup_sorts_collapses_and_caps() {
        let out = dedup_ascending(decs(&["250.00", "199.99", "199.99", "210.00"]), 2);
        assert_eq!(out, decs(&["199.99", "210.00"]));
    }

    #[test]
    fn test_ranked_narrow_profile_scenario() {
        // $199.99 twice, $250.00, $1000.00 against the [190, 350] profile:
        // the duplicate collapses, the outlier is out of bounds.
        let filter = FilterConfig::narrow();
        let kept = filter_prices(decs(&["199.99", "199.99", "250.00", "1000.00"]), &filter);
        let distinct = dedup_ascending(kept, filter.max_results);
        let quotes = build_quotes(distinct, &table(&["CSFloat", "Skinport"]));

        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].price_usd, dec("199.99"));
        assert_eq!(quotes[0].rank, 1);
        assert_eq!(quotes[0].marketplace, "CSFloat");
        assert_eq!(quotes[1].price_usd, dec("250.00"));
        assert_eq!(quotes[1].rank, 2);

        let summary = summarize(&quotes);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.best_price, dec("199.99"));
        // (199.99 + 250.00) / 2 = 224.995 rounds up, not down to 224.99.
        assert_eq!(summary.avg_price, dec("225.00"));
    }

    #[test]
    fn test_cap_keeps_the_cheapest() {
        // Twenty distinct values, cap 15: exactly the five most expensive go.
        let values: Vec<Decimal> = (1..=20).map(|n| Decimal::new(n * 100 + 99, 2)).collect();
        let out = dedup_ascending(values.clone(), 15);
        assert_eq!(out.len(), 15);
        assert_eq!(out, values[..15]);
    }

    #[test]
    fn test_labels_wrap_past_table_end() {
        let t = table(&["A", "B", "C"]);
        assert_eq!(label_for_rank(&t, 1), "A");
        assert_eq!(label_for_rank(&t, 3), "C");
        assert_eq!(label_for_rank(&t, 4), "A");
        assert_eq!(label_for_rank(&t, 7), "A");
    }

    #[test]
    fn test_empty_table_degrades_to_placeholder() {
        assert_eq!(label_for_rank(&[], 3), "Market_3");
    }

    #[test]
    fn test_average_rounds_half_away_from_zero() {
        // 100.005 is the tie case where bankers rounding would give 100.00.
        let quotes = build_quotes(decs(&["100.00", "100.01"]), &table(&["A"]));
        assert_eq!(summarize(&quotes).avg_price, dec("100.01"));
    }

    #[test]
    fn test_summary_of_empty_list_is_zeroed() {
        let summary = summarize(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.best_price, Decimal::ZERO);
        assert_eq!(summary.avg_price, Decimal::ZERO);
    }

    proptest! {
        #[test]
        fn prop_filtered_values_respect_bounds(values in vec(arb_price(), 0..64)) {
            let filter = FilterConfig::wide();
            for v in filter_prices(values, &filter) {
                prop_assert!(filter.min_price <= v && v <= filter.max_price);
            }
        }

        #[test]
        fn prop_dedup_is_the_cheapest_distinct_prefix(
            values in vec(arb_price(), 0..64),
            cap in 1usize..20,
        ) {
            let kept = dedup_ascending(values.clone(), cap);

            let mut distinct = values;
            distinct.sort();
            distinct.dedup();
            let expected: Vec<Decimal> = distinct.into_iter().take(cap).collect();

            prop_assert_eq!(kept, expected);
        }

        #[test]
        fn prop_ranks_are_contiguous_and_prices_ascend(values in vec(arb_price(), 1..64)) {
            let marketplaces = table(&["A", "B", "C", "D"]);
            let quotes = build_quotes(dedup_ascending(values, 15), &marketplaces);

            for (idx, quote) in quotes.iter().enumerate() {
                prop_assert_eq!(quote.rank, idx as u32 + 1);
                prop_assert_eq!(&quote.marketplace, &marketplaces[idx % marketplaces.len()]);
            }
            prop_assert!(quotes.windows(2).all(|w| w[0].price_usd < w[1].price_usd));
        }

        #[test]
        fn prop_summary_stays_inside_the_price_range(values in vec(arb_price(), 1..64)) {
            let quotes = build_quotes(dedup_ascending(values, 15), &table(&["A"]));
            let summary = summarize(&quotes);

            prop_assert_eq!(summary.total, quotes.len());
            prop_assert_eq!(summary.best_price, quotes[0].price_usd);
            let last = quotes[quotes.len() - 1].price_usd;
            prop_assert!(summary.best_price <= summary.avg_price);
            prop_assert!(summary.avg_price <= last);
        }
    }
}
