//! Visible-set assembly: filter -> sort -> prefix cut -> score.
//!
//! The contract with presentation is that the visible set is the first
//! `max_records` elements of the full filtered-and-sorted sequence; the cut
//! is a prefix, never a top-K reselection.

use crate::{
    analytics::{filter::filter_records, score::RiskScore, sort::sort_records},
    config::FilterConfig,
    token::TokenRecord,
};

/// One row of the visible set: the record plus its scoring breakdown.
#[derive(Debug, Clone)]
pub struct ScoredToken {
    pub record: TokenRecord,
    pub score: RiskScore,
}

/// Derive the visible, risk-scored rows from the raw collection.
pub fn assemble(records: &[TokenRecord], config: &FilterConfig) -> Vec<ScoredToken> {
    let mut filtered = filter_records(records, config);
    sort_records(&mut filtered, config.sort_key, config.sort_direction);
    filtered.truncate(config.max_records);

    filtered
        .into_iter()
        .map(|record| {
            let score = RiskScore::compute(&record);
            ScoredToken { record, score }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SortDirection, SortKey};

    fn record(symbol: &str, liquidity: f64) -> TokenRecord {
        TokenRecord {
            symbol: symbol.to_string(),
            is_open_source: true,
            liquidity,
            ..Default::default()
        }
    }

    #[test]
    fn test_visible_set_is_sorted_prefix() {
        let records: Vec<TokenRecord> = (0..10)
            .map(|i| record(&format!("T{i}"), f64::from(i) * 100.0))
            .collect();
        let config = FilterConfig {
            max_records: 3,
            sort_key: SortKey::Liquidity,
            sort_direction: SortDirection::Desc,
            ..Default::default()
        };

        let visible = assemble(&records, &config);
        let symbols: Vec<&str> = visible.iter().map(|v| v.record.symbol.as_str()).collect();
        // Truncation happens after sorting: the prefix holds the three
        // highest-liquidity records, not the first three inputs.
        assert_eq!(symbols, vec!["T9", "T8", "T7"]);
    }

    #[test]
    fn test_visible_set_never_exceeds_max_records() {
        let records: Vec<TokenRecord> = (0..200).map(|i| record(&format!("T{i}"), 0.0)).collect();
        let config = FilterConfig::default();
        assert_eq!(assemble(&records, &config).len(), 50);

        let config = FilterConfig {
            max_records: 7,
            ..Default::default()
        };
        assert_eq!(assemble(&records, &config).len(), 7);
    }

    #[test]
    fn test_rows_carry_scores_and_level() {
        let records = vec![record("AAA", 60_000.0)];
        let visible = assemble(&records, &FilterConfig::default());
        assert_eq!(visible.len(), 1);
        let row = &visible[0];
        assert!((0.0..=100.0).contains(&row.score.composite));
        assert_eq!(row.score.level, crate::analytics::score::RiskLevel::Safe);
    }

    #[test]
    fn test_empty_input_yields_empty_view() {
        assert!(assemble(&[], &FilterConfig::default()).is_empty());
    }
}
