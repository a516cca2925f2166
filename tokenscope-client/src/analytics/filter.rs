//! Filter pipeline: pure predicate over (record, config).
//!
//! Predicates run in a fixed order and all must pass: search, numeric
//! thresholds, honeypot mode, risk-level toggles, stagnation. Truncation to
//! `max_records` is *not* applied here - it is a prefix cut of the sorted
//! sequence and therefore belongs after sorting (see the view assembly).

use crate::{
    analytics::score::{classify, RiskLevel},
    config::{FilterConfig, HoneypotMode},
    token::TokenRecord,
};

/// Whether one record passes every active filter predicate.
pub fn passes(record: &TokenRecord, config: &FilterConfig) -> bool {
    // 1. Free-text search against name or symbol, case-insensitive.
    if !config.search_query.is_empty() {
        let query = config.search_query.to_lowercase();
        let name_match = record.name.to_lowercase().contains(&query);
        let symbol_match = record.symbol.to_lowercase().contains(&query);
        if !name_match && !symbol_match {
            return false;
        }
    }

    // 2. Numeric thresholds.
    if record.gp_holder_count < config.min_holders || record.liquidity < config.min_liquidity {
        return false;
    }

    // 3. Honeypot visibility mode. `hide` runs before `only`, so the
    // contradictory hide+only combination deterministically yields the
    // empty set.
    match config.honeypot_mode {
        HoneypotMode::Hide if record.is_honeypot => return false,
        HoneypotMode::Only if !record.is_honeypot => return false,
        _ => {}
    }

    // 4. Risk-level toggles, all independently combinable. The level comes
    // from the one authoritative classification.
    let level = classify(record);
    if config.hide_dangerous && level == RiskLevel::Danger {
        return false;
    }
    if config.hide_warning && level == RiskLevel::Warning {
        return false;
    }
    if config.safe_only && level != RiskLevel::Safe {
        return false;
    }

    // 5. Stagnation, evaluated only once enough scans have been observed.
    if record.total_scans >= config.stagnant_record_count {
        if config.hide_stagnant_holders && !record.holder_count_changed {
            return false;
        }
        if config.hide_stagnant_liquidity && !record.liquidity_changed {
            return false;
        }
    }

    true
}

/// Filter a collection, preserving input order.
pub fn filter_records(records: &[TokenRecord], config: &FilterConfig) -> Vec<TokenRecord> {
    records
        .iter()
        .filter(|record| passes(record, config))
        .cloned()
        .collect()
}
