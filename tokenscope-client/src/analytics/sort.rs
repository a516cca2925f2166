//! Sort pipeline: stable comparator-based ordering over six keys.

use crate::{
    config::{SortDirection, SortKey},
    token::TokenRecord,
};
use std::cmp::Ordering;

/// Numeric value one record contributes under a sort key.
///
/// Missing wire values already defaulted to 0 at decode time. The safety
/// score is forced to 0 for honeypots regardless of the stored value, so a
/// honeypot can never sort as "safe".
pub fn key_value(record: &TokenRecord, key: SortKey) -> f64 {
    match key {
        SortKey::Records => record.total_scans as f64,
        SortKey::Age => record.age_hours,
        SortKey::CreationTime => record.creation_time as f64,
        SortKey::Holders => record.gp_holder_count as f64,
        SortKey::Liquidity => record.liquidity,
        SortKey::SafetyScore => {
            if record.is_honeypot {
                0.0
            } else {
                record.safety_score
            }
        }
    }
}

/// Compare two records under a key and direction.
pub fn compare(a: &TokenRecord, b: &TokenRecord, key: SortKey, direction: SortDirection) -> Ordering {
    let ordering = key_value(a, key).total_cmp(&key_value(b, key));
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

/// Stable in-place sort. Equal keys preserve relative input order, which the
/// visible-set prefix cut depends on for deterministic output.
pub fn sort_records(records: &mut [TokenRecord], key: SortKey, direction: SortDirection) {
    records.sort_by(|a, b| compare(a, b, key, direction));
}
