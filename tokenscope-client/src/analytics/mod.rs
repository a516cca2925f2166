//! Derived-analytics pipeline.
//!
//! Pure functions from (records, configuration) to filtered, sorted,
//! risk-scored views. Evaluated fresh on every records-or-config change; no
//! incremental memoisation.

pub mod filter;
pub mod score;
pub mod sort;
pub mod view;

pub use filter::{filter_records, passes};
pub use score::{classify, RiskLevel, RiskScore};
pub use sort::{compare, key_value, sort_records};
pub use view::{assemble, ScoredToken};
