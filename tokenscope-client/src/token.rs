//! Core data types for scanned token records.
//!
//! These types match the JSON payloads served by the scanner backend at
//! `GET /api/tokens` and carried inside `NEW_TOKEN` notifications.
//!
//! Every numeric field defaults to `0` and every boolean flag defaults to
//! `false` when absent from the wire payload. Downstream consumers never
//! branch on "missing vs present" - a record is always fully populated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Immutable snapshot of one scanned token.
///
/// Records are replaced wholesale on every successful refresh; nothing
/// mutates a `TokenRecord` in place.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenRecord {
    // Identity
    pub address: SmolStr,
    pub pair_address: SmolStr,
    pub name: String,
    pub symbol: String,
    pub decimals: u32,

    // Market data
    pub liquidity: f64,
    pub gp_holder_count: u64,
    pub reserves: f64,
    /// Pair creation time as epoch milliseconds.
    pub creation_time: i64,
    pub age_hours: f64,

    // Tax / gas figures (taxes are percentages)
    pub gp_buy_tax: f64,
    pub gp_sell_tax: f64,
    pub buy_gas: u64,
    pub sell_gas: u64,

    // Security flags
    pub is_open_source: bool,
    pub is_proxy: bool,
    pub is_mintable: bool,
    pub hidden_owner: bool,
    pub is_blacklisted: bool,
    pub is_anti_whale: bool,
    pub anti_whale_modifiable: bool,
    pub slippage_modifiable: bool,
    pub is_transfer_pausable: bool,
    pub trading_cooldown: bool,
    pub external_call: bool,
    pub cannot_buy: bool,
    pub cannot_sell_all: bool,
    pub can_take_back_ownership: bool,
    pub owner_change_balance: bool,
    pub self_destruct: bool,
    pub is_honeypot: bool,

    // Numeric risk fields
    pub owner_percent: f64,
    pub creator_percent: f64,
    pub lp_holder_count: u64,

    // Scan bookkeeping
    pub total_scans: u64,
    pub honeypot_failures: u64,
    /// Last scan time as epoch milliseconds.
    pub last_scan_time: i64,
    pub holder_count_changed: bool,
    pub liquidity_changed: bool,
    /// Safety score as last computed by the scanner backend.
    pub safety_score: f64,
}

impl TokenRecord {
    /// Pair creation time as a UTC timestamp, when one was reported.
    pub fn creation_time_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.creation_time)
    }

    /// Display label for table rows: symbol when present, otherwise a
    /// shortened address.
    pub fn label(&self) -> String {
        if !self.symbol.is_empty() {
            self.symbol.clone()
        } else if self.address.len() > 10 {
            format!("{}..{}", &self.address[..6], &self.address[self.address.len() - 4..])
        } else {
            self.address.to_string()
        }
    }
}

/// Response body of `GET /api/tokens`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TokensResponse {
    #[serde(default)]
    pub tokens: Vec<TokenRecord>,
}

/// One liquidity observation from the history endpoint.
///
/// Consumed only by chart presentation; the core treats history as opaque.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LiquidityPoint {
    pub timestamp: i64,
    pub liquidity: f64,
    pub holder_count: u64,
}

/// Response body of `GET /api/tokens/{address}/history`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub history: Vec<LiquidityPoint>,
    #[serde(default)]
    pub debug: serde_json::Value,
}
