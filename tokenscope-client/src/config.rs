//! Client and view configuration.
//!
//! `ClientConfig` drives the synchronization side (urls, heartbeat and retry
//! timing); `FilterConfig` drives the derived-analytics pipeline and is treated
//! as read-only input per pipeline invocation.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Honeypot visibility mode for the filter pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HoneypotMode {
    /// Exclude honeypots.
    Hide,
    /// Exclude everything that is not a honeypot.
    Only,
    /// No honeypot filter.
    #[default]
    Show,
}

/// Sort key for the visible token table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    /// Total scan count observed for the record.
    Records,
    /// Age of the pair in hours.
    Age,
    /// Pair creation timestamp.
    #[default]
    CreationTime,
    /// Holder count.
    Holders,
    /// Pooled liquidity.
    Liquidity,
    /// Stored safety score (forced to 0 for honeypots).
    SafetyScore,
}

/// Sort direction, multiplying the natural ascending comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Filter and sort options for the visible token set.
///
/// Created once at client start with defaults and mutated only by explicit
/// user edits; the pipeline never writes to it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Minimum holder count; records below are excluded.
    pub min_holders: u64,
    /// Minimum pooled liquidity; records below are excluded.
    pub min_liquidity: f64,
    pub honeypot_mode: HoneypotMode,
    /// Exclude records classified as dangerous.
    pub hide_dangerous: bool,
    /// Exclude records classified as warning.
    pub hide_warning: bool,
    /// Keep only records classified as safe.
    pub safe_only: bool,
    /// Case-insensitive substring match against name or symbol.
    pub search_query: String,
    /// Visible set is the first `max_records` of the filtered-and-sorted
    /// sequence.
    pub max_records: usize,
    /// Exclude records whose holder count has not changed, once enough scans
    /// have been observed.
    pub hide_stagnant_holders: bool,
    /// Exclude records whose liquidity has not changed, once enough scans
    /// have been observed.
    pub hide_stagnant_liquidity: bool,
    /// Minimum observed scans before stagnation filters apply.
    pub stagnant_record_count: u64,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_holders: 0,
            min_liquidity: 0.0,
            honeypot_mode: HoneypotMode::Show,
            hide_dangerous: false,
            hide_warning: false,
            safe_only: false,
            search_query: String::new(),
            max_records: 50,
            hide_stagnant_holders: false,
            hide_stagnant_liquidity: false,
            stagnant_record_count: 10,
            sort_key: SortKey::CreationTime,
            sort_direction: SortDirection::Desc,
        }
    }
}

/// Synchronization client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket endpoint for the real-time channel.
    pub ws_url: String,
    /// Base url for the HTTP refresh collaborator.
    pub api_url: String,
    /// Budget for the WebSocket connect handshake. A peer that accepts TCP
    /// but never completes the upgrade counts as a failed attempt.
    pub connect_timeout: Duration,
    /// Liveness probe interval.
    pub heartbeat_interval: Duration,
    /// Budget for any inbound message after a probe is sent.
    pub heartbeat_timeout: Duration,
    /// Fixed delay before a scheduled reconnection attempt.
    pub reconnect_delay: Duration,
    /// Maximum automatic reconnection attempts before requiring a manual
    /// reconnect.
    pub max_retries: u32,
    /// Channel buffer size for feed events.
    pub channel_buffer_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ws_url: "ws://127.0.0.1:8080/ws".to_string(),
            api_url: "http://127.0.0.1:8080".to_string(),
            connect_timeout: Duration::from_secs(10),
            heartbeat_interval: Duration::from_secs(15),
            heartbeat_timeout: Duration::from_secs(5),
            reconnect_delay: Duration::from_secs(5),
            max_retries: 5,
            channel_buffer_size: 1000,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with custom endpoints.
    pub fn new(ws_url: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            ws_url: ws_url.into(),
            api_url: api_url.into(),
            ..Default::default()
        }
    }

    /// Set the connect handshake budget.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set heartbeat probe interval.
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    /// Set heartbeat reply budget.
    pub fn with_heartbeat_timeout(mut self, timeout: Duration) -> Self {
        self.heartbeat_timeout = timeout;
        self
    }

    /// Set reconnect delay.
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Set maximum automatic reconnection attempts.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set channel buffer size.
    pub fn with_channel_buffer_size(mut self, size: usize) -> Self {
        self.channel_buffer_size = size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_defaults() {
        let config = FilterConfig::default();
        assert_eq!(config.min_holders, 0);
        assert_eq!(config.min_liquidity, 0.0);
        assert_eq!(config.honeypot_mode, HoneypotMode::Show);
        assert!(!config.hide_dangerous);
        assert!(!config.hide_warning);
        assert!(!config.safe_only);
        assert_eq!(config.max_records, 50);
        assert_eq!(config.sort_key, SortKey::CreationTime);
        assert_eq!(config.sort_direction, SortDirection::Desc);
    }

    #[test]
    fn test_client_config_builder() {
        let config = ClientConfig::new("ws://localhost:9001/ws", "http://localhost:9001")
            .with_connect_timeout(Duration::from_secs(4))
            .with_heartbeat_interval(Duration::from_secs(10))
            .with_heartbeat_timeout(Duration::from_secs(3))
            .with_reconnect_delay(Duration::from_secs(2))
            .with_max_retries(3)
            .with_channel_buffer_size(500);

        assert_eq!(config.ws_url, "ws://localhost:9001/ws");
        assert_eq!(config.connect_timeout, Duration::from_secs(4));
        assert_eq!(config.heartbeat_interval, Duration::from_secs(10));
        assert_eq!(config.heartbeat_timeout, Duration::from_secs(3));
        assert_eq!(config.reconnect_delay, Duration::from_secs(2));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.channel_buffer_size, 500);
    }

    #[test]
    fn test_default_timing_budget() {
        let config = ClientConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.heartbeat_interval, Duration::from_secs(15));
        assert_eq!(config.heartbeat_timeout, Duration::from_secs(5));
        assert_eq!(config.reconnect_delay, Duration::from_secs(5));
        assert_eq!(config.max_retries, 5);
    }

    #[test]
    fn test_filter_config_round_trips_for_persistence() {
        let mut config = FilterConfig::default();
        config.honeypot_mode = HoneypotMode::Hide;
        config.sort_key = SortKey::SafetyScore;
        config.sort_direction = SortDirection::Asc;
        config.search_query = "pepe".to_string();

        let json = serde_json::to_string(&config).unwrap();
        let restored: FilterConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, config);
    }
}
