//! Tokenscope Client - real-time token-risk dashboard client
//!
//! Maintains a local mirror of the token-risk dataset streamed by the
//! scanner backend and derives filtered, sorted, risk-scored views of it.
//!
//! The library provides:
//! - Wire data types for scanned token records
//! - A pure connection state machine with heartbeat liveness and bounded
//!   reconnection
//! - The async feed driver wiring the state machine to the real transport
//! - Notification routing (new-token -> full refresh)
//! - The derived-analytics pipeline: filter, sort, risk scoring, view
//!   assembly
//!
//! Presentation (layout, charts, styling) lives in the consuming binaries
//! and only ever reads pipeline output.

pub mod analytics;
pub mod config;
pub mod connection;
pub mod error;
pub mod feed;
pub mod protocol;
pub mod rest;
pub mod router;
pub mod store;
pub mod token;

// Re-export commonly used types for convenience
pub use analytics::{assemble, classify, RiskLevel, RiskScore, ScoredToken};
pub use config::{ClientConfig, FilterConfig, HoneypotMode, SortDirection, SortKey};
pub use connection::{ConnectionManager, ConnectionState};
pub use error::ClientError;
pub use feed::{spawn, FeedEvent, FeedHandle};
pub use rest::RestClient;
pub use store::TokenStore;
pub use token::{HistoryResponse, LiquidityPoint, TokenRecord, TokensResponse};
