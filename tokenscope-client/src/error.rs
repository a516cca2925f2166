//! All errors generated in `tokenscope-client`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Error)]
pub enum ClientError {
    /// Transport-level failure: socket error or unexpected close. Handled
    /// inside the feed via the bounded retry path, never thrown to callers.
    #[error("socket failure: {0}")]
    Socket(String),

    /// Protocol decode failure for one inbound message. Logged and dropped;
    /// does not affect the connection or liveness tracking.
    #[error("failed to decode protocol message: {0}")]
    Decode(String),

    /// Refresh collaborator failure: non-2xx status or malformed body. The
    /// previous token store contents are retained.
    #[error("token refresh failed: {0}")]
    Refresh(String),

    /// Automatic reconnection budget exhausted. Recoverable only via an
    /// explicit manual reconnect, which resets the attempt counter.
    #[error("gave up reconnecting after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
}

impl ClientError {
    /// Determine if an error is terminal for the synchronization loop, i.e.
    /// no further automatic recovery will be attempted.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClientError::RetriesExhausted { .. })
    }
}
