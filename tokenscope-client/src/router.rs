//! Notification routing for inbound protocol messages.
//!
//! A thin, stateless dispatcher between the connection and the token store:
//! it interprets one inbound envelope and says what (if anything) should
//! happen. Liveness bookkeeping is not handled here - receipt of *any*
//! message already refreshed the last-seen timestamp in the connection
//! state machine before routing runs.

use crate::{error::ClientError, protocol::ServerMessage};
use tracing::{debug, warn};

/// Effect requested by one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAction {
    /// Refresh the full token collection over HTTP. The wire notification
    /// carries only a partial record, so correctness requires the
    /// authoritative full set rather than an incremental merge.
    TriggerRefresh,
    /// Nothing beyond liveness tracking.
    None,
}

/// Interpret one raw inbound text frame.
///
/// Malformed JSON and unknown message types are logged and dropped; neither
/// closes the connection nor affects liveness tracking.
pub fn route_message(text: &str) -> RouteAction {
    let message = match serde_json::from_str::<ServerMessage>(text) {
        Ok(message) => message,
        Err(error) => {
            let error = ClientError::Decode(error.to_string());
            warn!(%error, "dropping malformed protocol message");
            debug!(raw = preview(text), "malformed payload");
            return RouteAction::None;
        }
    };

    match message {
        ServerMessage::Pong => RouteAction::None,
        ServerMessage::Connected => {
            debug!("server acknowledged connection");
            RouteAction::None
        }
        ServerMessage::NewToken { token: Some(token) } => {
            debug!(address = %token.address, "new token notification, refreshing collection");
            RouteAction::TriggerRefresh
        }
        ServerMessage::NewToken { token: None } => {
            warn!("NEW_TOKEN notification without token payload, ignoring");
            RouteAction::None
        }
        ServerMessage::Unknown => {
            debug!(raw = preview(text), "ignoring unknown message type");
            RouteAction::None
        }
    }
}

/// First 200 bytes of the payload for log context, trimmed back to a char
/// boundary.
fn preview(text: &str) -> &str {
    let mut end = text.len().min(200);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_message() {
        struct TestCase {
            input: &'static str,
            expected: RouteAction,
        }

        let tests = vec![
            TestCase {
                // TC0: PONG is liveness only
                input: r#"{"type":"PONG"}"#,
                expected: RouteAction::None,
            },
            TestCase {
                // TC1: CONNECTED is informational
                input: r#"{"type":"CONNECTED"}"#,
                expected: RouteAction::None,
            },
            TestCase {
                // TC2: NEW_TOKEN with payload triggers a full refresh
                input: r#"{"type":"NEW_TOKEN","token":{"address":"0xabc","symbol":"TKN"}}"#,
                expected: RouteAction::TriggerRefresh,
            },
            TestCase {
                // TC3: NEW_TOKEN without payload is ignored
                input: r#"{"type":"NEW_TOKEN"}"#,
                expected: RouteAction::None,
            },
            TestCase {
                // TC4: unknown type is ignored
                input: r#"{"type":"MAINTENANCE_WINDOW"}"#,
                expected: RouteAction::None,
            },
            TestCase {
                // TC5: malformed JSON is dropped, not fatal
                input: "{\"type\": \"NEW_TOK",
                expected: RouteAction::None,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            assert_eq!(route_message(test.input), test.expected, "TC{} failed", index);
        }
    }
}
