//! Wire protocol envelopes for the real-time channel.
//!
//! All envelopes are JSON objects tagged by a `type` field. Unknown inbound
//! types decode to [`ServerMessage::Unknown`] so that protocol evolution on
//! the server side is never fatal to the client.

use crate::token::TokenRecord;
use serde::{Deserialize, Serialize};

/// Client -> Server envelopes.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Liveness probe carrying a monotonic epoch-millisecond timestamp.
    #[serde(rename = "PING")]
    Ping { timestamp: i64 },
}

/// Server -> Client envelopes.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Liveness reply. Any inbound message counts for liveness; PONG carries
    /// no additional payload.
    #[serde(rename = "PONG")]
    Pong,
    /// Informational acknowledgment sent once after the socket opens.
    #[serde(rename = "CONNECTED")]
    Connected,
    /// A new token was scanned. The payload is a partial record, so the
    /// client refreshes the full collection instead of merging it.
    #[serde(rename = "NEW_TOKEN")]
    NewToken {
        #[serde(default)]
        token: Option<TokenRecord>,
    },
    /// Any type the client does not understand. Ignored, non-fatal.
    #[serde(other)]
    Unknown,
}

impl ClientMessage {
    /// Encode for transmission.
    pub fn to_json(&self) -> String {
        // ClientMessage variants contain only plain scalars, so encoding
        // cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping_encoding() {
        let ping = ClientMessage::Ping {
            timestamp: 1735689600123,
        };
        let json = ping.to_json();
        assert_eq!(json, r#"{"type":"PING","timestamp":1735689600123}"#);
    }

    #[test]
    fn test_server_message_decoding() {
        struct TestCase {
            input: &'static str,
            expected: ServerMessage,
        }

        let tests = vec![
            TestCase {
                // TC0: liveness reply
                input: r#"{"type":"PONG"}"#,
                expected: ServerMessage::Pong,
            },
            TestCase {
                // TC1: connection acknowledgment
                input: r#"{"type":"CONNECTED"}"#,
                expected: ServerMessage::Connected,
            },
            TestCase {
                // TC2: new token with partial payload
                input: r#"{"type":"NEW_TOKEN","token":{"address":"0xabc"}}"#,
                expected: ServerMessage::NewToken {
                    token: Some(TokenRecord {
                        address: "0xabc".into(),
                        ..Default::default()
                    }),
                },
            },
            TestCase {
                // TC3: new token without payload
                input: r#"{"type":"NEW_TOKEN"}"#,
                expected: ServerMessage::NewToken { token: None },
            },
            TestCase {
                // TC4: unknown type is tolerated
                input: r#"{"type":"SERVER_GOSSIP","detail":42}"#,
                expected: ServerMessage::Unknown,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual: ServerMessage = serde_json::from_str(test.input).unwrap();
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_malformed_payload_is_an_error_not_a_panic() {
        let result = serde_json::from_str::<ServerMessage>("{not json");
        assert!(result.is_err());
    }
}
