//! # Discovery Wire Format
//!
//! File: cli/src/discovery/protocol.rs
//!
//! ## Overview
//!
//! The exchange is a single datagram each way, plain ASCII, no framing:
//!
//! - **Request**: the literal command string (`DISCOVER_RETROFIT_API`), sent to the
//!   subnet broadcast address on the well-known port (5001).
//! - **Reply**: the literal prefix (`RETROFIT_API `) followed by the server's base
//!   address. Surrounding whitespace after the prefix is trimmed.
//!
//! There are no sequence numbers, acknowledgements or retransmissions.
//!
use crate::core::error::CatalinkError;
use crate::endpoint::Endpoint;

/// Size of the receive buffer on both sides of the exchange.
pub const MAX_DATAGRAM: usize = 1024;

/// Extracts the advertised endpoint from a reply datagram.
///
/// Rejects replies that do not start with `prefix` or whose remainder is blank.
pub fn parse_reply(payload: &[u8], prefix: &str) -> Result<Endpoint, CatalinkError> {
    let text = String::from_utf8_lossy(payload);
    let remainder = text
        .strip_prefix(prefix)
        .map(str::trim)
        .filter(|rest| !rest.is_empty())
        .ok_or_else(|| CatalinkError::MalformedReply {
            reply: text.to_string(),
        })?;
    Ok(Endpoint::from(remainder))
}

/// True if `payload` is the discovery request, ignoring surrounding whitespace.
pub fn is_request(payload: &[u8], request: &str) -> bool {
    String::from_utf8_lossy(payload).trim() == request
}

/// Encodes the reply advertising `endpoint`.
pub fn encode_reply(prefix: &str, endpoint: &Endpoint) -> Vec<u8> {
    format!("{}{}", prefix, endpoint).into_bytes()
}
