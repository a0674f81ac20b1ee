//! RFC 1035 wire codec: bit-exact encoding and decoding of DNS messages,
//! including domain-name label compression.
//!
//! Decoding tolerates malformed trailing data — a question or record that
//! cannot be parsed abandons the rest of the message, and whatever was
//! already decoded is returned. Only a missing header is a hard error.

mod reader;
mod writer;

pub use reader::decode;
pub use writer::encode;

use thiserror::Error;

/// Length of the fixed message header.
pub(crate) const HEADER_LEN: usize = 12;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    #[error("message shorter than the 12-byte header")]
    ShortHeader,

    #[error("truncated field at offset {0}")]
    Truncated(usize),

    #[error("compression pointer at offset {0} does not point backwards")]
    BadPointer(usize),

    #[error("reserved label prefix at offset {0}")]
    ReservedLabel(usize),

    #[error("label exceeds 63 octets: {0}")]
    LabelTooLong(String),

    #[error("empty label in name: {0}")]
    EmptyLabel(String),

    #[error("raw record payload is not valid hex")]
    BadRawPayload,

    #[error("encoded message exceeds {} bytes", rootwalk_domain::MAX_MESSAGE_SIZE)]
    Oversized,
}

/// Lowercase hex rendering of raw RDATA, the storage form for unsupported
/// record types.
pub(crate) fn hex_string(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(
        String::with_capacity(bytes.len() * 2),
        |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        },
    )
}

pub(crate) fn hex_bytes(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
        .collect()
}
