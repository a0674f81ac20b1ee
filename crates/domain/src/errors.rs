use thiserror::Error;

/// Errors surfaced to the top-level caller of a lookup.
///
/// Per-hop transport exhaustion and malformed responses are absorbed inside
/// the resolution loop and never reach this type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("CNAME indirection limit exceeded")]
    IndirectionLimit,

    #[error("server responded with rcode {code}")]
    ServerRcode { code: u8 },

    #[error("invalid domain name: {0}")]
    InvalidName(String),
}

impl LookupError {
    /// Human-readable text for the server's response code, when this error
    /// carries one.
    pub fn rcode_text(&self) -> Option<&'static str> {
        match self {
            LookupError::ServerRcode { code } => Some(crate::message::rcode_message(*code)),
            _ => None,
        }
    }
}
