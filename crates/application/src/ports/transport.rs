use std::net::Ipv4Addr;

use rootwalk_domain::{LookupError, Message, Question};

/// One request/response exchange with a single nameserver.
///
/// An implementation owns transaction-id generation and matching, the
/// per-attempt timeout and the retransmission ceiling. `Ok(None)` means the
/// server never produced a matching reply — the caller treats the hop as
/// unreachable and moves on. A matching reply with a nonzero response code
/// is surfaced as [`LookupError::ServerRcode`], never retried here.
pub trait DnsTransport: Send + Sync {
    fn exchange(
        &self,
        question: &Question,
        server: Ipv4Addr,
    ) -> Result<Option<Message>, LookupError>;
}
