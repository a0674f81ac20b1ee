//! Rootwalk infrastructure: the RFC 1035 wire codec and the retrying UDP
//! transport.

pub mod dns;

pub use dns::codec::{decode, encode, WireError};
pub use dns::transport::UdpTransport;
