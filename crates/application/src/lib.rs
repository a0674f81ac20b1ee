//! Rootwalk application layer: the TTL-aware record cache and the iterative
//! resolution engine, plus the ports implemented by the infrastructure.

pub mod cache;
pub mod ports;
pub mod resolver;

pub use cache::RecordCache;
pub use ports::{DnsTransport, NoopObserver, QueryObserver};
pub use resolver::Resolver;
