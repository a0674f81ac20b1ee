mod observer;
mod transport;

pub use observer::{NoopObserver, QueryObserver};
pub use transport::DnsTransport;
