pub mod codec;
pub mod transport;
