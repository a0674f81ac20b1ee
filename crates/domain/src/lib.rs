//! Rootwalk domain layer: the value types shared by the resolver engine,
//! the wire codec and the transport.

pub mod config;
pub mod errors;
pub mod message;
pub mod question;
pub mod record;

pub use config::{Config, LoggingConfig, ResolverConfig, RootHint};
pub use errors::LookupError;
pub use message::{rcode_message, Header, Message, Section, MAX_MESSAGE_SIZE};
pub use question::Question;
pub use record::{RecordClass, RecordData, RecordType, ResourceRecord};
