use std::net::Ipv4Addr;

use rootwalk_domain::{Question, ResourceRecord, Section};

/// Diagnostic side channel invoked at fixed points of a lookup.
///
/// Pure side effect: an implementation must not alter the resolution
/// outcome. All methods default to no-ops so an observer only implements
/// the events it cares about.
pub trait QueryObserver: Send + Sync {
    /// Called before every query send, including retransmissions.
    fn query_sent(&self, _question: &Question, _server: Ipv4Addr, _id: u16) {}

    /// Called once a response header has been parsed.
    fn response_header(&self, _id: u16, _authoritative: bool, _rcode: u8) {}

    /// Called per section with its declared record count, before iterating it.
    fn section_header(&self, _section: Section, _count: u16) {}

    /// Called once per individually parsed record, with the raw wire codes.
    fn record(&self, _record: &ResourceRecord, _type_code: u16, _class_code: u16) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl QueryObserver for NoopObserver {}
