use std::net::Ipv4Addr;

use rootwalk_application::QueryObserver;
use rootwalk_domain::{rcode_message, Question, ResourceRecord, Section};

/// Observer that narrates the lookup on stdout: every send and resend, each
/// parsed response header, each section and each record.
pub struct VerbosePrinter;

impl QueryObserver for VerbosePrinter {
    fn query_sent(&self, question: &Question, server: Ipv4Addr, id: u16) {
        println!();
        println!("query {id}: {question} --> {server}");
    }

    fn response_header(&self, id: u16, authoritative: bool, rcode: u8) {
        println!(
            "response {id}: authoritative={authoritative} rcode={rcode} ({})",
            rcode_message(rcode)
        );
    }

    fn section_header(&self, section: Section, count: u16) {
        println!("  {} records [{count}]", section.label());
    }

    fn record(&self, record: &ResourceRecord, type_code: u16, class_code: u16) {
        println!("    {record}  (type {type_code}, class {class_code})");
    }
}
