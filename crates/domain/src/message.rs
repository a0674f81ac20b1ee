use crate::question::Question;
use crate::record::ResourceRecord;

/// Ceiling for a DNS message over plain UDP (RFC 1035 §2.3.4).
pub const MAX_MESSAGE_SIZE: usize = 512;

/// Parsed header of a DNS message (RFC 1035 §4.1.1).
///
/// The section counts hold the values declared on the wire when decoding;
/// the encoder writes counts from the actual section contents instead.
#[derive(Debug, Clone, Default)]
pub struct Header {
    pub id: u16,
    /// QR bit: true for a response, false for a query.
    pub response: bool,
    pub opcode: u8,
    /// AA bit.
    pub authoritative: bool,
    /// TC bit.
    pub truncated: bool,
    /// RD bit. Never set by this resolver: queries are iterative.
    pub recursion_desired: bool,
    /// RA bit.
    pub recursion_available: bool,
    pub rcode: u8,
    pub question_count: u16,
    pub answer_count: u16,
    pub authority_count: u16,
    pub additional_count: u16,
}

/// The three resource-record sections of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Answer,
    Authority,
    Additional,
}

impl Section {
    pub fn label(self) -> &'static str {
        match self {
            Section::Answer => "answer",
            Section::Authority => "authority",
            Section::Additional => "additional",
        }
    }
}

/// A wire-level DNS message. Transient: built fresh for each query and for
/// each decoded response, never persisted.
#[derive(Debug, Clone, Default)]
pub struct Message {
    pub header: Header,
    pub questions: Vec<Question>,
    pub answers: Vec<ResourceRecord>,
    pub authorities: Vec<ResourceRecord>,
    pub additionals: Vec<ResourceRecord>,
}

impl Message {
    /// A fresh iterative (non-recursive) query with a single question.
    pub fn query(id: u16, question: Question) -> Self {
        let mut message = Message::default();
        message.header.id = id;
        message.header.question_count = 1;
        message.questions.push(question);
        message
    }

    pub fn section(&self, section: Section) -> &[ResourceRecord] {
        match section {
            Section::Answer => &self.answers,
            Section::Authority => &self.authorities,
            Section::Additional => &self.additionals,
        }
    }

    /// Declared count for a section, as read from the wire.
    pub fn declared_count(&self, section: Section) -> u16 {
        match section {
            Section::Answer => self.header.answer_count,
            Section::Authority => self.header.authority_count,
            Section::Additional => self.header.additional_count,
        }
    }

    /// All resource records across the three sections, in wire order.
    pub fn records(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.answers
            .iter()
            .chain(self.authorities.iter())
            .chain(self.additionals.iter())
    }
}

/// Human-readable text for a DNS response code.
pub fn rcode_message(code: u8) -> &'static str {
    match code {
        0 => "no error",
        1 => "format error",
        2 => "server failure",
        3 => "name error (name does not exist)",
        4 => "not implemented (parameters not supported)",
        5 => "refused",
        _ => "unassigned response code",
    }
}
