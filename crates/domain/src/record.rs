use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::question::Question;

/// Expiry horizon used for records that must outlive any lookup, such as the
/// root hints seeded at startup.
const PERMANENT_TTL_SECS: u64 = 60 * 60 * 24 * 365 * 10;

/// DNS record types with their RFC 1035/3596 wire codes.
///
/// Types outside the supported set are carried as `Other` with the code seen
/// on the wire, so their payloads can still be cached and re-encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    A,
    NS,
    CNAME,
    MX,
    AAAA,
    Other(u16),
}

impl RecordType {
    pub fn code(self) -> u16 {
        match self {
            RecordType::A => 1,
            RecordType::NS => 2,
            RecordType::CNAME => 5,
            RecordType::MX => 15,
            RecordType::AAAA => 28,
            RecordType::Other(code) => code,
        }
    }

    pub fn from_code(code: u16) -> Self {
        match code {
            1 => RecordType::A,
            2 => RecordType::NS,
            5 => RecordType::CNAME,
            15 => RecordType::MX,
            28 => RecordType::AAAA,
            other => RecordType::Other(other),
        }
    }
}

impl FromStr for RecordType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Ok(RecordType::A),
            "NS" => Ok(RecordType::NS),
            "CNAME" => Ok(RecordType::CNAME),
            "MX" => Ok(RecordType::MX),
            "AAAA" => Ok(RecordType::AAAA),
            other => other
                .parse::<u16>()
                .map(RecordType::from_code)
                .map_err(|_| format!("unknown record type: {s}")),
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordType::A => write!(f, "A"),
            RecordType::NS => write!(f, "NS"),
            RecordType::CNAME => write!(f, "CNAME"),
            RecordType::MX => write!(f, "MX"),
            RecordType::AAAA => write!(f, "AAAA"),
            RecordType::Other(code) => write!(f, "TYPE{code}"),
        }
    }
}

/// DNS record classes. Only IN is exercised in practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordClass {
    IN,
    Other(u16),
}

impl RecordClass {
    pub fn code(self) -> u16 {
        match self {
            RecordClass::IN => 1,
            RecordClass::Other(code) => code,
        }
    }

    pub fn from_code(code: u16) -> Self {
        match code {
            1 => RecordClass::IN,
            other => RecordClass::Other(other),
        }
    }
}

impl fmt::Display for RecordClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordClass::IN => write!(f, "IN"),
            RecordClass::Other(code) => write!(f, "CLASS{code}"),
        }
    }
}

/// Typed payload of a resource record, one variant per supported type plus a
/// raw fallback for everything else.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordData {
    /// A record.
    Ipv4(Ipv4Addr),
    /// AAAA record.
    Ipv6(Ipv6Addr),
    /// NS, CNAME or MX target (MX preference is discarded).
    Name(String),
    /// Unsupported type: the RDATA bytes as a lowercase hex string.
    Raw(String),
}

impl fmt::Display for RecordData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordData::Ipv4(addr) => write!(f, "{addr}"),
            RecordData::Ipv6(addr) => write!(f, "{addr}"),
            RecordData::Name(name) => write!(f, "{name}"),
            RecordData::Raw(hex) => write!(f, "0x{hex}"),
        }
    }
}

/// A cached or decoded resource record.
///
/// The expiry instant is computed once at construction (receipt time plus
/// the advertised TTL) and never decremented in place; readers compare it
/// against the current time. Equality and hashing are structural over the
/// question and payload only, which makes cache insertion idempotent.
#[derive(Debug, Clone)]
pub struct ResourceRecord {
    pub question: Question,
    expires_at: Instant,
    pub data: RecordData,
}

impl ResourceRecord {
    pub fn new(question: Question, ttl: u32, data: RecordData) -> Self {
        Self {
            question,
            expires_at: Instant::now() + Duration::from_secs(u64::from(ttl)),
            data,
        }
    }

    /// A record that never expires within the process lifetime (root hints).
    pub fn permanent(question: Question, data: RecordData) -> Self {
        Self {
            question,
            expires_at: Instant::now() + Duration::from_secs(PERMANENT_TTL_SECS),
            data,
        }
    }

    pub fn record_type(&self) -> RecordType {
        self.question.record_type
    }

    pub fn record_class(&self) -> RecordClass {
        self.question.record_class
    }

    pub fn host_name(&self) -> &str {
        &self.question.host_name
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// Whole seconds until expiry, saturating at zero.
    pub fn remaining_ttl(&self) -> u32 {
        let remaining = self.expires_at.saturating_duration_since(Instant::now());
        remaining.as_secs().min(u64::from(u32::MAX)) as u32
    }

    pub fn ip(&self) -> Option<IpAddr> {
        match self.data {
            RecordData::Ipv4(addr) => Some(IpAddr::V4(addr)),
            RecordData::Ipv6(addr) => Some(IpAddr::V6(addr)),
            _ => None,
        }
    }

    pub fn ipv4(&self) -> Option<Ipv4Addr> {
        match self.data {
            RecordData::Ipv4(addr) => Some(addr),
            _ => None,
        }
    }

    /// The target name of an NS, CNAME or MX record.
    pub fn name_target(&self) -> Option<&str> {
        match &self.data {
            RecordData::Name(name) => Some(name),
            _ => None,
        }
    }
}

impl PartialEq for ResourceRecord {
    fn eq(&self, other: &Self) -> bool {
        self.question == other.question && self.data == other.data
    }
}

impl Eq for ResourceRecord {}

impl std::hash::Hash for ResourceRecord {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.question.hash(state);
        self.data.hash(state);
    }
}

impl fmt::Display for ResourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<30} {:>8} {:<6} {}",
            self.question.display_name(),
            self.remaining_ttl(),
            self.record_type().to_string(),
            self.data
        )
    }
}
