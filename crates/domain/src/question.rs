use std::fmt;

use crate::record::{RecordClass, RecordType};

/// A DNS question: host name, record type and record class.
///
/// The host name is normalized at construction — ASCII-lowercased with any
/// trailing dot stripped — so the derived equality and hashing are
/// case-insensitive per DNS convention. The root zone is the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Question {
    pub host_name: String,
    pub record_type: RecordType,
    pub record_class: RecordClass,
}

impl Question {
    pub fn new(host_name: &str, record_type: RecordType, record_class: RecordClass) -> Self {
        Self {
            host_name: host_name.trim_end_matches('.').to_ascii_lowercase(),
            record_type,
            record_class,
        }
    }

    /// The host name as printed: `.` for the root zone.
    pub fn display_name(&self) -> &str {
        if self.host_name.is_empty() {
            "."
        } else {
            &self.host_name
        }
    }

    pub fn is_root(&self) -> bool {
        self.host_name.is_empty()
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.display_name(),
            self.record_type,
            self.record_class
        )
    }
}
