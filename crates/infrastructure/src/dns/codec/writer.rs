use rustc_hash::FxHashMap;

use rootwalk_domain::{Message, Question, RecordData, RecordType, ResourceRecord, MAX_MESSAGE_SIZE};

use super::{hex_bytes, WireError};

/// Largest offset a 14-bit compression pointer can target.
const MAX_POINTER_OFFSET: usize = 0x3FFF;

/// Encodes a message into wire format.
///
/// Section counts are written from the actual section contents and record
/// TTLs from each record's remaining lifetime. Fails if the result would
/// exceed the 512-byte UDP ceiling.
pub fn encode(message: &Message) -> Result<Vec<u8>, WireError> {
    let mut writer = MessageWriter::default();
    writer.write_header(message);
    for question in &message.questions {
        writer.write_question(question)?;
    }
    for record in message.records() {
        writer.write_record(record)?;
    }
    writer.finish()
}

/// Append-only wire buffer with the offset table that backs name
/// compression: every name and name suffix already emitted maps to the
/// offset of its first occurrence.
#[derive(Default)]
struct MessageWriter {
    buf: Vec<u8>,
    names: FxHashMap<String, u16>,
}

impl MessageWriter {
    fn write_header(&mut self, message: &Message) {
        let header = &message.header;
        self.put_u16(header.id);

        let mut hi = 0u8;
        if header.response {
            hi |= 0x80;
        }
        hi |= (header.opcode & 0x0F) << 3;
        if header.authoritative {
            hi |= 0x04;
        }
        if header.truncated {
            hi |= 0x02;
        }
        if header.recursion_desired {
            hi |= 0x01;
        }
        let mut lo = 0u8;
        if header.recursion_available {
            lo |= 0x80;
        }
        lo |= header.rcode & 0x0F;
        self.buf.push(hi);
        self.buf.push(lo);

        self.put_u16(message.questions.len() as u16);
        self.put_u16(message.answers.len() as u16);
        self.put_u16(message.authorities.len() as u16);
        self.put_u16(message.additionals.len() as u16);
    }

    fn write_question(&mut self, question: &Question) -> Result<(), WireError> {
        self.write_name(&question.host_name)?;
        self.put_u16(question.record_type.code());
        self.put_u16(question.record_class.code());
        Ok(())
    }

    fn write_record(&mut self, record: &ResourceRecord) -> Result<(), WireError> {
        self.write_name(record.host_name())?;
        self.put_u16(record.record_type().code());
        self.put_u16(record.record_class().code());
        self.put_u32(record.remaining_ttl());

        let length_at = self.buf.len();
        self.put_u16(0);
        let rdata_start = self.buf.len();

        match &record.data {
            RecordData::Ipv4(addr) => self.buf.extend_from_slice(&addr.octets()),
            RecordData::Ipv6(addr) => self.buf.extend_from_slice(&addr.octets()),
            RecordData::Name(name) => {
                if record.record_type() == RecordType::MX {
                    // Preference was discarded on decode; written as zero.
                    self.put_u16(0);
                }
                self.write_name(name)?;
            }
            RecordData::Raw(hex) => {
                let bytes = hex_bytes(hex).ok_or(WireError::BadRawPayload)?;
                self.buf.extend_from_slice(&bytes);
            }
        }

        let rdlength = (self.buf.len() - rdata_start) as u16;
        self.buf[length_at..length_at + 2].copy_from_slice(&rdlength.to_be_bytes());
        Ok(())
    }

    /// Writes a name, compressing against earlier occurrences: a full or
    /// suffix match becomes a 2-byte backward pointer; otherwise the first
    /// label is written literally, the current offset recorded for reuse,
    /// and the remaining suffix encoded recursively.
    fn write_name(&mut self, name: &str) -> Result<(), WireError> {
        if name.is_empty() {
            self.buf.push(0);
            return Ok(());
        }
        if let Some(&offset) = self.names.get(name) {
            self.put_u16(0xC000 | offset);
            return Ok(());
        }

        let here = self.buf.len();
        if here <= MAX_POINTER_OFFSET {
            self.names.insert(name.to_string(), here as u16);
        }

        let (label, rest) = match name.split_once('.') {
            Some((label, rest)) => (label, rest),
            None => (name, ""),
        };
        if label.is_empty() {
            return Err(WireError::EmptyLabel(name.to_string()));
        }
        if label.len() > 63 {
            return Err(WireError::LabelTooLong(label.to_string()));
        }
        self.buf.push(label.len() as u8);
        self.buf.extend_from_slice(label.as_bytes());
        self.write_name(rest)
    }

    fn put_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    fn put_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    fn finish(self) -> Result<Vec<u8>, WireError> {
        if self.buf.len() > MAX_MESSAGE_SIZE {
            return Err(WireError::Oversized);
        }
        Ok(self.buf)
    }
}
