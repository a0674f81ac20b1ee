use tracing::debug;

use rootwalk_domain::{
    Header, Message, Question, RecordClass, RecordData, RecordType, ResourceRecord,
};

use super::{hex_string, WireError, HEADER_LEN};

/// Decodes a DNS message from a received datagram.
///
/// The section counts in the header drive how many questions and records are
/// read. A malformed entry stops parsing and returns everything decoded up
/// to that point; only a message too short for its header is an error.
pub fn decode(bytes: &[u8]) -> Result<Message, WireError> {
    if bytes.len() < HEADER_LEN {
        return Err(WireError::ShortHeader);
    }

    let mut message = Message {
        header: decode_header(bytes),
        ..Default::default()
    };

    let mut pos = HEADER_LEN;
    for _ in 0..message.header.question_count {
        match decode_question(bytes, pos) {
            Ok((question, next)) => {
                message.questions.push(question);
                pos = next;
            }
            Err(err) => {
                debug!(offset = pos, error = %err, "malformed question, keeping partial message");
                return Ok(message);
            }
        }
    }

    let counts = [
        message.header.answer_count,
        message.header.authority_count,
        message.header.additional_count,
    ];
    for (index, count) in counts.into_iter().enumerate() {
        for _ in 0..count {
            match decode_record(bytes, pos) {
                Ok((record, next)) => {
                    match index {
                        0 => message.answers.push(record),
                        1 => message.authorities.push(record),
                        _ => message.additionals.push(record),
                    }
                    pos = next;
                }
                Err(err) => {
                    debug!(offset = pos, error = %err, "malformed record, keeping partial message");
                    return Ok(message);
                }
            }
        }
    }

    Ok(message)
}

fn decode_header(bytes: &[u8]) -> Header {
    let flags_hi = bytes[2];
    let flags_lo = bytes[3];
    Header {
        id: u16::from_be_bytes([bytes[0], bytes[1]]),
        response: flags_hi & 0x80 != 0,
        opcode: (flags_hi >> 3) & 0x0F,
        authoritative: flags_hi & 0x04 != 0,
        truncated: flags_hi & 0x02 != 0,
        recursion_desired: flags_hi & 0x01 != 0,
        recursion_available: flags_lo & 0x80 != 0,
        rcode: flags_lo & 0x0F,
        question_count: u16::from_be_bytes([bytes[4], bytes[5]]),
        answer_count: u16::from_be_bytes([bytes[6], bytes[7]]),
        authority_count: u16::from_be_bytes([bytes[8], bytes[9]]),
        additional_count: u16::from_be_bytes([bytes[10], bytes[11]]),
    }
}

/// Decodes a domain name starting at `start`, following compression
/// pointers.
///
/// Every pointer must target a strictly earlier offset than the pointer
/// itself, which guarantees termination. The returned cursor is the position
/// after the name at its original location — past the terminating zero
/// label, or past the first pointer's two bytes when one was followed.
pub(crate) fn decode_name(bytes: &[u8], start: usize) -> Result<(String, usize), WireError> {
    let mut labels: Vec<String> = Vec::new();
    let mut pos = start;
    let mut resume: Option<usize> = None;

    loop {
        let (len, next) = read_u8(bytes, pos)?;
        match len & 0xC0 {
            0xC0 => {
                let (low, after) = read_u8(bytes, next)?;
                let target = (usize::from(len & 0x3F) << 8) | usize::from(low);
                if target >= pos {
                    return Err(WireError::BadPointer(pos));
                }
                if resume.is_none() {
                    resume = Some(after);
                }
                pos = target;
            }
            0x00 => {
                if len == 0 {
                    pos = next;
                    break;
                }
                let end = next + usize::from(len);
                let label = bytes.get(next..end).ok_or(WireError::Truncated(next))?;
                labels.push(String::from_utf8_lossy(label).to_ascii_lowercase());
                pos = end;
            }
            _ => return Err(WireError::ReservedLabel(pos)),
        }
    }

    Ok((labels.join("."), resume.unwrap_or(pos)))
}

fn decode_question(bytes: &[u8], pos: usize) -> Result<(Question, usize), WireError> {
    let (name, pos) = decode_name(bytes, pos)?;
    let (type_code, pos) = read_u16(bytes, pos)?;
    let (class_code, pos) = read_u16(bytes, pos)?;
    let question = Question::new(
        &name,
        RecordType::from_code(type_code),
        RecordClass::from_code(class_code),
    );
    Ok((question, pos))
}

/// Decodes one resource record. RDLENGTH is authoritative for positioning
/// the cursor after the record, whatever the payload parse consumed.
fn decode_record(bytes: &[u8], pos: usize) -> Result<(ResourceRecord, usize), WireError> {
    let (question, pos) = decode_question(bytes, pos)?;
    let (ttl, pos) = read_u32(bytes, pos)?;
    let (rdlength, pos) = read_u16(bytes, pos)?;
    let rdata_end = pos + usize::from(rdlength);
    if rdata_end > bytes.len() {
        return Err(WireError::Truncated(pos));
    }

    let data = match question.record_type {
        RecordType::A => {
            let octets: [u8; 4] = bytes
                .get(pos..pos + 4)
                .and_then(|s| s.try_into().ok())
                .ok_or(WireError::Truncated(pos))?;
            RecordData::Ipv4(octets.into())
        }
        RecordType::AAAA => {
            let octets: [u8; 16] = bytes
                .get(pos..pos + 16)
                .and_then(|s| s.try_into().ok())
                .ok_or(WireError::Truncated(pos))?;
            RecordData::Ipv6(octets.into())
        }
        RecordType::NS | RecordType::CNAME => RecordData::Name(decode_name(bytes, pos)?.0),
        // The 2-byte preference is skipped; only the exchange name is kept.
        RecordType::MX => RecordData::Name(decode_name(bytes, pos + 2)?.0),
        RecordType::Other(_) => RecordData::Raw(hex_string(&bytes[pos..rdata_end])),
    };

    Ok((ResourceRecord::new(question, ttl, data), rdata_end))
}

fn read_u8(bytes: &[u8], pos: usize) -> Result<(u8, usize), WireError> {
    bytes
        .get(pos)
        .map(|byte| (*byte, pos + 1))
        .ok_or(WireError::Truncated(pos))
}

fn read_u16(bytes: &[u8], pos: usize) -> Result<(u16, usize), WireError> {
    let slice: [u8; 2] = bytes
        .get(pos..pos + 2)
        .and_then(|s| s.try_into().ok())
        .ok_or(WireError::Truncated(pos))?;
    Ok((u16::from_be_bytes(slice), pos + 2))
}

fn read_u32(bytes: &[u8], pos: usize) -> Result<(u32, usize), WireError> {
    let slice: [u8; 4] = bytes
        .get(pos..pos + 4)
        .and_then(|s| s.try_into().ok())
        .ok_or(WireError::Truncated(pos))?;
    Ok((u32::from_be_bytes(slice), pos + 4))
}
