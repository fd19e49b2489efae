//! Wire format codec (RFC 1035 §4, RFC 2673 bit-string labels).
//!
//! Everything here works on caller-owned byte buffers with explicit offsets.
//! No function resizes a buffer it was handed; every read and write is
//! checked against an end offset first.

pub mod bitstring;
pub mod name;
pub mod reader;
pub mod writer;

use dnswire_domain::{DomainError, Message};

pub use name::CompressionTable;
pub use reader::{MessageReader, SectionHandler};
pub use writer::MessageWriter;

/// Default UDP payload size.
pub const PACKETSZ: usize = 512;
/// Largest presentation-form name, including the terminator slot.
pub const MAXDNAME: usize = 1025;
/// Largest message.
pub const MAXMSG: usize = 65535;
/// Largest wire-form name.
pub const MAXCDNAME: usize = 255;
/// Largest plain label.
pub const MAXLABEL: usize = 63;
/// Bytes of fixed data in the header.
pub const HFIXEDSZ: usize = 12;
/// Bytes of fixed data after a question name.
pub const QFIXEDSZ: usize = 4;
/// Bytes of fixed data after a record owner name.
pub const RRFIXEDSZ: usize = 10;
pub const INT32SZ: usize = 4;
pub const INT16SZ: usize = 2;
pub const INT8SZ: usize = 1;
pub const INADDRSZ: usize = 4;
pub const IN6ADDRSZ: usize = 16;
/// Both top bits set: compression pointer.
pub const CMPRSFLGS: u8 = 0xc0;
/// Top bits `01`: extended label type.
pub const TYPE_ELT: u8 = 0x40;
pub const LABELTYPE_BITSTRING: u8 = 0x41;
/// Pointers carry 14 bits of offset.
pub const MAX_POINTER_OFFSET: usize = 0x4000;
pub const DEFAULT_PORT: u16 = 53;

/// How a label's leading byte is to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    Root,
    Plain(usize),
    /// Bit-string label; the value is the byte count after the type byte.
    BitString(usize),
    Pointer,
}

/// Classifies the label starting at `off`.
///
/// Reserved (`10xxxxxx`) lengths and extended types other than bit-strings
/// are format errors.
pub fn classify_label(buf: &[u8], off: usize) -> Result<LabelKind, DomainError> {
    let n = *buf
        .get(off)
        .ok_or_else(|| DomainError::BoundsError(format!("label at offset {} past end", off)))?;
    match n & CMPRSFLGS {
        0 if n == 0 => Ok(LabelKind::Root),
        0 => Ok(LabelKind::Plain(n as usize)),
        CMPRSFLGS => Ok(LabelKind::Pointer),
        TYPE_ELT if n == LABELTYPE_BITSTRING => {
            let count = *buf.get(off + 1).ok_or_else(|| {
                DomainError::BoundsError(format!(
                    "bit-string label at offset {} missing its bit count",
                    off
                ))
            })?;
            Ok(LabelKind::BitString(1 + bitstring::data_len(count)))
        }
        TYPE_ELT => Err(DomainError::FormatError(format!(
            "unsupported extended label type 0x{:02x} at offset {}",
            n, off
        ))),
        _ => Err(DomainError::FormatError(format!(
            "reserved label type 0x{:02x} at offset {}",
            n, off
        ))),
    }
}

/// Bytes following the length/type byte of the label at `off`.
/// Pointers have no label length and are rejected.
pub fn label_len(buf: &[u8], off: usize) -> Result<usize, DomainError> {
    match classify_label(buf, off)? {
        LabelKind::Root => Ok(0),
        LabelKind::Plain(len) | LabelKind::BitString(len) => Ok(len),
        LabelKind::Pointer => Err(DomainError::FormatError(format!(
            "unexpected compression pointer at offset {}",
            off
        ))),
    }
}

/// Outcome of serializing one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoded {
    pub len: usize,
    pub truncated: bool,
}

/// Decodes a complete message: a structural skip pass per section, then
/// typed decoding of the delimited range.
pub fn decode_message(buf: &[u8]) -> Result<Message, DomainError> {
    let mut assembler = reader::MessageAssembler::default();
    MessageReader::new(buf).parse_message(&mut assembler)?;
    Ok(assembler.into_message())
}

/// Runs only the structural pass.
pub fn validate_message(buf: &[u8]) -> Result<(), DomainError> {
    MessageReader::new(buf).parse_message(&mut reader::StructureOnly)
}

/// Serializes `message` into `buf`, never writing past `limit` bytes.
pub fn encode_message(message: &Message, buf: &mut [u8], limit: usize) -> Result<Encoded, DomainError> {
    let mut writer = MessageWriter::new(buf, limit);
    let len = writer.write_message(message)?;
    Ok(Encoded {
        len,
        truncated: writer.is_truncated(),
    })
}

/// Convenience wrapper that allocates the output buffer.
pub fn encode_to_vec(message: &Message, limit: usize) -> Result<(Vec<u8>, bool), DomainError> {
    let mut buf = vec![0u8; limit.min(MAXMSG)];
    let encoded = encode_message(message, &mut buf, limit)?;
    buf.truncate(encoded.len);
    Ok((buf, encoded.truncated))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_label_kinds() {
        assert_eq!(classify_label(&[0], 0).unwrap(), LabelKind::Root);
        assert_eq!(classify_label(&[3, b'c', b'o', b'm'], 0).unwrap(), LabelKind::Plain(3));
        assert_eq!(classify_label(&[0xc0, 0x0c], 0).unwrap(), LabelKind::Pointer);
        assert_eq!(classify_label(&[0x41, 12], 0).unwrap(), LabelKind::BitString(3));
        assert_eq!(classify_label(&[0x41, 0], 0).unwrap(), LabelKind::BitString(33));
    }

    #[test]
    fn test_classify_label_rejects_reserved_types() {
        assert!(classify_label(&[0x80], 0).unwrap_err().is_format());
        assert!(classify_label(&[0x42, 1], 0).unwrap_err().is_format());
        assert!(classify_label(&[0x41], 0).unwrap_err().is_bounds());
        assert!(classify_label(&[], 0).unwrap_err().is_bounds());
    }

    #[test]
    fn test_label_len_rejects_pointer() {
        assert!(label_len(&[0xc0, 0], 0).is_err());
        assert_eq!(label_len(&[5], 0).unwrap(), 5);
    }
}
