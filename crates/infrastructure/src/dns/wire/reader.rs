//! Cursor-based message decoding.
//!
//! Parsing runs in two passes per section. A structural skip pass finds the
//! section's end without interpreting it, then a [`SectionHandler`] decodes
//! fields inside the delimited range. Field reads never cross the range, so
//! a handler cannot wander into the next section.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::ops::Range;

use dnswire_domain::dns_record::parse_type_bitmap;
use dnswire_domain::{
    DomainError, Header, Message, Question, RData, RecordClass, RecordType, ResourceRecord,
    Section, Soa,
};

use super::name;
use super::{HFIXEDSZ, IN6ADDRSZ, INADDRSZ, MAXDNAME, QFIXEDSZ, RRFIXEDSZ};

/// Callbacks driven by [`MessageReader::parse_message`].
///
/// Each callback receives the reader positioned at the start of the delimited
/// section. Whatever it leaves unread is skipped.
pub trait SectionHandler {
    fn on_message_begin(&mut self) {}

    fn on_header(&mut self, _reader: &mut MessageReader<'_>) -> Result<(), DomainError> {
        Ok(())
    }

    fn on_question(&mut self, _reader: &mut MessageReader<'_>) -> Result<(), DomainError> {
        Ok(())
    }

    /// Fired before the first record of a non-empty section.
    fn on_section_begin(&mut self, _section: Section) {}

    fn on_record(
        &mut self,
        _section: Section,
        _reader: &mut MessageReader<'_>,
    ) -> Result<(), DomainError> {
        Ok(())
    }

    fn on_message_complete(&mut self) {}
}

/// Handler that decodes nothing; parsing only checks structure.
pub struct StructureOnly;

impl SectionHandler for StructureOnly {}

/// Handler that builds a [`Message`] from every section.
#[derive(Debug, Default)]
pub struct MessageAssembler {
    message: Message,
}

impl MessageAssembler {
    pub fn into_message(self) -> Message {
        self.message
    }
}

impl SectionHandler for MessageAssembler {
    fn on_message_begin(&mut self) {
        self.message = Message::default();
    }

    fn on_header(&mut self, reader: &mut MessageReader<'_>) -> Result<(), DomainError> {
        self.message.header = reader.parse_header()?;
        Ok(())
    }

    fn on_question(&mut self, reader: &mut MessageReader<'_>) -> Result<(), DomainError> {
        let question = reader.parse_question()?;
        self.message.questions.push(question);
        Ok(())
    }

    fn on_record(
        &mut self,
        section: Section,
        reader: &mut MessageReader<'_>,
    ) -> Result<(), DomainError> {
        let record = reader.parse_record()?;
        self.message.push_record(section, record);
        Ok(())
    }
}

pub struct MessageReader<'a> {
    buf: &'a [u8],
    parse_start: usize,
    parse_end: usize,
    end: usize,
}

impl<'a> MessageReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            parse_start: 0,
            parse_end: 0,
            end: buf.len(),
        }
    }

    /// Reader over `buf[start..end]`; offsets stay relative to `buf` so
    /// pointers into earlier bytes still resolve.
    pub fn with_range(buf: &'a [u8], start: usize, end: usize) -> Result<Self, DomainError> {
        if end > buf.len() || start > end {
            return Err(DomainError::BoundsError(format!(
                "range {}..{} outside buffer of {} bytes",
                start,
                end,
                buf.len()
            )));
        }
        Ok(Self {
            buf,
            parse_start: start,
            parse_end: start,
            end,
        })
    }

    pub fn position(&self) -> usize {
        self.parse_start
    }

    /// End of the section currently being decoded.
    pub fn section_end(&self) -> usize {
        self.parse_end
    }

    pub fn remaining(&self) -> usize {
        self.parse_end.saturating_sub(self.parse_start)
    }

    fn bounds(&self, what: &str, at: usize) -> DomainError {
        DomainError::BoundsError(format!(
            "{} at offset {} runs past end of message ({} bytes)",
            what, at, self.end
        ))
    }

    fn read_u16_at(&self, at: usize) -> Result<u16, DomainError> {
        match self.buf.get(at..at + 2) {
            Some(b) if at + 2 <= self.end => Ok(u16::from_be_bytes([b[0], b[1]])),
            _ => Err(self.bounds("16-bit field", at)),
        }
    }

    /// Delimits the 12-byte header.
    pub fn skip_header(&mut self) -> Result<Range<usize>, DomainError> {
        let start = self.parse_start;
        if start + HFIXEDSZ > self.end {
            return Err(self.bounds("header", start));
        }
        self.parse_end = start + HFIXEDSZ;
        Ok(start..self.parse_end)
    }

    /// Delimits one question: name plus type and class.
    pub fn skip_question(&mut self) -> Result<Range<usize>, DomainError> {
        let start = self.parse_start;
        let after_name = name::skip(self.buf, start, self.end)?;
        if after_name + QFIXEDSZ > self.end {
            return Err(self.bounds("question", start));
        }
        self.parse_end = after_name + QFIXEDSZ;
        Ok(start..self.parse_end)
    }

    /// Delimits one record: owner name, fixed fields and `rdlength` bytes.
    pub fn skip_record(&mut self) -> Result<Range<usize>, DomainError> {
        let start = self.parse_start;
        let after_name = name::skip(self.buf, start, self.end)?;
        if after_name + RRFIXEDSZ > self.end {
            return Err(self.bounds("record", start));
        }
        let rdlength = self.read_u16_at(after_name + 8)? as usize;
        let end = after_name + RRFIXEDSZ + rdlength;
        if end > self.end {
            return Err(self.bounds("record data", after_name + RRFIXEDSZ));
        }
        self.parse_end = end;
        Ok(start..end)
    }

    /// Moves past the delimited section whether or not it was fully read.
    pub fn finish_section(&mut self) {
        self.parse_start = self.parse_end;
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DomainError> {
        let start = self.parse_start;
        if start + n > self.parse_end {
            return Err(DomainError::FormatError(format!(
                "{}-byte field at offset {} overruns section ending at {}",
                n, start, self.parse_end
            )));
        }
        self.parse_start += n;
        Ok(&self.buf[start..start + n])
    }

    pub fn parse_u8(&mut self) -> Result<u8, DomainError> {
        Ok(self.take(1)?[0])
    }

    pub fn parse_u16(&mut self) -> Result<u16, DomainError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn parse_u32(&mut self) -> Result<u32, DomainError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn parse_bytes(&mut self, n: usize) -> Result<&'a [u8], DomainError> {
        self.take(n)
    }

    /// Everything left in the delimited section.
    pub fn parse_rest(&mut self) -> &'a [u8] {
        let rest = &self.buf[self.parse_start..self.parse_end];
        self.parse_start = self.parse_end;
        rest
    }

    /// Reads a possibly compressed name and renders it as presentation text.
    pub fn parse_name(&mut self) -> Result<String, DomainError> {
        let (wire, consumed) = name::unpack(self.buf, self.parse_start, self.parse_end)?;
        let text = name::ntop(&wire, MAXDNAME)?;
        self.parse_start += consumed;
        Ok(text)
    }

    pub fn parse_header(&mut self) -> Result<Header, DomainError> {
        let mut header = Header::new(self.parse_u16()?);
        header.set_flags(self.parse_u16()?);
        header.qdcount = self.parse_u16()?;
        header.ancount = self.parse_u16()?;
        header.nscount = self.parse_u16()?;
        header.arcount = self.parse_u16()?;
        Ok(header)
    }

    pub fn parse_question(&mut self) -> Result<Question, DomainError> {
        let name = self.parse_name()?;
        let record_type = RecordType::from_u16(self.parse_u16()?);
        let class = RecordClass::from_u16(self.parse_u16()?);
        Ok(Question::new(name, record_type, class))
    }

    /// Decodes one record; the payload must consume exactly `rdlength` bytes.
    pub fn parse_record(&mut self) -> Result<ResourceRecord, DomainError> {
        let name = self.parse_name()?;
        let record_type = RecordType::from_u16(self.parse_u16()?);
        let class = RecordClass::from_u16(self.parse_u16()?);
        let ttl = self.parse_u32()?;
        let rdlength = self.parse_u16()? as usize;
        if self.parse_start + rdlength != self.parse_end {
            return Err(DomainError::FormatError(format!(
                "rdlength {} does not match record data of {} bytes",
                rdlength,
                self.parse_end - self.parse_start
            )));
        }

        let rdata = self.parse_rdata(record_type).map_err(|e| match e {
            DomainError::BoundsError(msg) => {
                DomainError::FormatError(format!("{} record data malformed: {}", record_type, msg))
            }
            other => other,
        })?;
        if self.parse_start != self.parse_end {
            return Err(DomainError::FormatError(format!(
                "{} record data left {} of {} bytes unread",
                record_type,
                self.parse_end - self.parse_start,
                rdlength
            )));
        }

        Ok(ResourceRecord {
            name,
            record_type,
            class,
            ttl,
            rdata,
        })
    }

    /// Decodes a payload of the given type from the rest of the section.
    pub fn parse_rdata(&mut self, record_type: RecordType) -> Result<RData, DomainError> {
        let rdata = match record_type {
            RecordType::A => {
                let b = self.parse_bytes(INADDRSZ)?;
                RData::A(Ipv4Addr::new(b[0], b[1], b[2], b[3]))
            }
            RecordType::AAAA => {
                let mut octets = [0u8; IN6ADDRSZ];
                octets.copy_from_slice(self.parse_bytes(IN6ADDRSZ)?);
                RData::Aaaa(Ipv6Addr::from(octets))
            }
            RecordType::NS => RData::Ns(self.parse_name()?),
            RecordType::CNAME => RData::Cname(self.parse_name()?),
            RecordType::PTR => RData::Ptr(self.parse_name()?),
            RecordType::MX => RData::Mx {
                preference: self.parse_u16()?,
                exchange: self.parse_name()?,
            },
            RecordType::SOA => RData::Soa(Soa {
                mname: self.parse_name()?,
                rname: self.parse_name()?,
                serial: self.parse_u32()?,
                refresh: self.parse_u32()?,
                retry: self.parse_u32()?,
                expire: self.parse_u32()?,
                minimum: self.parse_u32()?,
            }),
            RecordType::TXT => {
                let mut strings = Vec::new();
                while self.remaining() > 0 {
                    let len = self.parse_u8()? as usize;
                    strings.push(self.parse_bytes(len)?.to_vec());
                }
                RData::Txt(strings)
            }
            RecordType::NSEC => {
                let next_domain_name = self.parse_name()?;
                let type_bit_maps = self.parse_rest();
                parse_type_bitmap(type_bit_maps)?;
                RData::Nsec {
                    next_domain_name,
                    type_bit_maps: type_bit_maps.to_vec(),
                }
            }
            _ => RData::Unknown(self.parse_rest().to_vec()),
        };
        Ok(rdata)
    }

    /// Runs both passes over a whole message, calling `handler` per section.
    pub fn parse_message<H>(&mut self, handler: &mut H) -> Result<(), DomainError>
    where
        H: SectionHandler + ?Sized,
    {
        handler.on_message_begin();

        let header = self.skip_header()?;
        let count_at = |i: usize| self.read_u16_at(header.start + 4 + 2 * i);
        let qdcount = count_at(0)?;
        let counts = [
            (Section::Answer, count_at(1)?),
            (Section::Authority, count_at(2)?),
            (Section::Additional, count_at(3)?),
        ];
        handler.on_header(self)?;
        self.finish_section();

        for _ in 0..qdcount {
            self.skip_question()?;
            handler.on_question(self)?;
            self.finish_section();
        }

        for (section, count) in counts {
            if count > 0 {
                handler.on_section_begin(section);
            }
            for _ in 0..count {
                self.skip_record()?;
                handler.on_record(section, self)?;
                self.finish_section();
            }
        }

        handler.on_message_complete();
        Ok(())
    }
}
