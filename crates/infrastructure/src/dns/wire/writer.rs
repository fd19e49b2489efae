//! Capacity-checked message encoding.
//!
//! Running out of room is not an error here. The first write that does not
//! fit marks the writer truncated, and from then on every write is a no-op.
//! [`MessageWriter::write_message`] turns that into a well-formed message
//! with the TC bit set and only the entries that fit whole.

use dnswire_domain::{DomainError, Header, Message, Question, RData, ResourceRecord};

use super::name::{self, CompressionTable};
use super::{HFIXEDSZ, MAXMSG};

pub struct MessageWriter<'a> {
    buf: &'a mut [u8],
    write_start: usize,
    write_end: usize,
    rd_start: usize,
    tr_start: usize,
    truncated: bool,
    table: CompressionTable,
}

impl<'a> MessageWriter<'a> {
    /// Writer over `buf`, never producing more than `limit` bytes.
    pub fn new(buf: &'a mut [u8], limit: usize) -> Self {
        Self::with_table(buf, limit, CompressionTable::default())
    }

    pub fn with_compression_entries(buf: &'a mut [u8], limit: usize, entries: usize) -> Self {
        Self::with_table(buf, limit, CompressionTable::with_capacity(entries))
    }

    fn with_table(buf: &'a mut [u8], limit: usize, table: CompressionTable) -> Self {
        let write_end = limit.min(buf.len()).min(MAXMSG);
        Self {
            buf,
            write_start: 0,
            write_end,
            rd_start: 0,
            tr_start: 0,
            truncated: false,
            table,
        }
    }

    /// Rewinds to an empty message so the buffer can be reused.
    pub fn reset(&mut self) {
        self.write_start = 0;
        self.rd_start = 0;
        self.tr_start = 0;
        self.truncated = false;
        self.table.reset();
    }

    pub fn position(&self) -> usize {
        self.write_start
    }

    pub fn capacity(&self) -> usize {
        self.write_end
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.write_start]
    }

    fn fits(&mut self, n: usize) -> bool {
        if self.truncated {
            return false;
        }
        if self.write_start + n > self.write_end {
            self.truncated = true;
            return false;
        }
        true
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        if self.fits(bytes.len()) {
            let start = self.write_start;
            self.buf[start..start + bytes.len()].copy_from_slice(bytes);
            self.write_start += bytes.len();
        }
    }

    pub fn write_u8(&mut self, value: u8) {
        self.write_bytes(&[value]);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.write_bytes(&value.to_be_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.write_bytes(&value.to_be_bytes());
    }

    /// Writes a name, compressing against names already in this message.
    ///
    /// An over-long name or a full buffer truncates; malformed text is an error.
    pub fn write_name(&mut self, text: &str) -> Result<(), DomainError> {
        self.write_name_with(text, true)
    }

    /// Writes a name in full, neither using nor registering compression targets.
    pub fn write_name_uncompressed(&mut self, text: &str) -> Result<(), DomainError> {
        self.write_name_with(text, false)
    }

    fn write_name_with(&mut self, text: &str, compress: bool) -> Result<(), DomainError> {
        if self.truncated {
            return Ok(());
        }
        let wire = match name::pton(text) {
            Ok(parsed) => parsed.wire,
            Err(DomainError::SizeError(_)) => {
                self.truncated = true;
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        let table = if compress { Some(&mut self.table) } else { None };
        match name::pack(&wire, self.buf, self.write_start, self.write_end, table) {
            Ok(n) => {
                self.write_start += n;
                Ok(())
            }
            Err(DomainError::SizeError(_)) => {
                self.truncated = true;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub fn write_header(&mut self, header: &Header) {
        self.write_u16(header.id);
        self.write_u16(header.flags());
        self.write_u16(header.qdcount);
        self.write_u16(header.ancount);
        self.write_u16(header.nscount);
        self.write_u16(header.arcount);
    }

    pub fn write_question(&mut self, question: &Question) -> Result<(), DomainError> {
        self.write_name(&question.name)?;
        self.write_u16(question.record_type.to_u16());
        self.write_u16(question.class.to_u16());
        Ok(())
    }

    /// Reserves the rdlength field; [`Self::end_rdata`] fills it in.
    pub fn start_rdata(&mut self) {
        self.write_u16(0);
        self.rd_start = self.write_start;
    }

    pub fn end_rdata(&mut self) {
        if self.truncated {
            return;
        }
        let len = (self.write_start - self.rd_start) as u16;
        let at = self.rd_start - 2;
        self.buf[at..at + 2].copy_from_slice(&len.to_be_bytes());
    }

    /// Marks the point a truncated list rewinds to.
    pub fn start_truncate(&mut self) {
        if !self.truncated {
            self.tr_start = self.write_start;
        }
    }

    /// After truncation, discards everything written since [`Self::start_truncate`].
    pub fn end_truncate(&mut self) {
        if self.truncated {
            self.write_start = self.tr_start;
        }
    }

    pub fn write_rdata(&mut self, rdata: &RData) -> Result<(), DomainError> {
        match rdata {
            RData::A(addr) => self.write_bytes(&addr.octets()),
            RData::Aaaa(addr) => self.write_bytes(&addr.octets()),
            RData::Ns(target) | RData::Cname(target) | RData::Ptr(target) => {
                self.write_name(target)?
            }
            RData::Mx {
                preference,
                exchange,
            } => {
                self.write_u16(*preference);
                self.write_name(exchange)?;
            }
            RData::Soa(soa) => {
                self.write_name(&soa.mname)?;
                self.write_name(&soa.rname)?;
                self.write_u32(soa.serial);
                self.write_u32(soa.refresh);
                self.write_u32(soa.retry);
                self.write_u32(soa.expire);
                self.write_u32(soa.minimum);
            }
            RData::Txt(strings) => {
                for s in strings {
                    let len = u8::try_from(s.len()).map_err(|_| {
                        DomainError::InvalidRdata(format!(
                            "TXT string of {} bytes exceeds 255",
                            s.len()
                        ))
                    })?;
                    self.write_u8(len);
                    self.write_bytes(s);
                }
            }
            RData::Nsec {
                next_domain_name,
                type_bit_maps,
            } => {
                self.write_name_uncompressed(next_domain_name)?;
                self.write_bytes(type_bit_maps);
            }
            RData::Unknown(bytes) => self.write_bytes(bytes),
        }
        Ok(())
    }

    pub fn write_record(&mut self, record: &ResourceRecord) -> Result<(), DomainError> {
        self.write_name(&record.name)?;
        self.write_u16(record.record_type.to_u16());
        self.write_u16(record.class.to_u16());
        self.write_u32(record.ttl);
        self.start_rdata();
        self.write_rdata(&record.rdata)?;
        self.end_rdata();
        Ok(())
    }

    /// Serializes a whole message and returns its encoded length.
    ///
    /// Counts come from the section lengths, not from `message.header`. If the
    /// questions do not all fit, every question and record is dropped; if the
    /// records do not all fit, every record is dropped. Either way the emitted
    /// counts match what was kept and TC is set. When not even the header
    /// fits, nothing is written.
    ///
    /// The message always starts at the front of the buffer with an empty
    /// compression table, replacing anything written before.
    pub fn write_message(&mut self, message: &Message) -> Result<usize, DomainError> {
        let count = |n: usize| u16::try_from(n).map_err(|_| DomainError::MessageTooLarge(n));
        self.reset();
        let start = self.write_start;
        let mut header = message.header.clone();
        header.qdcount = count(message.questions.len())?;
        header.ancount = count(message.answers.len())?;
        header.nscount = count(message.authority.len())?;
        header.arcount = count(message.additional.len())?;

        self.write_header(&header);
        if self.truncated {
            self.write_start = start;
            return Ok(0);
        }

        self.start_truncate();
        for question in &message.questions {
            self.write_question(question)?;
            if self.truncated {
                break;
            }
        }
        if self.truncated {
            self.end_truncate();
            self.mark_truncated(start, 0);
            return Ok(self.write_start - start);
        }

        self.start_truncate();
        for record in message.records() {
            self.write_record(record)?;
            if self.truncated {
                break;
            }
        }
        if self.truncated {
            self.end_truncate();
            self.mark_truncated(start, header.qdcount);
        }
        Ok(self.write_start - start)
    }

    /// Sets TC and rewrites the counts of the header at `start`.
    fn mark_truncated(&mut self, start: usize, qdcount: u16) {
        if start + HFIXEDSZ > self.write_start {
            return;
        }
        let flags = u16::from_be_bytes([self.buf[start + 2], self.buf[start + 3]]) | Header::TC_MASK;
        self.buf[start + 2..start + 4].copy_from_slice(&flags.to_be_bytes());
        self.buf[start + 4..start + 6].copy_from_slice(&qdcount.to_be_bytes());
        self.buf[start + 6..start + HFIXEDSZ].fill(0);
    }
}
