//! Domain name conversion between presentation text and wire form,
//! plus compression (RFC 1035 §4.1.4).
//!
//! Wire names handed to or returned from these functions are uncompressed
//! label sequences ending in the root label. Compression pointers only
//! appear inside message buffers.

use dnswire_domain::DomainError;

use super::{
    bitstring, classify_label, label_len, LabelKind, CMPRSFLGS, MAXCDNAME, MAXLABEL,
    MAX_POINTER_OFFSET, TYPE_ELT,
};

/// Default number of offsets remembered per message.
pub const DEFAULT_COMPRESSION_ENTRIES: usize = 20;

/// Offsets of names already written into the current message.
///
/// Only offsets below `0x4000` are recorded, since a pointer cannot reach
/// further. Once full, later names are still written but never become
/// compression targets.
#[derive(Debug, Clone)]
pub struct CompressionTable {
    offsets: Vec<usize>,
    capacity: usize,
}

impl Default for CompressionTable {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_COMPRESSION_ENTRIES)
    }
}

impl CompressionTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            offsets: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.offsets.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records `offset` if there is room and a pointer could reach it.
    pub fn register(&mut self, offset: usize) -> bool {
        if self.is_full() || offset >= MAX_POINTER_OFFSET {
            return false;
        }
        self.offsets.push(offset);
        true
    }

    pub fn truncate(&mut self, len: usize) {
        self.offsets.truncate(len);
    }

    pub fn reset(&mut self) {
        self.offsets.clear();
    }
}

fn is_special(c: u8) -> bool {
    matches!(c, b'"' | b'.' | b';' | b'\\' | b'(' | b')' | b'@' | b'$')
}

fn is_printable(c: u8) -> bool {
    (0x21..=0x7e).contains(&c)
}

/// Fails unless `extra` more bytes still leave room for a terminator.
fn reserve(out: &str, extra: usize, dst_size: usize) -> Result<(), DomainError> {
    if out.len() + extra >= dst_size {
        return Err(DomainError::SizeError(format!(
            "presentation name does not fit in {} bytes",
            dst_size
        )));
    }
    Ok(())
}

/// Renders an uncompressed wire name as presentation text.
///
/// The root renders as `"."`; other names carry no trailing dot. Special
/// characters are backslash-escaped and bytes outside `0x21..=0x7e` become
/// `\DDD`. `dst_size` bounds the output length including one terminator slot.
pub fn ntop(src: &[u8], dst_size: usize) -> Result<String, DomainError> {
    let mut out = String::new();
    let mut cp = 0usize;
    loop {
        let kind = classify_label(src, cp).map_err(|e| match e {
            DomainError::BoundsError(_) => {
                DomainError::FormatError("wire name is not terminated".to_string())
            }
            other => other,
        })?;
        cp += 1;
        let len = match kind {
            LabelKind::Root => break,
            LabelKind::Pointer => {
                return Err(DomainError::FormatError(
                    "compression pointer in uncompressed name".to_string(),
                ))
            }
            LabelKind::Plain(len) | LabelKind::BitString(len) => len,
        };
        if !out.is_empty() {
            reserve(&out, 1, dst_size)?;
            out.push('.');
        }
        reserve(&out, len, dst_size)?;

        if let LabelKind::BitString(_) = kind {
            let (text, used) = bitstring::decode(&src[cp..])?;
            reserve(&out, text.len(), dst_size)?;
            out.push_str(&text);
            cp += used;
            continue;
        }

        let label = src
            .get(cp..cp + len)
            .ok_or_else(|| DomainError::FormatError("wire label runs past end of name".to_string()))?;
        for &c in label {
            if is_special(c) {
                reserve(&out, 2, dst_size)?;
                out.push('\\');
                out.push(c as char);
            } else if !is_printable(c) {
                reserve(&out, 4, dst_size)?;
                out.push('\\');
                out.push_str(&format!("{:03}", c));
            } else {
                reserve(&out, 1, dst_size)?;
                out.push(c as char);
            }
        }
        cp += len;
    }
    if out.is_empty() {
        reserve(&out, 1, dst_size)?;
        out.push('.');
    }
    reserve(&out, 0, dst_size)?;
    Ok(out)
}

/// Result of parsing presentation text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireName {
    pub wire: Vec<u8>,
    /// The text ended with an unescaped `.`.
    pub fully_qualified: bool,
}

fn close_label(dst: &mut [u8], label: usize) -> Result<usize, DomainError> {
    let len = dst.len() - label - 1;
    if len > MAXLABEL {
        return Err(DomainError::SizeError(format!(
            "label of {} bytes exceeds {}",
            len, MAXLABEL
        )));
    }
    dst[label] = len as u8;
    Ok(len)
}

fn check_total(dst: &[u8]) -> Result<(), DomainError> {
    if dst.len() > MAXCDNAME {
        return Err(DomainError::SizeError(format!(
            "name of {} bytes exceeds {}",
            dst.len(),
            MAXCDNAME
        )));
    }
    Ok(())
}

/// Parses presentation text into an uncompressed wire name.
///
/// Understands `\DDD` decimal escapes, `\c` literal escapes and `\[...]`
/// bit-string labels. `""` and `"."` both yield the root name.
pub fn pton(src: &str) -> Result<WireName, DomainError> {
    let bytes = src.as_bytes();
    let mut dst: Vec<u8> = Vec::with_capacity(bytes.len() + 2);
    let mut label = 0usize;
    dst.push(0);

    let mut i = 0usize;
    let mut escaped = false;
    while i < bytes.len() {
        let mut c = bytes[i];
        i += 1;

        if escaped {
            escaped = false;
            if c == b'[' {
                if dst.len() != label + 1 {
                    return Err(DomainError::FormatError(
                        "bit-string label must stand alone".to_string(),
                    ));
                }
                let close = bytes[i..]
                    .iter()
                    .position(|&b| b == b']')
                    .map(|p| i + p)
                    .ok_or_else(|| {
                        DomainError::FormatError("unterminated bit-string label".to_string())
                    })?;
                let encoded = bitstring::encode(&bytes[i..=close])?;
                dst.truncate(label);
                dst.extend_from_slice(&encoded);
                check_total(&dst)?;
                i = close + 1;

                match bytes.get(i) {
                    None => {
                        dst.push(0);
                        check_total(&dst)?;
                        return Ok(WireName {
                            wire: dst,
                            fully_qualified: false,
                        });
                    }
                    Some(b'.') => {
                        i += 1;
                        if i == bytes.len() {
                            dst.push(0);
                            check_total(&dst)?;
                            return Ok(WireName {
                                wire: dst,
                                fully_qualified: true,
                            });
                        }
                        if bytes[i] == b'.' {
                            return Err(DomainError::FormatError(
                                "empty label in name".to_string(),
                            ));
                        }
                        label = dst.len();
                        dst.push(0);
                        continue;
                    }
                    Some(_) => {
                        return Err(DomainError::FormatError(
                            "bit-string label must be followed by '.' or end of name".to_string(),
                        ))
                    }
                }
            } else if c.is_ascii_digit() {
                let digits = bytes
                    .get(i..i + 2)
                    .filter(|d| d.iter().all(u8::is_ascii_digit))
                    .ok_or_else(|| {
                        DomainError::FormatError("\\DDD escape needs three digits".to_string())
                    })?;
                let value = (c - b'0') as u32 * 100
                    + (digits[0] - b'0') as u32 * 10
                    + (digits[1] - b'0') as u32;
                if value > 255 {
                    return Err(DomainError::FormatError(format!(
                        "\\{:03} escape is out of range",
                        value
                    )));
                }
                c = value as u8;
                i += 2;
            }
        } else if c == b'\\' {
            escaped = true;
            continue;
        } else if c == b'.' {
            let len = close_label(&mut dst, label)?;
            if i == bytes.len() {
                if len != 0 {
                    dst.push(0);
                }
                check_total(&dst)?;
                return Ok(WireName {
                    wire: dst,
                    fully_qualified: true,
                });
            }
            if len == 0 || bytes[i] == b'.' {
                return Err(DomainError::FormatError("empty label in name".to_string()));
            }
            label = dst.len();
            dst.push(0);
            continue;
        }

        dst.push(c);
        if dst.len() - label - 1 > MAXLABEL {
            return Err(DomainError::SizeError(format!(
                "label exceeds {} bytes",
                MAXLABEL
            )));
        }
        check_total(&dst)?;
    }

    if escaped {
        return Err(DomainError::FormatError(
            "name ends with a lone backslash".to_string(),
        ));
    }
    let len = close_label(&mut dst, label)?;
    if len != 0 {
        dst.push(0);
    }
    check_total(&dst)?;
    Ok(WireName {
        wire: dst,
        fully_qualified: false,
    })
}

/// Walks the labels of an uncompressed name, returning its wire length.
fn validate_uncompressed(src: &[u8]) -> Result<usize, DomainError> {
    let mut p = 0usize;
    loop {
        match classify_label(src, p)? {
            LabelKind::Root => {
                p += 1;
                break;
            }
            LabelKind::Pointer => {
                return Err(DomainError::FormatError(
                    "compression pointer in uncompressed name".to_string(),
                ))
            }
            LabelKind::Plain(len) | LabelKind::BitString(len) => p += len + 1,
        }
        if p > MAXCDNAME {
            return Err(DomainError::SizeError(format!(
                "name exceeds {} bytes",
                MAXCDNAME
            )));
        }
    }
    if p > MAXCDNAME || p > src.len() {
        return Err(DomainError::SizeError(format!(
            "name exceeds {} bytes",
            MAXCDNAME
        )));
    }
    Ok(p)
}

/// Writes `src` into `dst[start..end]`, compressing against names recorded
/// in `table`.
///
/// `dst[..start]` must hold the message written so far. Returns the bytes
/// written. On failure the table is restored to its length at entry. Without
/// a table the name is copied verbatim.
pub fn pack(
    src: &[u8],
    dst: &mut [u8],
    start: usize,
    end: usize,
    table: Option<&mut CompressionTable>,
) -> Result<usize, DomainError> {
    let end = end.min(dst.len());
    validate_uncompressed(src)?;

    let mut table = table;
    let saved = table.as_ref().map(|t| t.len()).unwrap_or(0);
    let result = pack_labels(src, dst, start, end, table.as_deref_mut());
    if result.is_err() {
        if let Some(table) = table {
            table.truncate(saved);
        }
    }
    result
}

fn pack_labels(
    src: &[u8],
    dst: &mut [u8],
    start: usize,
    end: usize,
    mut table: Option<&mut CompressionTable>,
) -> Result<usize, DomainError> {
    let no_room = || DomainError::SizeError(format!("name does not fit before offset {}", end));
    let mut pos = start;
    let mut p = 0usize;
    let mut first = true;
    loop {
        let n = src[p];
        if n != 0 {
            if let Some(table) = table.as_deref_mut() {
                if let Some(target) = dn_find(&src[p..], &dst[..pos], table) {
                    if pos + 2 > end {
                        return Err(no_room());
                    }
                    dst[pos] = CMPRSFLGS | (target >> 8) as u8;
                    dst[pos + 1] = (target & 0xff) as u8;
                    return Ok(pos + 2 - start);
                }
                if first && n & CMPRSFLGS == 0 && table.register(pos) {
                    first = false;
                }
            }
        }
        let len = label_len(src, p)?;
        if pos + 1 + len > end {
            return Err(no_room());
        }
        dst[pos..pos + 1 + len].copy_from_slice(&src[p..p + 1 + len]);
        p += 1 + len;
        pos += 1 + len;
        if n == 0 {
            break;
        }
    }
    Ok(pos - start)
}

/// Finds an already-written name equal to the label sequence `name`,
/// comparing ASCII case-insensitively.
///
/// Every suffix of each recorded name is a candidate, so `b.c` matches
/// inside a recorded `a.b.c`. Only plain labels are compared; a recorded
/// name containing an extended label never matches.
pub fn dn_find(name: &[u8], msg: &[u8], table: &CompressionTable) -> Option<usize> {
    for &offset in table.offsets() {
        let mut sp = offset;
        while let Some(&len) = msg.get(sp) {
            if len == 0 || len & CMPRSFLGS != 0 || sp >= MAX_POINTER_OFFSET {
                break;
            }
            if matches_at(name, msg, sp).unwrap_or(false) {
                return Some(sp);
            }
            sp += len as usize + 1;
        }
    }
    None
}

fn matches_at(name: &[u8], msg: &[u8], start: usize) -> Option<bool> {
    let mut dn = 0usize;
    let mut cp = start;
    let mut hops = 0usize;
    loop {
        let n = *msg.get(cp)?;
        cp += 1;
        match n & CMPRSFLGS {
            0 => {
                if *name.get(dn)? != n {
                    return Some(false);
                }
                dn += 1;
                let len = n as usize;
                let ours = name.get(dn..dn + len)?;
                let theirs = msg.get(cp..cp + len)?;
                if !ours.eq_ignore_ascii_case(theirs) {
                    return Some(false);
                }
                dn += len;
                cp += len;
                let next = *name.get(dn)?;
                if next == 0 && msg.get(cp) == Some(&0) {
                    return Some(true);
                }
                if next == 0 {
                    return Some(false);
                }
            }
            CMPRSFLGS => {
                let target = ((n & !CMPRSFLGS) as usize) << 8 | *msg.get(cp)? as usize;
                if target >= cp - 1 {
                    return Some(false);
                }
                hops += 1;
                if hops > msg.len() {
                    return Some(false);
                }
                cp = target;
            }
            _ => return Some(false),
        }
    }
}

/// Expands the possibly compressed name at `offset`, reading no further
/// than `end`.
///
/// Returns the uncompressed wire name and the bytes the name occupies at
/// `offset`: up to and including the first pointer, or the root label when
/// there is none. Pointers must target an earlier offset below `end`.
pub fn unpack(msg: &[u8], offset: usize, end: usize) -> Result<(Vec<u8>, usize), DomainError> {
    if end > msg.len() {
        return Err(DomainError::BoundsError(format!(
            "end {} beyond buffer of {} bytes",
            end,
            msg.len()
        )));
    }
    let mut dst = Vec::with_capacity(32);
    let mut src = offset;
    let mut consumed: Option<usize> = None;
    let mut checked = 0usize;
    loop {
        if src >= end {
            return Err(DomainError::BoundsError(format!(
                "name at offset {} runs past offset {}",
                offset, end
            )));
        }
        let n = msg[src];
        match classify_label(&msg[..end], src)? {
            LabelKind::Root => {
                src += 1;
                dst.push(0);
                break;
            }
            LabelKind::Plain(len) | LabelKind::BitString(len) => {
                if src + 1 + len >= end {
                    return Err(DomainError::BoundsError(format!(
                        "label at offset {} runs past offset {}",
                        src, end
                    )));
                }
                if dst.len() + len + 2 > MAXCDNAME {
                    return Err(DomainError::SizeError(format!(
                        "expanded name exceeds {} bytes",
                        MAXCDNAME
                    )));
                }
                checked += len + 1;
                dst.extend_from_slice(&msg[src..src + 1 + len]);
                src += 1 + len;
            }
            LabelKind::Pointer => {
                if src + 1 >= end {
                    return Err(DomainError::BoundsError(format!(
                        "pointer at offset {} is cut off",
                        src
                    )));
                }
                if consumed.is_none() {
                    consumed = Some(src + 2 - offset);
                }
                let target = ((n & !CMPRSFLGS) as usize) << 8 | msg[src + 1] as usize;
                if target >= end {
                    return Err(DomainError::BoundsError(format!(
                        "pointer at offset {} targets {} past offset {}",
                        src, target, end
                    )));
                }
                if target >= src {
                    return Err(DomainError::FormatError(format!(
                        "pointer at offset {} does not point backwards",
                        src
                    )));
                }
                checked += 2;
                if checked >= end {
                    return Err(DomainError::FormatError(
                        "compression pointer loop".to_string(),
                    ));
                }
                src = target;
            }
        }
    }
    let used = match consumed {
        Some(used) => used,
        None => src - offset,
    };
    Ok((dst, used))
}

/// Returns the offset just past the name at `pos`, without expanding it.
pub fn skip(buf: &[u8], pos: usize, end: usize) -> Result<usize, DomainError> {
    let end = end.min(buf.len());
    let mut cp = pos;
    loop {
        if cp >= end {
            return Err(DomainError::BoundsError(format!(
                "name at offset {} runs past offset {}",
                pos, end
            )));
        }
        let n = buf[cp];
        match n & CMPRSFLGS {
            0 if n == 0 => {
                cp += 1;
                break;
            }
            0 | TYPE_ELT => cp += 1 + label_len(&buf[..end], cp)?,
            CMPRSFLGS => {
                cp += 2;
                break;
            }
            _ => {
                return Err(DomainError::FormatError(format!(
                    "reserved label type 0x{:02x} at offset {}",
                    n, cp
                )))
            }
        }
    }
    if cp > end {
        return Err(DomainError::BoundsError(format!(
            "name at offset {} runs past offset {}",
            pos, end
        )));
    }
    Ok(cp)
}

/// Presentation text to wire form, ignoring whether it was fully qualified.
pub fn to_wire(name: &str) -> Result<Vec<u8>, DomainError> {
    Ok(pton(name)?.wire)
}

/// Wire form to presentation text with the standard size bound.
pub fn to_presentation(wire: &[u8]) -> Result<String, DomainError> {
    ntop(wire, super::MAXDNAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(parts: &[&str]) -> Vec<u8> {
        let mut out = Vec::new();
        for part in parts {
            out.push(part.len() as u8);
            out.extend_from_slice(part.as_bytes());
        }
        out.push(0);
        out
    }

    #[test]
    fn test_pton_simple_and_qualified() {
        let relative = pton("example.com").unwrap();
        assert_eq!(relative.wire, wire(&["example", "com"]));
        assert!(!relative.fully_qualified);

        let absolute = pton("example.com.").unwrap();
        assert_eq!(absolute.wire, relative.wire);
        assert!(absolute.fully_qualified);
    }

    #[test]
    fn test_pton_root_forms() {
        assert_eq!(pton(".").unwrap(), WireName { wire: vec![0], fully_qualified: true });
        assert_eq!(pton("").unwrap(), WireName { wire: vec![0], fully_qualified: false });
    }

    #[test]
    fn test_pton_escapes() {
        assert_eq!(pton("a\\.b.c").unwrap().wire, wire(&["a.b", "c"]));
        assert_eq!(pton("\\065x").unwrap().wire, wire(&["Ax"]));
        assert_eq!(pton("\\000").unwrap().wire, vec![1, 0, 0]);
    }

    #[test]
    fn test_pton_rejects_empty_labels() {
        for bad in ["a..b", ".a", "..", "a.."] {
            assert!(pton(bad).unwrap_err().is_format(), "{}", bad);
        }
    }

    #[test]
    fn test_pton_rejects_bad_escapes() {
        assert!(pton("\\256").unwrap_err().is_format());
        assert!(pton("\\12").unwrap_err().is_format());
        assert!(pton("\\1a2").unwrap_err().is_format());
        assert!(pton("abc\\").unwrap_err().is_format());
    }

    #[test]
    fn test_pton_label_length_limit() {
        let ok = "a".repeat(63);
        assert!(pton(&ok).is_ok());
        let too_long = "a".repeat(64);
        assert!(pton(&too_long).unwrap_err().is_size());
    }

    #[test]
    fn test_pton_total_length_limit() {
        // 4 labels of 63 bytes: 4 * 64 + 1 = 257 bytes on the wire
        let label = "a".repeat(63);
        let name = [label.as_str(); 4].join(".");
        assert!(pton(&name).unwrap_err().is_size());
        let name = [label.as_str(), label.as_str(), label.as_str(), &"a".repeat(61)].join(".");
        assert_eq!(pton(&name).unwrap().wire.len(), 255);
    }

    #[test]
    fn test_pton_bitstring_label() {
        let parsed = pton("\\[x3FF/12].example").unwrap();
        let mut expected = vec![0x41, 12, 0x3f, 0xf0];
        expected.extend(wire(&["example"]));
        assert_eq!(parsed.wire, expected);

        assert!(pton("\\[x3FF/12]x").unwrap_err().is_format());
        assert!(pton("ab\\[x3]").unwrap_err().is_format());
        assert_eq!(pton("\\[xF]").unwrap().wire, vec![0x41, 4, 0xf0, 0]);
    }

    #[test]
    fn test_ntop_escapes() {
        let name = pton("a\\.b.c").unwrap().wire;
        assert_eq!(ntop(&name, 1025).unwrap(), "a\\.b.c");

        let raw = vec![3, b'a', 0x07, b' ', 0];
        assert_eq!(ntop(&raw, 1025).unwrap(), "a\\007\\032");

        let specials = vec![4, b'"', b'@', b'$', b';', 0];
        assert_eq!(ntop(&specials, 1025).unwrap(), "\\\"\\@\\$\\;");
    }

    #[test]
    fn test_ntop_root_and_bitstring() {
        assert_eq!(ntop(&[0], 1025).unwrap(), ".");
        let name = vec![0x41, 12, 0x3f, 0xf0, 3, b'c', b'o', b'm', 0];
        assert_eq!(ntop(&name, 1025).unwrap(), "\\[x3FF/12].com");
    }

    #[test]
    fn test_ntop_rejects_pointer_and_reserved() {
        assert!(ntop(&[0xc0, 0x0c], 1025).unwrap_err().is_format());
        assert!(ntop(&[0x80, 0], 1025).unwrap_err().is_format());
        assert!(ntop(&[0x42, 0], 1025).unwrap_err().is_format());
        assert!(ntop(&[3, b'a'], 1025).unwrap_err().is_format());
    }

    #[test]
    fn test_ntop_respects_destination_size() {
        let name = wire(&["abc"]);
        assert_eq!(ntop(&name, 4).unwrap(), "abc");
        assert!(ntop(&name, 3).unwrap_err().is_size());
        assert!(ntop(&[0], 1).unwrap_err().is_size());
    }

    #[test]
    fn test_presentation_roundtrip_preserves_bytes() {
        for text in ["example.com", "a\\.b", "\\000\\255.x", "\\[xDEAD/16].arpa", "."] {
            let w = to_wire(text).unwrap();
            let back = to_presentation(&w).unwrap();
            assert_eq!(to_wire(&back).unwrap(), w, "{}", text);
        }
    }

    #[test]
    fn test_pack_compresses_repeated_suffix() {
        let mut buf = [0u8; 64];
        let mut table = CompressionTable::default();
        let first = wire(&["www", "example", "com"]);
        let n1 = pack(&first, &mut buf, 12, 64, Some(&mut table)).unwrap();
        assert_eq!(n1, first.len());
        assert_eq!(table.offsets(), &[12]);

        let second = wire(&["mail", "EXAMPLE", "com"]);
        let n2 = pack(&second, &mut buf, 12 + n1, 64, Some(&mut table)).unwrap();
        // "mail" label plus a pointer to "example.com" at offset 16
        assert_eq!(n2, 5 + 2);
        assert_eq!(&buf[12 + n1 + 5..12 + n1 + 7], &[0xc0, 16]);
        assert_eq!(table.offsets(), &[12, 12 + n1]);
    }

    #[test]
    fn test_pack_whole_name_pointer() {
        let mut buf = [0u8; 64];
        let mut table = CompressionTable::default();
        let name = wire(&["example", "com"]);
        let n1 = pack(&name, &mut buf, 0, 64, Some(&mut table)).unwrap();
        let n2 = pack(&name, &mut buf, n1, 64, Some(&mut table)).unwrap();
        assert_eq!(n2, 2);
        assert_eq!(&buf[n1..n1 + 2], &[0xc0, 0]);
    }

    #[test]
    fn test_pack_without_table_copies() {
        let mut buf = [0u8; 32];
        let name = wire(&["a", "b"]);
        let n = pack(&name, &mut buf, 3, 32, None).unwrap();
        assert_eq!(&buf[3..3 + n], name.as_slice());
    }

    #[test]
    fn test_pack_overflow_restores_table() {
        let mut buf = [0u8; 8];
        let mut table = CompressionTable::default();
        let name = wire(&["example", "com"]);
        assert!(pack(&name, &mut buf, 0, 8, Some(&mut table)).unwrap_err().is_size());
        assert!(table.is_empty());
    }

    #[test]
    fn test_pack_full_table_stops_registering() {
        let mut buf = [0u8; 64];
        let mut table = CompressionTable::with_capacity(1);
        let a = wire(&["a"]);
        let b = wire(&["b"]);
        let n = pack(&a, &mut buf, 0, 64, Some(&mut table)).unwrap();
        pack(&b, &mut buf, n, 64, Some(&mut table)).unwrap();
        assert_eq!(table.offsets(), &[0]);
    }

    #[test]
    fn test_pack_skips_bitstring_first_label_as_target() {
        let mut buf = [0u8; 64];
        let mut table = CompressionTable::default();
        let name = to_wire("\\[x3FF/12].example").unwrap();
        let n = pack(&name, &mut buf, 12, 64, Some(&mut table)).unwrap();
        assert_eq!(n, name.len());
        // the bit-string label at 12 is never a target; "example" at 16 is
        assert_eq!(table.offsets(), &[16]);

        let plain = wire(&["example"]);
        let used = pack(&plain, &mut buf, 12 + n, 64, Some(&mut table)).unwrap();
        assert_eq!(used, 2);
        assert_eq!(&buf[12 + n..12 + n + 2], &[0xc0, 16]);
    }

    #[test]
    fn test_pack_rejects_pointer_in_source() {
        let mut buf = [0u8; 16];
        assert!(pack(&[0xc0, 0], &mut buf, 0, 16, None).is_err());
    }

    #[test]
    fn test_dn_find_follows_pointers() {
        // "example.com" at 0, then "www" + pointer to 0 at 13
        let mut msg = wire(&["example", "com"]);
        msg.extend_from_slice(&[3, b'w', b'w', b'w', 0xc0, 0x00]);
        let mut table = CompressionTable::default();
        table.register(13);
        let target = wire(&["WWW", "example", "com"]);
        assert_eq!(dn_find(&target, &msg, &table), Some(13));
        assert_eq!(dn_find(&wire(&["other"]), &msg, &table), None);
    }

    #[test]
    fn test_unpack_follows_pointer() {
        let mut msg = vec![0u8; 12];
        msg.extend(wire(&["example", "com"]));
        msg.extend_from_slice(&[3, b'w', b'w', b'w', 0xc0, 12]);
        let (name, used) = unpack(&msg, 25, msg.len()).unwrap();
        assert_eq!(name, wire(&["www", "example", "com"]));
        assert_eq!(used, 6);

        let (name, used) = unpack(&msg, 12, msg.len()).unwrap();
        assert_eq!(name, wire(&["example", "com"]));
        assert_eq!(used, 13);
    }

    #[test]
    fn test_unpack_pointer_only_name_behind_offset() {
        // question name at 12, answer owner at 29 is a bare pointer back to it
        let mut msg = vec![0u8; 12];
        msg.extend(wire(&["example", "com"]));
        msg.extend_from_slice(&[0, 1, 0, 1]);
        assert_eq!(msg.len(), 29);
        msg.extend_from_slice(&[0xc0, 12]);
        let (name, used) = unpack(&msg, 29, msg.len()).unwrap();
        assert_eq!(name, wire(&["example", "com"]));
        assert_eq!(used, 2);
    }

    #[test]
    fn test_unpack_rejects_forward_and_self_pointers() {
        let msg = [0xc0, 0x00];
        assert!(unpack(&msg, 0, 2).unwrap_err().is_format());
        let msg = [0xc0, 0x02, 0];
        assert!(unpack(&msg, 0, 3).unwrap_err().is_format());
    }

    #[test]
    fn test_unpack_rejects_out_of_range_pointer() {
        let msg = [0, 0, 0xc0, 0x10];
        assert!(unpack(&msg, 2, 4).unwrap_err().is_bounds());
    }

    #[test]
    fn test_unpack_truncated_label() {
        let msg = [5, b'a', b'b'];
        assert!(unpack(&msg, 0, 3).unwrap_err().is_bounds());
    }

    #[test]
    fn test_skip_cases() {
        let name = wire(&["example", "com"]);
        assert_eq!(skip(&name, 0, name.len()).unwrap(), name.len());
        assert_eq!(skip(&[3, b'w', b'w', b'w', 0xc0, 0], 0, 6).unwrap(), 6);
        assert_eq!(skip(&[0x41, 12, 0x3f, 0xf0, 0], 0, 5).unwrap(), 5);
        assert!(skip(&[0x80], 0, 1).unwrap_err().is_format());
        assert!(skip(&[3, b'a', b'b'], 0, 3).unwrap_err().is_bounds());
        assert!(skip(&[0xc0], 0, 1).unwrap_err().is_bounds());
    }
}
