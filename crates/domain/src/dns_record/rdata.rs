use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use super::RecordType;
use crate::DomainError;

/// Start-of-authority septuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Soa {
    pub mname: String,
    pub rname: String,
    pub serial: u32,
    pub refresh: u32,
    pub retry: u32,
    pub expire: u32,
    pub minimum: u32,
}

/// Typed record payload.
///
/// The set of shapes is closed: records whose type has no dedicated variant
/// keep their payload as opaque bytes in `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RData {
    A(Ipv4Addr),
    Ns(String),
    Cname(String),
    Soa(Soa),
    Ptr(String),
    Mx { preference: u16, exchange: String },
    /// One entry per character-string, each at most 255 bytes.
    Txt(Vec<Vec<u8>>),
    Aaaa(Ipv6Addr),
    Nsec {
        next_domain_name: String,
        type_bit_maps: Vec<u8>,
    },
    Unknown(Vec<u8>),
}

impl RData {
    /// The record type this payload shape belongs to, `None` for raw payloads.
    pub fn natural_type(&self) -> Option<RecordType> {
        match self {
            RData::A(_) => Some(RecordType::A),
            RData::Ns(_) => Some(RecordType::NS),
            RData::Cname(_) => Some(RecordType::CNAME),
            RData::Soa(_) => Some(RecordType::SOA),
            RData::Ptr(_) => Some(RecordType::PTR),
            RData::Mx { .. } => Some(RecordType::MX),
            RData::Txt(_) => Some(RecordType::TXT),
            RData::Aaaa(_) => Some(RecordType::AAAA),
            RData::Nsec { .. } => Some(RecordType::NSEC),
            RData::Unknown(_) => None,
        }
    }

    /// Whether this payload may be carried by a record of type `rtype`.
    pub fn fits(&self, rtype: RecordType) -> bool {
        match self.natural_type() {
            Some(natural) => natural == rtype,
            None => !has_typed_payload(rtype),
        }
    }

    /// Builds a payload from positional presentation arguments.
    ///
    /// ```
    /// use dnswire_domain::{RData, RecordType};
    ///
    /// let mx = RData::from_args(RecordType::MX, &["10", "mail.example.com"]).unwrap();
    /// assert_eq!(mx.to_string(), "10 mail.example.com");
    /// ```
    pub fn from_args(rtype: RecordType, args: &[&str]) -> Result<Self, DomainError> {
        match rtype {
            RecordType::A => {
                let [addr] = exact::<1>(rtype, args)?;
                addr.parse::<Ipv4Addr>()
                    .map(RData::A)
                    .map_err(|e| invalid(rtype, format!("{}: {}", addr, e)))
            }
            RecordType::AAAA => {
                let [addr] = exact::<1>(rtype, args)?;
                addr.parse::<Ipv6Addr>()
                    .map(RData::Aaaa)
                    .map_err(|e| invalid(rtype, format!("{}: {}", addr, e)))
            }
            RecordType::NS => exact::<1>(rtype, args).map(|[n]| RData::Ns(n.to_string())),
            RecordType::CNAME => exact::<1>(rtype, args).map(|[n]| RData::Cname(n.to_string())),
            RecordType::PTR => exact::<1>(rtype, args).map(|[n]| RData::Ptr(n.to_string())),
            RecordType::SOA => {
                let [mname, rname, serial, refresh, retry, expire, minimum] =
                    exact::<7>(rtype, args)?;
                Ok(RData::Soa(Soa {
                    mname: mname.to_string(),
                    rname: rname.to_string(),
                    serial: parse_u32(rtype, serial)?,
                    refresh: parse_u32(rtype, refresh)?,
                    retry: parse_u32(rtype, retry)?,
                    expire: parse_u32(rtype, expire)?,
                    minimum: parse_u32(rtype, minimum)?,
                }))
            }
            RecordType::MX => {
                let [preference, exchange] = exact::<2>(rtype, args)?;
                let preference = preference
                    .parse::<u16>()
                    .map_err(|e| invalid(rtype, format!("preference '{}': {}", preference, e)))?;
                Ok(RData::Mx {
                    preference,
                    exchange: exchange.to_string(),
                })
            }
            RecordType::TXT => {
                if args.is_empty() {
                    return Err(invalid(rtype, "at least one string is required"));
                }
                let strings = args
                    .iter()
                    .map(|s| {
                        if s.len() > 255 {
                            Err(invalid(rtype, format!("string of {} bytes exceeds 255", s.len())))
                        } else {
                            Ok(s.as_bytes().to_vec())
                        }
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(RData::Txt(strings))
            }
            RecordType::NSEC => {
                let (next, types) = args
                    .split_first()
                    .ok_or_else(|| invalid(rtype, "next domain name is required"))?;
                let types = types
                    .iter()
                    .map(|t| t.parse::<RecordType>())
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(RData::Nsec {
                    next_domain_name: next.to_string(),
                    type_bit_maps: build_type_bitmap(&types),
                })
            }
            _ => parse_generic(rtype, args),
        }
    }
}

fn has_typed_payload(rtype: RecordType) -> bool {
    matches!(
        rtype,
        RecordType::A
            | RecordType::NS
            | RecordType::CNAME
            | RecordType::SOA
            | RecordType::PTR
            | RecordType::MX
            | RecordType::TXT
            | RecordType::AAAA
            | RecordType::NSEC
    )
}

fn invalid(rtype: RecordType, msg: impl fmt::Display) -> DomainError {
    DomainError::InvalidRdata(format!("{}: {}", rtype, msg))
}

fn exact<'a, const N: usize>(
    rtype: RecordType,
    args: &[&'a str],
) -> Result<[&'a str; N], DomainError> {
    <[&str; N]>::try_from(args)
        .map_err(|_| invalid(rtype, format!("expected {} argument(s), got {}", N, args.len())))
}

fn parse_u32(rtype: RecordType, s: &str) -> Result<u32, DomainError> {
    s.parse::<u32>()
        .map_err(|e| invalid(rtype, format!("'{}': {}", s, e)))
}

/// RFC 3597 generic form `\# <length> <hex...>`; anything else is taken as raw text.
fn parse_generic(rtype: RecordType, args: &[&str]) -> Result<RData, DomainError> {
    match args {
        ["\\#", len, hex @ ..] => {
            let len = len
                .parse::<usize>()
                .map_err(|e| invalid(rtype, format!("generic length '{}': {}", len, e)))?;
            let digits: String = hex.concat();
            let bytes = decode_hex(&digits).ok_or_else(|| invalid(rtype, "malformed hex data"))?;
            if bytes.len() != len {
                return Err(invalid(
                    rtype,
                    format!("declared {} bytes, hex carries {}", len, bytes.len()),
                ));
            }
            Ok(RData::Unknown(bytes))
        }
        [raw] => Ok(RData::Unknown(raw.as_bytes().to_vec())),
        [] => Ok(RData::Unknown(Vec::new())),
        _ => Err(invalid(rtype, "expected a single raw argument or '\\# <len> <hex>'")),
    }
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 || !s.is_ascii() {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}

/// Encodes a type list as NSEC window blocks (RFC 4034 §4.1.2).
pub fn build_type_bitmap(types: &[RecordType]) -> Vec<u8> {
    let mut windows: [[u8; 32]; 256] = [[0u8; 32]; 256];
    let mut used = [false; 256];
    for rtype in types {
        let code = rtype.to_u16();
        let window = (code >> 8) as usize;
        let bit = (code & 0xff) as usize;
        windows[window][bit / 8] |= 0x80 >> (bit % 8);
        used[window] = true;
    }

    let mut out = Vec::new();
    for (window, bitmap) in windows.iter().enumerate() {
        if !used[window] {
            continue;
        }
        let len = bitmap.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
        out.push(window as u8);
        out.push(len as u8);
        out.extend_from_slice(&bitmap[..len]);
    }
    out
}

/// Decodes NSEC window blocks back into the listed types.
pub fn parse_type_bitmap(bitmap: &[u8]) -> Result<Vec<RecordType>, DomainError> {
    let mut types = Vec::new();
    let mut pos = 0;
    while pos < bitmap.len() {
        if pos + 2 > bitmap.len() {
            return Err(DomainError::FormatError(
                "NSEC window header truncated".to_string(),
            ));
        }
        let window = bitmap[pos] as u16;
        let len = bitmap[pos + 1] as usize;
        pos += 2;
        if len == 0 || len > 32 || pos + len > bitmap.len() {
            return Err(DomainError::FormatError(format!(
                "NSEC window {} has invalid bitmap length {}",
                window, len
            )));
        }
        for (i, byte) in bitmap[pos..pos + len].iter().enumerate() {
            for bit in 0..8 {
                if byte & (0x80 >> bit) != 0 {
                    types.push(RecordType::from_u16((window << 8) | (i * 8 + bit) as u16));
                }
            }
        }
        pos += len;
    }
    Ok(types)
}

fn write_character_string(f: &mut fmt::Formatter<'_>, s: &[u8]) -> fmt::Result {
    f.write_str("\"")?;
    for &c in s {
        match c {
            b'"' | b'\\' => write!(f, "\\{}", c as char)?,
            0x20..=0x7e => write!(f, "{}", c as char)?,
            _ => write!(f, "\\{:03}", c)?,
        }
    }
    f.write_str("\"")
}

impl fmt::Display for RData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RData::A(addr) => write!(f, "{}", addr),
            RData::Aaaa(addr) => write!(f, "{}", addr),
            RData::Ns(name) | RData::Cname(name) | RData::Ptr(name) => f.write_str(name),
            RData::Soa(soa) => write!(
                f,
                "{} {} {} {} {} {} {}",
                soa.mname, soa.rname, soa.serial, soa.refresh, soa.retry, soa.expire, soa.minimum
            ),
            RData::Mx {
                preference,
                exchange,
            } => write!(f, "{} {}", preference, exchange),
            RData::Txt(strings) => {
                for (i, s) in strings.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write_character_string(f, s)?;
                }
                Ok(())
            }
            RData::Nsec {
                next_domain_name,
                type_bit_maps,
            } => {
                f.write_str(next_domain_name)?;
                match parse_type_bitmap(type_bit_maps) {
                    Ok(types) => {
                        for t in types {
                            write!(f, " {}", t)?;
                        }
                        Ok(())
                    }
                    Err(_) => f.write_str(" <malformed type bitmap>"),
                }
            }
            RData::Unknown(bytes) => {
                write!(f, "\\# {}", bytes.len())?;
                if !bytes.is_empty() {
                    f.write_str(" ")?;
                    for b in bytes {
                        write!(f, "{:02x}", b)?;
                    }
                }
                Ok(())
            }
        }
    }
}
