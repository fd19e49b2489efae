use std::fmt;

use crate::DomainError;

const QR_MASK: u16 = 0x8000;
const OPCODE_MASK: u16 = 0x7800;
const AA_MASK: u16 = 0x0400;
const TC_MASK: u16 = 0x0200;
const RD_MASK: u16 = 0x0100;
const RA_MASK: u16 = 0x0080;
const Z_MASK: u16 = 0x0040;
const AD_MASK: u16 = 0x0020;
const CD_MASK: u16 = 0x0010;
const RCODE_MASK: u16 = 0x000f;

const OPCODE_NAMES: [&str; 16] = [
    "QUERY", "IQUERY", "CQUERYM", "CQUERYU", "NOTIFY", "UPDATE", "6", "7", "8", "9", "10", "11",
    "12", "13", "ZONEINIT", "ZONEREF",
];

/// Fixed 12-byte message header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    pub id: u16,
    pub qr: bool,
    /// 4-bit operation code.
    pub opcode: u8,
    pub aa: bool,
    pub tc: bool,
    pub rd: bool,
    pub ra: bool,
    pub z: bool,
    pub ad: bool,
    pub cd: bool,
    /// 4-bit response code. Only the low four bits reach the wire, so the
    /// TSIG codes (BADSIG and up) cannot be carried here; see [`Header::set_rcode`].
    pub rcode: u8,
    pub qdcount: u16,
    pub ancount: u16,
    pub nscount: u16,
    pub arcount: u16,
}

impl Header {
    /// Truncation bit in the flags word.
    pub const TC_MASK: u16 = TC_MASK;

    pub fn new(id: u16) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Packs the nine flag fields into the second header word.
    pub fn flags(&self) -> u16 {
        let mut word = 0u16;
        if self.qr {
            word |= QR_MASK;
        }
        word |= ((self.opcode as u16) << 11) & OPCODE_MASK;
        if self.aa {
            word |= AA_MASK;
        }
        if self.tc {
            word |= TC_MASK;
        }
        if self.rd {
            word |= RD_MASK;
        }
        if self.ra {
            word |= RA_MASK;
        }
        if self.z {
            word |= Z_MASK;
        }
        if self.ad {
            word |= AD_MASK;
        }
        if self.cd {
            word |= CD_MASK;
        }
        word | (self.rcode as u16 & RCODE_MASK)
    }

    pub fn set_flags(&mut self, word: u16) {
        self.qr = word & QR_MASK != 0;
        self.opcode = ((word & OPCODE_MASK) >> 11) as u8;
        self.aa = word & AA_MASK != 0;
        self.tc = word & TC_MASK != 0;
        self.rd = word & RD_MASK != 0;
        self.ra = word & RA_MASK != 0;
        self.z = word & Z_MASK != 0;
        self.ad = word & AD_MASK != 0;
        self.cd = word & CD_MASK != 0;
        self.rcode = (word & RCODE_MASK) as u8;
    }

    pub fn opcode_name(&self) -> &'static str {
        OPCODE_NAMES[(self.opcode & 0x0f) as usize]
    }

    pub fn rcode(&self) -> ResponseCode {
        ResponseCode::from_u8(self.rcode)
    }

    /// Stores `code`, refusing codes that need more than the header's four bits.
    pub fn set_rcode(&mut self, code: ResponseCode) -> Result<(), DomainError> {
        if code.is_extended() {
            return Err(DomainError::FormatError(format!(
                "{} does not fit the 4-bit header rcode",
                code
            )));
        }
        self.rcode = code.to_u8();
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseCode {
    NoError,
    FormErr,
    ServFail,
    NxDomain,
    NotImp,
    Refused,
    YxDomain,
    YxRrset,
    NxRrset,
    NotAuth,
    NotZone,
    BadSig,
    BadKey,
    BadTime,
    Unknown(u8),
}

impl ResponseCode {
    /// Codes above 15 exist only as extended (TSIG/EDNS) response codes.
    pub fn is_extended(&self) -> bool {
        self.to_u8() > 0x0f
    }

    pub fn from_u8(code: u8) -> Self {
        match code {
            0 => ResponseCode::NoError,
            1 => ResponseCode::FormErr,
            2 => ResponseCode::ServFail,
            3 => ResponseCode::NxDomain,
            4 => ResponseCode::NotImp,
            5 => ResponseCode::Refused,
            6 => ResponseCode::YxDomain,
            7 => ResponseCode::YxRrset,
            8 => ResponseCode::NxRrset,
            9 => ResponseCode::NotAuth,
            10 => ResponseCode::NotZone,
            16 => ResponseCode::BadSig,
            17 => ResponseCode::BadKey,
            18 => ResponseCode::BadTime,
            other => ResponseCode::Unknown(other),
        }
    }

    pub fn to_u8(&self) -> u8 {
        match self {
            ResponseCode::NoError => 0,
            ResponseCode::FormErr => 1,
            ResponseCode::ServFail => 2,
            ResponseCode::NxDomain => 3,
            ResponseCode::NotImp => 4,
            ResponseCode::Refused => 5,
            ResponseCode::YxDomain => 6,
            ResponseCode::YxRrset => 7,
            ResponseCode::NxRrset => 8,
            ResponseCode::NotAuth => 9,
            ResponseCode::NotZone => 10,
            ResponseCode::BadSig => 16,
            ResponseCode::BadKey => 17,
            ResponseCode::BadTime => 18,
            ResponseCode::Unknown(code) => *code,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseCode::NoError => "NOERROR",
            ResponseCode::FormErr => "FORMERR",
            ResponseCode::ServFail => "SERVFAIL",
            ResponseCode::NxDomain => "NXDOMAIN",
            ResponseCode::NotImp => "NOTIMP",
            ResponseCode::Refused => "REFUSED",
            ResponseCode::YxDomain => "YXDOMAIN",
            ResponseCode::YxRrset => "YXRRSET",
            ResponseCode::NxRrset => "NXRRSET",
            ResponseCode::NotAuth => "NOTAUTH",
            ResponseCode::NotZone => "NOTZONE",
            ResponseCode::BadSig => "BADSIG",
            ResponseCode::BadKey => "BADKEY",
            ResponseCode::BadTime => "BADTIME",
            ResponseCode::Unknown(_) => "UNKNOWN",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ResponseCode::NoError => "no error",
            ResponseCode::FormErr => "format error",
            ResponseCode::ServFail => "server failed",
            ResponseCode::NxDomain => "no such domain name",
            ResponseCode::NotImp => "not implemented",
            ResponseCode::Refused => "refused",
            ResponseCode::YxDomain => "domain name exist",
            ResponseCode::YxRrset => "rrset exists",
            ResponseCode::NxRrset => "rrset doesn't exist",
            ResponseCode::NotAuth => "not authoritative",
            ResponseCode::NotZone => "not in zone",
            ResponseCode::BadSig => "bad signature",
            ResponseCode::BadKey => "bad key",
            ResponseCode::BadTime => "bad time",
            ResponseCode::Unknown(_) => "unknown",
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseCode::Unknown(code) => write!(f, "RCODE{}", code),
            other => f.write_str(other.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_roundtrip_every_field() {
        let header = Header {
            qr: true,
            opcode: 5,
            aa: true,
            tc: false,
            rd: true,
            ra: false,
            z: true,
            ad: false,
            cd: true,
            rcode: 9,
            ..Header::new(7)
        };
        let mut decoded = Header::new(7);
        decoded.set_flags(header.flags());
        assert_eq!(decoded, header);
    }

    #[test]
    fn test_standard_response_flags() {
        let mut header = Header::new(1);
        header.set_flags(0x8180);
        assert!(header.qr && header.rd && header.ra);
        assert_eq!(header.opcode_name(), "QUERY");
        assert_eq!(header.rcode(), ResponseCode::NoError);
    }

    #[test]
    fn test_set_rcode_rejects_extended_codes() {
        let mut header = Header::new(1);
        header.set_rcode(ResponseCode::Refused).unwrap();
        assert_eq!(header.flags() & RCODE_MASK, 5);

        for code in [ResponseCode::BadSig, ResponseCode::BadKey, ResponseCode::BadTime] {
            assert!(code.is_extended());
            assert!(header.set_rcode(code).unwrap_err().is_format());
        }
        assert_eq!(header.rcode(), ResponseCode::Refused);
        assert!(!ResponseCode::NotZone.is_extended());
    }
}
