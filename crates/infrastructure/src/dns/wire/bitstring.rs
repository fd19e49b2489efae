//! Bit-string labels (RFC 2673), presentation form `\[x<hex>/<len>]`.
//!
//! Only the hexadecimal presentation is supported. Decoding renders
//! uppercase digits.

use std::fmt::Write as _;

use dnswire_domain::DomainError;

use super::LABELTYPE_BITSTRING;

const MAX_BITS: usize = 256;

/// Data bytes following a bit-string count byte; a count of 0 means 256 bits.
pub fn data_len(count: u8) -> usize {
    bit_len(count).div_ceil(8)
}

fn bit_len(count: u8) -> usize {
    if count == 0 {
        MAX_BITS
    } else {
        count as usize
    }
}

fn format_err(msg: impl Into<String>) -> DomainError {
    DomainError::FormatError(msg.into())
}

/// Encodes the text between `\[` and the closing `]` (inclusive of `]`).
///
/// Returns the complete label: type byte, bit count, data bytes.
pub fn encode(src: &[u8]) -> Result<Vec<u8>, DomainError> {
    let body = match src.split_last() {
        Some((b']', body)) => body,
        _ => return Err(format_err("bit-string label is missing its closing ']'")),
    };
    let (digits, declared) = match body.iter().position(|&c| c == b'/') {
        Some(slash) => (&body[..slash], Some(&body[slash + 1..])),
        None => (body, None),
    };

    let hex = match digits.split_first() {
        Some((b'x', hex)) => hex,
        _ => return Err(format_err("bit-string label must use the 'x' form")),
    };
    if hex.is_empty() {
        return Err(format_err("bit-string label carries no hex digits"));
    }

    let mut data = Vec::with_capacity(MAX_BITS / 8);
    let mut value: u8 = 0;
    let mut pending_bits = 0usize;
    let mut total_bits = 0usize;
    for &c in hex {
        let nibble = (c as char)
            .to_digit(16)
            .ok_or_else(|| format_err(format!("invalid hex digit '{}' in bit-string", c as char)))?
            as u8;
        total_bits += 4;
        if total_bits > MAX_BITS {
            return Err(format_err("bit-string label longer than 256 bits"));
        }
        value = (value << 4) | nibble;
        pending_bits += 4;
        if pending_bits == 8 {
            data.push(value);
            value = 0;
            pending_bits = 0;
        }
    }
    if pending_bits > 0 {
        data.push(value << 4);
    }

    let bits = match declared {
        None => total_bits,
        Some(len) => {
            let bits = parse_declared_len(len)?;
            if (bits + 3) & !3 != total_bits {
                return Err(format_err(format!(
                    "bit-string length {} needs {} hex digits, got {}",
                    bits,
                    (bits + 3) / 4,
                    total_bits / 4
                )));
            }
            check_trailing_zero(&data, bits, total_bits)?;
            bits
        }
    };

    let mut label = Vec::with_capacity(2 + data.len());
    label.push(LABELTYPE_BITSTRING);
    label.push(if bits == MAX_BITS { 0 } else { bits as u8 });
    label.extend_from_slice(&data);
    Ok(label)
}

fn parse_declared_len(len: &[u8]) -> Result<usize, DomainError> {
    match len.first() {
        None => return Err(format_err("bit-string length after '/' is empty")),
        Some(b'0') => return Err(format_err("bit-string length may not start with 0")),
        _ => {}
    }
    let mut bits = 0usize;
    for &c in len {
        if !c.is_ascii_digit() {
            return Err(format_err(format!("invalid digit '{}' in bit-string length", c as char)));
        }
        bits = bits * 10 + (c - b'0') as usize;
        if bits > MAX_BITS {
            return Err(format_err("bit-string length exceeds 256"));
        }
    }
    Ok(bits)
}

/// Bits supplied beyond the declared length must be zero.
fn check_trailing_zero(data: &[u8], bits: usize, total_bits: usize) -> Result<(), DomainError> {
    for bit in bits..total_bits {
        let byte = data[bit / 8];
        if byte & (0x80 >> (bit % 8)) != 0 {
            return Err(format_err("bit-string has set bits past its declared length"));
        }
    }
    Ok(())
}

/// Renders the label whose count byte is `label[0]`.
///
/// Returns the presentation text and the bytes consumed (count byte plus data).
pub fn decode(label: &[u8]) -> Result<(String, usize), DomainError> {
    let (&count, rest) = label
        .split_first()
        .ok_or_else(|| DomainError::BoundsError("bit-string label missing its bit count".to_string()))?;
    let bits = bit_len(count);
    let needed = data_len(count);
    let data = rest.get(..needed).ok_or_else(|| {
        DomainError::BoundsError(format!(
            "bit-string label needs {} data bytes, {} available",
            needed,
            rest.len()
        ))
    })?;

    let mut out = String::with_capacity(8 + needed * 2);
    out.push_str("\\[x");
    let whole = bits / 8;
    for byte in &data[..whole] {
        let _ = write!(out, "{:02X}", byte);
    }
    let rem = bits % 8;
    if rem > 4 {
        let _ = write!(out, "{:02X}", data[whole] & (0xffu8 << (8 - rem)));
    } else if rem > 0 {
        let _ = write!(out, "{:X}", (data[whole] >> 4) & (0x0fu8 << (4 - rem)));
    }
    let _ = write!(out, "/{}]", bits);
    Ok((out, 1 + needed))
}
