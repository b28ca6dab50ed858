//! Variable-byte integer codec used for every integer in the invlists file.
//!
//! A value is written as base-128 groups, most-significant group first,
//! seven value bits per byte. The final (least-significant) group carries
//! the 0x80 terminator bit, so the decoder knows where a value ends without
//! a length prefix.

use crate::error::{IndexError, Result};
use std::io::{ErrorKind, Read};

/// Maximum encoded width of a u64 (ceil(64 / 7) groups).
const MAX_GROUPS: usize = 10;

/// Appends the encoding of `value` to `out`.
pub fn encode_into(mut value: u64, out: &mut Vec<u8>) {
    let mut groups = [0u8; MAX_GROUPS];
    let mut n = 0;
    loop {
        groups[n] = (value % 128) as u8;
        n += 1;
        if value < 128 {
            break;
        }
        value /= 128;
    }
    // groups[0] is the least-significant group, which terminates the value.
    groups[0] |= 0x80;
    out.extend(groups[..n].iter().rev());
}

/// Convenience form of [`encode_into`] returning a fresh buffer.
pub fn encode(value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(MAX_GROUPS);
    encode_into(value, &mut out);
    out
}

/// Reads exactly one encoded value from `reader`.
///
/// Consumes precisely the bytes a matching [`encode`] produced. A stream
/// that ends mid-value, or a run of continuation bytes that would overflow
/// a u64, signals a corrupt invlists file.
pub fn decode<R: Read>(reader: &mut R) -> Result<u64> {
    let mut value: u64 = 0;
    loop {
        let mut buf = [0u8; 1];
        reader.read_exact(&mut buf).map_err(|e| {
            if e.kind() == ErrorKind::UnexpectedEof {
                IndexError::Inconsistent("varint stream ended mid-value".into())
            } else {
                IndexError::Io(e)
            }
        })?;
        let byte = buf[0];
        value = value
            .checked_mul(128)
            .and_then(|v| v.checked_add(u64::from(byte & 0x7F)))
            .ok_or_else(|| IndexError::Inconsistent("varint value overflows u64".into()))?;
        if byte & 0x80 != 0 {
            return Ok(value);
        }
    }
}
