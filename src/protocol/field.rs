//! Field encoding
//!
//! A field is a length-prefixed UTF-8 string:
//!
//! ```text
//! ┌──────────┬─────────────────────────────┐
//! │ Len (2)  │        UTF-8 bytes          │
//! └──────────┴─────────────────────────────┘
//! ```

use bytes::BufMut;

use crate::error::{Result, TdError};

/// Size of the field length prefix
pub const FIELD_LEN_SIZE: usize = 2;

/// Longest string a field can carry (in bytes)
pub const MAX_FIELD_LEN: usize = u16::MAX as usize;

/// Encode a string as a field
pub fn encode_field(s: &str) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(FIELD_LEN_SIZE + s.len());
    put_field(&mut out, s)?;
    Ok(out)
}

/// Append a string as a field to `buf`
pub fn put_field<B: BufMut>(buf: &mut B, s: &str) -> Result<()> {
    let bytes = s.as_bytes();
    if bytes.len() > MAX_FIELD_LEN {
        return Err(TdError::Encoding(format!(
            "field of {} bytes exceeds the {} byte limit",
            bytes.len(),
            MAX_FIELD_LEN
        )));
    }
    buf.put_u16(bytes.len() as u16);
    buf.put_slice(bytes);
    Ok(())
}

/// Decode a field starting at `offset`
///
/// Returns the string and the offset just past it.
pub fn decode_field(buf: &[u8], offset: usize) -> Result<(String, usize)> {
    let len = read_u16(buf, offset)? as usize;
    let start = offset + FIELD_LEN_SIZE;
    let end = start + len;
    if buf.len() < end {
        return Err(TdError::Truncated {
            needed: len,
            available: buf.len().saturating_sub(start),
        });
    }

    let s = std::str::from_utf8(&buf[start..end])
        .map_err(|e| TdError::Encoding(format!("field is not valid UTF-8: {}", e)))?;
    Ok((s.to_string(), end))
}

/// Read a big-endian u16 at `offset`
pub(crate) fn read_u16(buf: &[u8], offset: usize) -> Result<u16> {
    match buf.get(offset..offset + 2) {
        Some(b) => Ok(u16::from_be_bytes([b[0], b[1]])),
        None => Err(TdError::Truncated {
            needed: 2,
            available: buf.len().saturating_sub(offset),
        }),
    }
}

/// Read a big-endian u32 at `offset`
pub(crate) fn read_u32(buf: &[u8], offset: usize) -> Result<u32> {
    match buf.get(offset..offset + 4) {
        Some(b) => Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]])),
        None => Err(TdError::Truncated {
            needed: 4,
            available: buf.len().saturating_sub(offset),
        }),
    }
}
