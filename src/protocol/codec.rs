//! Stream-based I/O helpers
//!
//! Moves whole messages between a byte stream and memory. Reads start
//! with one bounded blocking read; when that read begins with an envelope
//! header declaring more than what arrived, the rest of the envelope is
//! read too.

use std::io::{Read, Write};

use bytes::{Bytes, BytesMut};

use crate::error::{Result, TdError};
use super::envelope::ENVELOPE_HEADER_SIZE;
use super::field::{read_u16, read_u32};
use super::parcel::{ParcelKind, PARCEL_HEADER_SIZE};

/// Write one framed message to a stream
pub fn write_message<W: Write>(writer: &mut W, message: &[u8]) -> Result<()> {
    writer
        .write_all(message)
        .map_err(|e| TdError::from_io("write", e))?;
    writer.flush().map_err(|e| TdError::from_io("write", e))?;
    Ok(())
}

/// Read one response from a stream
///
/// Performs a single read of up to `buffer_size` bytes. A peer that closes
/// without sending anything yields `UnexpectedEof`. Further reads happen
/// only when the first one starts with a plausible envelope header (see
/// [`declared_envelope_len`]); any other reply comes back exactly as read.
pub fn read_message<R: Read>(
    reader: &mut R,
    buffer_size: usize,
    max_message_size: usize,
    flavor: u32,
) -> Result<Bytes> {
    let mut buf = BytesMut::zeroed(buffer_size);
    let n = read_some(reader, &mut buf)?;
    if n == 0 {
        return Err(TdError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "peer closed the connection before responding",
        )));
    }
    buf.truncate(n);

    let declared = match declared_envelope_len(&buf, flavor) {
        Some(len) if len > n => len,
        _ => return Ok(buf.freeze()),
    };

    if declared > max_message_size {
        return Err(TdError::Protocol(format!(
            "Message too large: {} bytes (max {})",
            declared, max_message_size
        )));
    }
    tracing::trace!("Reading {} more bytes of a {} byte message", declared - n, declared);
    buf.resize(declared, 0);
    reader
        .read_exact(&mut buf[n..])
        .map_err(|e| TdError::from_io("read", e))?;

    Ok(buf.freeze())
}

/// Total length declared by `buf`, if it starts like an envelope
///
/// Requires the full envelope header, a matching flavor, a known kind for
/// the first parcel, and a total long enough to hold that parcel's header.
pub fn declared_envelope_len(buf: &[u8], flavor: u32) -> Option<usize> {
    if buf.len() < ENVELOPE_HEADER_SIZE + 2 {
        return None;
    }
    let total = read_u32(buf, 0).ok()? as usize;
    if read_u32(buf, 4).ok()? != flavor || total < ENVELOPE_HEADER_SIZE + PARCEL_HEADER_SIZE {
        return None;
    }
    ParcelKind::from_u16(read_u16(buf, ENVELOPE_HEADER_SIZE).ok()?)?;
    Some(total)
}

fn read_some<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    loop {
        match reader.read(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(TdError::from_io("read", e)),
        }
    }
}
