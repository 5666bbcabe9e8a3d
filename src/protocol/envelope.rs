//! Message framing
//!
//! Every message on the wire is one envelope:
//!
//! ```text
//! ┌──────────────┬────────────┬─────────────┬───────────────────┐
//! │ TotalLen (4) │ Flavor (4) │ Session (2) │  Parcel(s) ...    │
//! └──────────────┴────────────┴─────────────┴───────────────────┘
//! ```
//!
//! `TotalLen` counts the 10-byte envelope header plus every parcel byte.
//! Requests carry exactly one parcel; responses may carry several, so
//! [`unframe`] walks parcels until `TotalLen` is consumed.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Result, TdError};
use super::field::{read_u16, read_u32};
use super::parcel::{Parcel, ParcelKind};

/// Envelope header size: 4 bytes length + 4 bytes flavor + 2 bytes session
pub const ENVELOPE_HEADER_SIZE: usize = 10;

/// The single supported protocol dialect
pub const DEFAULT_FLAVOR: u32 = 1;

/// Envelope header fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope {
    pub total_length: u32,
    pub flavor: u32,
    pub session_id: u16,
}

impl Envelope {
    /// Read an envelope header from the front of `buf`
    pub fn decode_header(buf: &[u8]) -> Result<Self> {
        if buf.len() < ENVELOPE_HEADER_SIZE {
            return Err(TdError::Truncated {
                needed: ENVELOPE_HEADER_SIZE,
                available: buf.len(),
            });
        }
        Ok(Self {
            total_length: read_u32(buf, 0)?,
            flavor: read_u32(buf, 4)?,
            session_id: read_u16(buf, 8)?,
        })
    }

    /// Bytes of parcel data following the header
    pub fn payload_len(&self) -> usize {
        (self.total_length as usize).saturating_sub(ENVELOPE_HEADER_SIZE)
    }
}

/// Serialize `parcel` inside an envelope
///
/// Fails with `Encoding` if the parcel's declared length no longer matches
/// its body.
pub fn frame(parcel: &Parcel, session_id: u16, flavor: u32) -> Result<Bytes> {
    if parcel.length() as usize != parcel.encoded_len() {
        return Err(TdError::Encoding(format!(
            "parcel {} declares {} bytes but encodes to {}",
            parcel.kind,
            parcel.length(),
            parcel.encoded_len()
        )));
    }
    let total = parcel.encoded_len() + ENVELOPE_HEADER_SIZE;
    let total_length = u32::try_from(total).map_err(|_| {
        TdError::Encoding(format!("message of {} bytes does not fit a 32-bit length", total))
    })?;

    let mut buf = BytesMut::with_capacity(total);
    buf.put_u32(total_length);
    buf.put_u32(flavor);
    buf.put_u16(session_id);
    parcel.encode_into(&mut buf);

    Ok(buf.freeze())
}

/// Parse an envelope from the front of `buf`
///
/// Bytes past the declared total length are not part of the message and
/// are left alone. Parcels are decoded lazily by the returned stream.
pub fn unframe(buf: &[u8]) -> Result<(Envelope, ParcelStream)> {
    let envelope = Envelope::decode_header(buf)?;
    let total = envelope.total_length as usize;

    if total < ENVELOPE_HEADER_SIZE {
        return Err(TdError::Protocol(format!(
            "envelope declares length {} (less than its {}-byte header)",
            total, ENVELOPE_HEADER_SIZE
        )));
    }
    if buf.len() < total {
        return Err(TdError::Truncated {
            needed: total,
            available: buf.len(),
        });
    }

    let payload = Bytes::copy_from_slice(&buf[ENVELOPE_HEADER_SIZE..total]);
    Ok((envelope, ParcelStream::new(payload)))
}

/// Lazy iterator over the parcels of one envelope
///
/// Yields each parcel once; after the first error the stream is fused.
#[derive(Debug)]
pub struct ParcelStream {
    remaining: Bytes,
    failed: bool,
}

impl ParcelStream {
    fn new(payload: Bytes) -> Self {
        Self {
            remaining: payload,
            failed: false,
        }
    }

    /// Consume the stream, reporting whether any parcel has `kind`
    pub fn contains(self, kind: ParcelKind) -> Result<bool> {
        for parcel in self {
            if parcel?.is(kind) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl Iterator for ParcelStream {
    type Item = Result<Parcel>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.remaining.is_empty() {
            return None;
        }

        match Parcel::decode(&self.remaining) {
            Ok((parcel, used)) => {
                let _ = self.remaining.split_to(used);
                Some(Ok(parcel))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

impl std::iter::FusedIterator for ParcelStream {}
