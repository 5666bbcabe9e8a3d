//! Parcel definitions and codec
//!
//! A parcel is one typed protocol operation:
//!
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Kind (2) │ Len (4)  │            Body             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! `Len` counts the 6-byte header as well as the body.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Result, TdError};
use super::field::{put_field, read_u16, read_u32};

/// Parcel header size: 2 bytes kind + 4 bytes length
pub const PARCEL_HEADER_SIZE: usize = 6;

/// Logon body version written by this client
pub const LOGON_VERSION: u16 = 1;

/// Parcel kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ParcelKind {
    // Requests
    Run = 1,
    Prepare = 2,
    Execute = 3,
    Fetch = 4,
    Abort = 5,
    EndRequest = 6,

    // Responses
    Success = 8,
    Record = 10,
    EndStatement = 11,
    EndRequestResponse = 12,
    Error = 13,
    StatementInfo = 14,
    DataInfo = 15,

    // Session control
    Logon = 100,
    Logoff = 101,
    AuthOk = 102,
    AuthFailed = 103,
}

impl ParcelKind {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(Self::Run),
            2 => Some(Self::Prepare),
            3 => Some(Self::Execute),
            4 => Some(Self::Fetch),
            5 => Some(Self::Abort),
            6 => Some(Self::EndRequest),
            8 => Some(Self::Success),
            10 => Some(Self::Record),
            11 => Some(Self::EndStatement),
            12 => Some(Self::EndRequestResponse),
            13 => Some(Self::Error),
            14 => Some(Self::StatementInfo),
            15 => Some(Self::DataInfo),
            100 => Some(Self::Logon),
            101 => Some(Self::Logoff),
            102 => Some(Self::AuthOk),
            103 => Some(Self::AuthFailed),
            _ => None,
        }
    }
}

/// A single parcel
///
/// The kind is kept raw so parcels outside the known catalog survive a
/// decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parcel {
    pub kind: u16,

    length: u32,

    pub body: Bytes,
}

impl Parcel {
    /// Build a parcel around `body`, computing the declared length
    pub fn new(kind: ParcelKind, body: impl Into<Bytes>) -> Result<Self> {
        Self::raw(kind as u16, body)
    }

    /// Same as [`Parcel::new`] for a kind outside the catalog
    pub fn raw(kind: u16, body: impl Into<Bytes>) -> Result<Self> {
        let body = body.into();
        let length = u32::try_from(body.len() + PARCEL_HEADER_SIZE).map_err(|_| {
            TdError::Encoding(format!(
                "parcel body of {} bytes does not fit a 32-bit length",
                body.len()
            ))
        })?;
        Ok(Self { kind, length, body })
    }

    /// The kind, if it is part of the known catalog
    pub fn kind(&self) -> Option<ParcelKind> {
        ParcelKind::from_u16(self.kind)
    }

    /// Declared length, header included
    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn is(&self, kind: ParcelKind) -> bool {
        self.kind == kind as u16
    }

    /// Serialized size of this parcel
    pub fn encoded_len(&self) -> usize {
        PARCEL_HEADER_SIZE + self.body.len()
    }

    /// Append the serialized parcel to `buf`
    pub fn encode_into(&self, buf: &mut BytesMut) {
        buf.reserve(self.encoded_len());
        buf.put_u16(self.kind);
        buf.put_u32(self.length);
        buf.put_slice(&self.body);
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode_into(&mut buf);
        buf.freeze()
    }

    /// Decode one parcel from the front of `buf`
    ///
    /// Returns the parcel and the number of bytes consumed.
    pub fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        if buf.len() < PARCEL_HEADER_SIZE {
            return Err(TdError::Truncated {
                needed: PARCEL_HEADER_SIZE,
                available: buf.len(),
            });
        }

        let kind = read_u16(buf, 0)?;
        let length = read_u32(buf, 2)?;
        let total = length as usize;

        if total < PARCEL_HEADER_SIZE {
            return Err(TdError::Protocol(format!(
                "parcel kind {} declares length {} (less than its {}-byte header)",
                kind, length, PARCEL_HEADER_SIZE
            )));
        }
        if buf.len() < total {
            return Err(TdError::Truncated {
                needed: total,
                available: buf.len(),
            });
        }

        let body = Bytes::copy_from_slice(&buf[PARCEL_HEADER_SIZE..total]);
        Ok((Self { kind, length, body }, total))
    }
}

// =============================================================================
// Request Parcels
// =============================================================================

/// Build a Logon parcel
///
/// Body: version (2) + username + password + database + charset, each a field.
pub fn encode_logon(
    username: &str,
    password: &str,
    database: &str,
    charset: &str,
) -> Result<Parcel> {
    let mut body = BytesMut::with_capacity(
        2 + 4 * 2 + username.len() + password.len() + database.len() + charset.len(),
    );
    body.put_u16(LOGON_VERSION);
    put_field(&mut body, username)?;
    put_field(&mut body, password)?;
    put_field(&mut body, database)?;
    put_field(&mut body, charset)?;

    Parcel::new(ParcelKind::Logon, body.freeze())
}

/// Build a Run parcel
///
/// Body: statement number (2) + options (2) + sql_len (4) + sql text.
pub fn encode_run(sql: &str) -> Result<Parcel> {
    let sql_len = u32::try_from(sql.len()).map_err(|_| {
        TdError::Encoding(format!(
            "statement of {} bytes does not fit a 32-bit length",
            sql.len()
        ))
    })?;

    let mut body = BytesMut::with_capacity(8 + sql.len());
    body.put_u16(1); // statement number
    body.put_u16(0); // options
    body.put_u32(sql_len);
    body.put_slice(sql.as_bytes());

    Parcel::new(ParcelKind::Run, body.freeze())
}

/// Build a Logoff parcel (header only)
pub fn encode_logoff() -> Parcel {
    Parcel {
        kind: ParcelKind::Logoff as u16,
        length: PARCEL_HEADER_SIZE as u32,
        body: Bytes::new(),
    }
}

/// SQL text carried by a Run parcel body
pub fn run_sql(parcel: &Parcel) -> Result<String> {
    if !parcel.is(ParcelKind::Run) {
        return Err(TdError::Protocol(format!(
            "expected a Run parcel, got kind {}",
            parcel.kind
        )));
    }
    let body = &parcel.body;
    let sql_len = read_u32(body, 4)? as usize;
    let text = body.get(8..8 + sql_len).ok_or(TdError::Truncated {
        needed: sql_len,
        available: body.len().saturating_sub(8),
    })?;
    String::from_utf8(text.to_vec())
        .map_err(|e| TdError::Encoding(format!("statement is not valid UTF-8: {}", e)))
}
