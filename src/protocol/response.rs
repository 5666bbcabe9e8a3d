//! Response parcels
//!
//! Typed view over the parcels a server sends back, and the aggregate
//! result of one statement.
//!
//! ### Response Bodies
//! - AUTH_OK:       optional session_id (2)
//! - AUTH_FAILED:   UTF-8 message (rest of body)
//! - SUCCESS:       activity_count (4)
//! - ERROR:         code (2) + message field
//! - DATA_INFO:     column_count (2) + per column: name field + type field
//!                  + nullable (2) + max_len (2)
//! - RECORD:        per value: len (2) + UTF-8 bytes, len 0xFFFF is NULL
//! - END_STATEMENT: empty
//! - END_REQUEST:   empty

use bytes::{BufMut, BytesMut};

use crate::error::{Result, TdError};
use super::envelope::ParcelStream;
use super::field::{decode_field, put_field, read_u16, read_u32};
use super::parcel::{Parcel, ParcelKind};

/// Length marker of a NULL record value
pub const NULL_MARKER: u16 = 0xFFFF;

/// Column metadata from a DataInfo parcel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub type_name: String,
    pub nullable: bool,
    pub max_len: u16,
}

/// A decoded response parcel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseParcel {
    AuthOk { session_id: Option<u16> },
    AuthFailed { message: String },
    Success { activity_count: u32 },
    Error { code: u16, message: String },
    DataInfo { columns: Vec<ColumnInfo> },
    Record { values: Vec<Option<String>> },
    EndStatement,
    EndRequest,
    Other { kind: u16, body: Vec<u8> },
}

impl ResponseParcel {
    /// Interpret a raw parcel
    pub fn decode(parcel: &Parcel) -> Result<Self> {
        let body = &parcel.body[..];

        let decoded = match parcel.kind() {
            Some(ParcelKind::AuthOk) => ResponseParcel::AuthOk {
                session_id: read_u16(body, 0).ok(),
            },
            Some(ParcelKind::AuthFailed) => ResponseParcel::AuthFailed {
                message: String::from_utf8_lossy(body).into_owned(),
            },
            Some(ParcelKind::Success) => ResponseParcel::Success {
                activity_count: read_u32(body, 0)?,
            },
            Some(ParcelKind::Error) => {
                let code = read_u16(body, 0)?;
                let (message, _) = decode_field(body, 2)?;
                ResponseParcel::Error { code, message }
            }
            Some(ParcelKind::DataInfo) => ResponseParcel::DataInfo {
                columns: decode_columns(body)?,
            },
            Some(ParcelKind::Record) => ResponseParcel::Record {
                values: decode_record(body)?,
            },
            Some(ParcelKind::EndStatement) => ResponseParcel::EndStatement,
            Some(ParcelKind::EndRequestResponse) => ResponseParcel::EndRequest,
            _ => ResponseParcel::Other {
                kind: parcel.kind,
                body: body.to_vec(),
            },
        };
        Ok(decoded)
    }

    /// Encode back into a raw parcel
    pub fn to_parcel(&self) -> Result<Parcel> {
        let mut body = BytesMut::new();
        let kind = match self {
            ResponseParcel::AuthOk { session_id } => {
                if let Some(id) = session_id {
                    body.put_u16(*id);
                }
                ParcelKind::AuthOk
            }
            ResponseParcel::AuthFailed { message } => {
                body.put_slice(message.as_bytes());
                ParcelKind::AuthFailed
            }
            ResponseParcel::Success { activity_count } => {
                body.put_u32(*activity_count);
                ParcelKind::Success
            }
            ResponseParcel::Error { code, message } => {
                body.put_u16(*code);
                put_field(&mut body, message)?;
                ParcelKind::Error
            }
            ResponseParcel::DataInfo { columns } => {
                let count = u16::try_from(columns.len()).map_err(|_| {
                    TdError::Encoding(format!("{} columns exceed the u16 count", columns.len()))
                })?;
                body.put_u16(count);
                for column in columns {
                    put_field(&mut body, &column.name)?;
                    put_field(&mut body, &column.type_name)?;
                    body.put_u16(column.nullable as u16);
                    body.put_u16(column.max_len);
                }
                ParcelKind::DataInfo
            }
            ResponseParcel::Record { values } => {
                for value in values {
                    match value {
                        // 0xFFFF is reserved for NULL, so non-null values stop one short
                        Some(v) if v.len() >= NULL_MARKER as usize => {
                            return Err(TdError::Encoding(format!(
                                "record value of {} bytes collides with the NULL marker",
                                v.len()
                            )));
                        }
                        Some(v) => put_field(&mut body, v)?,
                        None => body.put_u16(NULL_MARKER),
                    }
                }
                ParcelKind::Record
            }
            ResponseParcel::EndStatement => ParcelKind::EndStatement,
            ResponseParcel::EndRequest => ParcelKind::EndRequestResponse,
            ResponseParcel::Other { kind, body: raw } => {
                return Parcel::raw(*kind, raw.clone());
            }
        };
        Parcel::new(kind, body.freeze())
    }
}

fn decode_columns(body: &[u8]) -> Result<Vec<ColumnInfo>> {
    let count = read_u16(body, 0)? as usize;
    let mut offset = 2;
    let mut columns = Vec::with_capacity(count);

    for _ in 0..count {
        let (name, next) = decode_field(body, offset)?;
        let (type_name, next) = decode_field(body, next)?;
        let nullable = read_u16(body, next)? != 0;
        let max_len = read_u16(body, next + 2)?;
        offset = next + 4;
        columns.push(ColumnInfo {
            name,
            type_name,
            nullable,
            max_len,
        });
    }

    Ok(columns)
}

fn decode_record(body: &[u8]) -> Result<Vec<Option<String>>> {
    let mut offset = 0;
    let mut values = Vec::new();

    while offset < body.len() {
        if read_u16(body, offset)? == NULL_MARKER {
            values.push(None);
            offset += 2;
        } else {
            let (value, next) = decode_field(body, offset)?;
            values.push(Some(value));
            offset = next;
        }
    }

    Ok(values)
}

// =============================================================================
// Statement Results
// =============================================================================

/// Everything one statement response carried
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementResult {
    pub columns: Vec<ColumnInfo>,
    pub rows: Vec<Vec<Option<String>>>,
    pub activity_count: u32,
}

impl StatementResult {
    /// Fold a parcel stream into a result
    ///
    /// An Error parcel ends the fold with `TdError::Server`.
    pub fn from_parcels(stream: ParcelStream) -> Result<Self> {
        let mut result = StatementResult::default();

        for parcel in stream {
            match ResponseParcel::decode(&parcel?)? {
                ResponseParcel::DataInfo { columns } => result.columns = columns,
                ResponseParcel::Record { values } => result.rows.push(values),
                ResponseParcel::Success { activity_count } => {
                    result.activity_count = activity_count
                }
                ResponseParcel::Error { code, message } => {
                    return Err(TdError::Server { code, message })
                }
                ResponseParcel::AuthFailed { message } => {
                    return Err(TdError::AuthenticationFailed(message))
                }
                ResponseParcel::EndRequest => break,
                other => tracing::trace!("Skipping response parcel {:?}", other),
            }
        }

        Ok(result)
    }

    /// Column names in order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}
