//! Protocol Module
//!
//! Wire format of the parcel protocol. All integers are big-endian.
//!
//! ## Message Format
//! ```text
//! ┌──────────────┬────────────┬─────────────┬──────────────────────────┐
//! │ TotalLen (4) │ Flavor (4) │ Session (2) │ Parcel                   │
//! └──────────────┴────────────┴─────────────┴──────────────────────────┘
//!                                           ┌──────────┬─────────┬──────┐
//!                                  Parcel = │ Kind (2) │ Len (4) │ Body │
//!                                           └──────────┴─────────┴──────┘
//! ```
//!
//! ### Request Parcels
//! - 100: LOGON  - version (2) + username + password + database + charset
//! - 1:   RUN    - statement_no (2) + options (2) + sql_len (4) + sql
//! - 101: LOGOFF - empty
//!
//! ### Response Parcels
//! - 102: AUTH_OK, 103: AUTH_FAILED
//! - 15: DATA_INFO, 10: RECORD, 8: SUCCESS, 13: ERROR
//! - 11: END_STATEMENT, 12: END_REQUEST
//!
//! Strings inside bodies are fields: len (2) + UTF-8 bytes.

mod codec;
mod envelope;
mod field;
mod parcel;
mod response;
mod scanner;

pub use codec::{declared_envelope_len, read_message, write_message};
pub use envelope::{frame, unframe, Envelope, ParcelStream, DEFAULT_FLAVOR, ENVELOPE_HEADER_SIZE};
pub use field::{decode_field, encode_field, put_field, MAX_FIELD_LEN};
pub use parcel::{
    encode_logoff, encode_logon, encode_run, run_sql, Parcel, ParcelKind, LOGON_VERSION,
    PARCEL_HEADER_SIZE,
};
pub use response::{ColumnInfo, ResponseParcel, StatementResult, NULL_MARKER};
pub use scanner::{classify, classify_response, ResponseClass, AUTH_ACK_MARKER};
