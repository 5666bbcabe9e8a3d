//! Response classification
//!
//! Decides whether a logon response granted a session. Structured
//! responses are walked parcel by parcel; anything that does not parse as
//! an envelope falls back to scanning for the Auth-Ack kind bytes.

use super::envelope::unframe;
use super::parcel::ParcelKind;
use super::response::ResponseParcel;

/// Auth-Ack parcel kind as it appears on the wire
pub const AUTH_ACK_MARKER: [u8; 2] = (ParcelKind::AuthOk as u16).to_be_bytes();

/// Outcome of classifying a logon response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseClass {
    /// Auth-Ack present; carries a server-assigned session id when one was sent
    AuthOk { session_id: Option<u16> },

    /// The server explicitly rejected the logon
    AuthFailed { message: String },

    Unknown,
}

impl ResponseClass {
    pub fn is_auth_ok(&self) -> bool {
        matches!(self, ResponseClass::AuthOk { .. })
    }
}

/// Byte-scan classification
///
/// `AuthOk` iff `0x00 0x66` occurs anywhere in `buf`.
pub fn classify_response(buf: &[u8]) -> ResponseClass {
    if buf.windows(2).any(|w| w == AUTH_ACK_MARKER) {
        ResponseClass::AuthOk { session_id: None }
    } else {
        ResponseClass::Unknown
    }
}

/// Classify a logon response
///
/// A well-formed envelope is classified by its parcels only; marker bytes
/// inside parcel bodies are ignored.
pub fn classify(buf: &[u8]) -> ResponseClass {
    let stream = match unframe(buf) {
        Ok((_, stream)) => stream,
        Err(e) => {
            tracing::warn!(
                "Response of {} bytes is not a framed message ({}), scanning for Auth-Ack marker",
                buf.len(),
                e
            );
            return classify_response(buf);
        }
    };

    for parcel in stream {
        let parcel = match parcel {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("Malformed parcel in logon response: {}", e);
                return ResponseClass::Unknown;
            }
        };

        match ResponseParcel::decode(&parcel) {
            Ok(ResponseParcel::AuthOk { session_id }) => {
                return ResponseClass::AuthOk { session_id }
            }
            Ok(ResponseParcel::AuthFailed { message }) => {
                return ResponseClass::AuthFailed { message }
            }
            Ok(ResponseParcel::Error { code, message }) => {
                return ResponseClass::AuthFailed {
                    message: format!("error {}: {}", code, message),
                }
            }
            Ok(_) => {}
            Err(e) => tracing::debug!("Skipping undecodable parcel {}: {}", parcel.kind, e),
        }
    }

    ResponseClass::Unknown
}
