//! Envelope Tests
//!
//! Tests for framing and structural unframing.

use tdwire::protocol::{
    encode_logoff, encode_logon, encode_run, frame, unframe, Envelope, ParcelKind,
    ResponseParcel, DEFAULT_FLAVOR, ENVELOPE_HEADER_SIZE,
};
use tdwire::TdError;

// =============================================================================
// Framing Tests
// =============================================================================

#[test]
fn test_total_length_is_parcel_plus_header() {
    let parcels = vec![
        encode_logon("admin", "password", "test", "UTF8").unwrap(),
        encode_run("SEL * FROM DBC.Tables").unwrap(),
        encode_logoff(),
    ];

    for (sid, parcel) in parcels.iter().enumerate() {
        let framed = frame(parcel, sid as u16, DEFAULT_FLAVOR).unwrap();
        let header = Envelope::decode_header(&framed).unwrap();
        assert_eq!(
            header.total_length as usize,
            parcel.encoded_len() + ENVELOPE_HEADER_SIZE
        );
        assert_eq!(header.session_id, sid as u16);
        assert_eq!(header.flavor, 1);
    }
}

#[test]
fn test_logon_message_bytes() {
    let parcel = encode_logon("u", "p", "d", "UTF8").unwrap();
    let framed = frame(&parcel, 1, DEFAULT_FLAVOR).unwrap();
    // body = 2 + (2+1)*3 + (2+4) = 17, parcel = 23, message = 33
    assert_eq!(&framed[..4], &[0x00, 0x00, 0x00, 0x21]);
    assert_eq!(&framed[10..16], &[0x00, 0x64, 0x00, 0x00, 0x00, 0x17]);
    assert_eq!(framed.len(), 33);
}

// =============================================================================
// Unframing Tests
// =============================================================================

fn multi_parcel_message(parcels: &[ResponseParcel]) -> Vec<u8> {
    let mut payload = Vec::new();
    for p in parcels {
        payload.extend_from_slice(&p.to_parcel().unwrap().encode());
    }
    let mut buf = Vec::new();
    buf.extend_from_slice(&((payload.len() + ENVELOPE_HEADER_SIZE) as u32).to_be_bytes());
    buf.extend_from_slice(&DEFAULT_FLAVOR.to_be_bytes());
    buf.extend_from_slice(&(parcels.len() as u16).to_be_bytes());
    buf.extend_from_slice(&payload);
    buf
}

#[test]
fn test_unframe_walks_every_parcel() {
    let buf = multi_parcel_message(&[
        ResponseParcel::AuthOk { session_id: None },
        ResponseParcel::Success { activity_count: 1 },
        ResponseParcel::EndStatement,
        ResponseParcel::EndRequest,
    ]);
    let (envelope, stream) = unframe(&buf).unwrap();
    assert_eq!(envelope.total_length as usize, buf.len());

    let kinds: Vec<u16> = stream.map(|p| p.unwrap().kind).collect();
    assert_eq!(kinds, vec![102, 8, 11, 12]);
}

#[test]
fn test_stream_contains() {
    let buf = multi_parcel_message(&[
        ResponseParcel::Success { activity_count: 1 },
        ResponseParcel::AuthOk { session_id: None },
    ]);
    let (_, stream) = unframe(&buf).unwrap();
    assert!(stream.contains(ParcelKind::AuthOk).unwrap());

    let (_, stream) = unframe(&buf).unwrap();
    assert!(!stream.contains(ParcelKind::AuthFailed).unwrap());
}

#[test]
fn test_unframe_inner_parcel_overruns_envelope() {
    let mut buf = multi_parcel_message(&[ResponseParcel::Success { activity_count: 3 }]);
    // Shrink the envelope so the parcel no longer fits inside it
    let shrunk = (buf.len() - 2) as u32;
    buf[..4].copy_from_slice(&shrunk.to_be_bytes());

    let (_, mut stream) = unframe(&buf).unwrap();
    assert!(matches!(stream.next(), Some(Err(TdError::Truncated { .. }))));
    assert!(stream.next().is_none());
}

#[test]
fn test_unframe_empty_envelope() {
    let buf = [0x00, 0x00, 0x00, 0x0A, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00];
    let (_, stream) = unframe(&buf).unwrap();
    assert_eq!(stream.count(), 0);
}
