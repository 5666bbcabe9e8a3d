//! Parcel Tests
//!
//! Tests for request parcel construction and parcel decoding.

use tdwire::protocol::{
    decode_field, encode_logoff, encode_logon, encode_run, run_sql, Parcel, ParcelKind,
    PARCEL_HEADER_SIZE,
};

// =============================================================================
// Declared Length Tests
// =============================================================================

#[test]
fn test_declared_length_includes_header() {
    let parcels = vec![
        encode_logon("admin", "password", "test", "UTF8").unwrap(),
        encode_logon("", "", "", "").unwrap(),
        encode_run("").unwrap(),
        encode_run("SEL * FROM employees").unwrap(),
        encode_run(&"x".repeat(100_000)).unwrap(),
    ];

    for parcel in parcels {
        assert_eq!(parcel.length() as usize, parcel.body.len() + PARCEL_HEADER_SIZE);
        assert_eq!(parcel.encode().len(), parcel.length() as usize);
    }
}

#[test]
fn test_logoff_fixed_length() {
    let parcel = encode_logoff();
    assert!(parcel.is(ParcelKind::Logoff));
    assert_eq!(parcel.length(), 6);
    assert!(parcel.body.is_empty());
}

// =============================================================================
// Body Layout Tests
// =============================================================================

#[test]
fn test_logon_body_fields_in_order() {
    let parcel = encode_logon("admin", "password", "EnterpriseDB", "UTF8").unwrap();
    assert_eq!(parcel.kind, 100);
    assert_eq!(&parcel.body[..2], &[0x00, 0x01]);

    let mut offset = 2;
    let mut fields = Vec::new();
    while offset < parcel.body.len() {
        let (s, next) = decode_field(&parcel.body, offset).unwrap();
        fields.push(s);
        offset = next;
    }
    assert_eq!(fields, vec!["admin", "password", "EnterpriseDB", "UTF8"]);
}

#[test]
fn test_run_body_header() {
    let sql = "SEL * FROM employees WHERE department = 'Engineering'";
    let parcel = encode_run(sql).unwrap();
    assert_eq!(parcel.kind, 1);
    assert_eq!(&parcel.body[..4], &[0x00, 0x01, 0x00, 0x00]);
    assert_eq!(&parcel.body[4..8], &(sql.len() as u32).to_be_bytes());
    assert_eq!(run_sql(&parcel).unwrap(), sql);
}

#[test]
fn test_decode_consumes_one_parcel() {
    let mut buf = encode_run("SEL 1").unwrap().encode().to_vec();
    buf.extend_from_slice(&encode_logoff().encode());

    let (first, used) = Parcel::decode(&buf).unwrap();
    assert!(first.is(ParcelKind::Run));
    let (second, rest) = Parcel::decode(&buf[used..]).unwrap();
    assert!(second.is(ParcelKind::Logoff));
    assert_eq!(used + rest, buf.len());
}
