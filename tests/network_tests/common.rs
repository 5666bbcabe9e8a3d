//! Scripted peer helpers

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};

use tdwire::protocol::{ResponseParcel, DEFAULT_FLAVOR, ENVELOPE_HEADER_SIZE};
use tdwire::Config;

/// Bind a loopback listener and run `script` on the first accepted socket
///
/// The script's return value comes back through the join handle.
pub fn spawn_peer<T, F>(script: F) -> (u16, JoinHandle<T>)
where
    T: Send + 'static,
    F: FnOnce(TcpStream) -> T + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        script(stream)
    });
    (port, handle)
}

/// Read one client envelope, or None once the client hung up
pub fn read_frame(stream: &mut TcpStream) -> Option<Vec<u8>> {
    let mut len = [0u8; 4];
    stream.read_exact(&mut len).ok()?;
    let total = u32::from_be_bytes(len) as usize;
    let mut frame = len.to_vec();
    frame.resize(total, 0);
    stream.read_exact(&mut frame[4..]).ok()?;
    Some(frame)
}

/// Read envelopes until the client hangs up
pub fn read_all_frames(stream: &mut TcpStream) -> Vec<Vec<u8>> {
    let mut frames = Vec::new();
    while let Some(frame) = read_frame(stream) {
        frames.push(frame);
    }
    frames
}

/// Build a response envelope holding several parcels
pub fn response_message(parcels: &[ResponseParcel]) -> Vec<u8> {
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

/// The logon acknowledgment a well-behaved server sends
pub fn logon_ack(session_id: Option<u16>) -> Vec<u8> {
    response_message(&[
        ResponseParcel::AuthOk { session_id },
        ResponseParcel::Success { activity_count: 1 },
        ResponseParcel::EndStatement,
        ResponseParcel::EndRequest,
    ])
}

pub fn write(stream: &mut TcpStream, bytes: &[u8]) {
    stream.write_all(bytes).unwrap();
    stream.flush().unwrap();
}

pub fn test_config(port: u16) -> Config {
    Config::builder()
        .host("127.0.0.1")
        .port(port)
        .username("admin")
        .password("password")
        .database("test")
        .charset("UTF8")
        .read_timeout_ms(2000)
        .build()
}
