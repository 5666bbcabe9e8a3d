//! Network Tests
//!
//! Drives `Connection` against a scripted peer on a loopback socket.

mod common;
