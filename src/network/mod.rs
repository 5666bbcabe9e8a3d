//! Network Module
//!
//! Blocking TCP client for the parcel protocol.
//!
//! ## Model
//! - One socket per `Connection`, owned for its whole life
//! - Every call blocks until its read completes or times out
//! - No internal locking; callers serialize access

mod connection;

pub use connection::{Connection, ConnectionState, INITIAL_SESSION_ID};
