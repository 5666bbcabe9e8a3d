//! Client Connection
//!
//! Owns one TCP socket and drives the logon / run / logoff lifecycle.
//!
//! ```text
//! Unconnected ──connect──▶ SocketOpen ──logon sent──▶ AwaitingAuthAck ──ack──▶ Authenticated
//!      │                        │                            │                       │
//!      └────────────────────────┴──────── close / fatal I/O ─┴───────────────────────┴──▶ Closed
//! ```

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};

use bytes::Bytes;

use crate::config::Config;
use crate::error::{Result, TdError};
use crate::protocol::{
    classify, encode_logoff, encode_logon, encode_run, frame, read_message, unframe,
    write_message, Parcel, ResponseClass, StatementResult,
};

/// Session id used until the server assigns one
pub const INITIAL_SESSION_ID: u16 = 1;

/// Connection lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Unconnected,
    SocketOpen,
    AwaitingAuthAck,
    Authenticated,
    Closed,
}

/// A blocking client session
///
/// Not internally synchronized: one caller at a time.
pub struct Connection {
    config: Config,

    /// Present from socket open until close
    stream: Option<TcpStream>,

    state: ConnectionState,

    /// Written into every envelope
    session_id: u16,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create an unconnected session for `config`
    pub fn new(config: Config) -> Self {
        let peer_addr = config.addr();
        Self {
            config,
            stream: None,
            state: ConnectionState::Unconnected,
            session_id: INITIAL_SESSION_ID,
            peer_addr,
        }
    }

    /// Connect and log on, failing unless the server acknowledged the logon
    pub fn open(config: Config) -> Result<Self> {
        let mut conn = Self::new(config);
        if !conn.connect()? {
            return Err(TdError::AuthenticationFailed(format!(
                "no Auth-Ack from {}",
                conn.peer_addr
            )));
        }
        Ok(conn)
    }

    /// Open the socket and perform the logon handshake
    ///
    /// Returns `Ok(false)` when the server answered without an Auth-Ack.
    /// I/O failures close the connection.
    pub fn connect(&mut self) -> Result<bool> {
        match self.state {
            ConnectionState::Unconnected => {}
            ConnectionState::Authenticated => return Ok(true),
            other => {
                return Err(TdError::Protocol(format!(
                    "connect called in state {:?}",
                    other
                )))
            }
        }
        self.config.validate()?;

        let result = self.handshake();
        if result.is_err() {
            self.teardown();
        }
        result
    }

    fn handshake(&mut self) -> Result<bool> {
        let stream = self.open_socket()?;
        self.stream = Some(stream);
        self.state = ConnectionState::SocketOpen;
        tracing::debug!("Socket open to {}", self.peer_addr);

        let logon = encode_logon(
            &self.config.username,
            &self.config.password,
            &self.config.database,
            &self.config.charset,
        )?;
        self.send(&logon)?;
        self.state = ConnectionState::AwaitingAuthAck;

        let response = self.receive(self.config.logon_buffer_size)?;
        match classify(&response) {
            ResponseClass::AuthOk { session_id } => {
                if let Some(id) = session_id {
                    self.session_id = id;
                }
                self.state = ConnectionState::Authenticated;
                tracing::debug!(
                    "Logged on to {} as {} (session {})",
                    self.peer_addr,
                    self.config.username,
                    self.session_id
                );
                Ok(true)
            }
            ResponseClass::AuthFailed { message } => {
                tracing::warn!("Logon to {} rejected: {}", self.peer_addr, message);
                Ok(false)
            }
            ResponseClass::Unknown => {
                tracing::warn!(
                    "Logon response from {} carried no Auth-Ack ({} bytes)",
                    self.peer_addr,
                    response.len()
                );
                Ok(false)
            }
        }
    }

    fn open_socket(&self) -> Result<TcpStream> {
        let addr = self.peer_addr.clone();
        let refused = |source: std::io::Error| TdError::ConnectionRefused {
            addr: addr.clone(),
            source,
        };

        let candidates: Vec<SocketAddr> = addr.to_socket_addrs().map_err(refused)?.collect();
        let mut last_err = std::io::Error::new(
            std::io::ErrorKind::AddrNotAvailable,
            "host resolved to no addresses",
        );

        for candidate in candidates {
            let attempt = match self.config.connect_timeout() {
                Some(timeout) => TcpStream::connect_timeout(&candidate, timeout),
                None => TcpStream::connect(candidate),
            };
            match attempt {
                Ok(stream) => {
                    stream.set_nodelay(true)?;
                    stream.set_read_timeout(self.config.read_timeout())?;
                    stream.set_write_timeout(self.config.write_timeout())?;
                    return Ok(stream);
                }
                Err(e) => {
                    tracing::debug!("Connect to {} failed: {}", candidate, e);
                    last_err = e;
                }
            }
        }

        Err(refused(last_err))
    }

    /// Run one statement and return the raw response bytes
    pub fn execute(&mut self, sql: &str) -> Result<Bytes> {
        if self.state != ConnectionState::Authenticated {
            return Err(TdError::NotAuthenticated);
        }

        let run = encode_run(sql)?;
        tracing::debug!("Executing statement of {} bytes", sql.len());

        let result = self
            .send(&run)
            .and_then(|_| self.receive(self.config.response_buffer_size));
        // Responses are not tagged, so the session cannot survive a lost one
        if let Err(ref e) = result {
            tracing::warn!("Transport failure on {}: {}", self.peer_addr, e);
            self.teardown();
        }
        result
    }

    /// Run one statement and decode its result parcels
    pub fn query(&mut self, sql: &str) -> Result<StatementResult> {
        let response = self.execute(sql)?;
        let (_, parcels) = unframe(&response)?;
        StatementResult::from_parcels(parcels)
    }

    /// Log off and release the socket
    ///
    /// Never fails; calling it again is a no-op.
    pub fn close(&mut self) {
        if self.state == ConnectionState::Closed {
            return;
        }

        if self.stream.is_some() {
            if let Err(e) = self.send(&encode_logoff()) {
                tracing::warn!("Logoff to {} failed: {}", self.peer_addr, e);
            }
        }
        self.teardown();
        tracing::debug!("Connection to {} closed", self.peer_addr);
    }

    /// Drop the socket without a logoff
    fn teardown(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(std::net::Shutdown::Both);
        }
        self.state = ConnectionState::Closed;
    }

    fn send(&mut self, parcel: &Parcel) -> Result<()> {
        let message = frame(parcel, self.session_id, self.config.flavor)?;
        let stream = self.stream.as_mut().ok_or(TdError::NotAuthenticated)?;
        tracing::trace!("Sending parcel {} ({} bytes)", parcel.kind, message.len());
        write_message(stream, &message)
    }

    fn receive(&mut self, buffer_size: usize) -> Result<Bytes> {
        let max = self.config.max_message_size;
        let flavor = self.config.flavor;
        let stream = self.stream.as_mut().ok_or(TdError::NotAuthenticated)?;
        let response = read_message(stream, buffer_size, max, flavor)?;
        tracing::trace!("Received {} bytes from {}", response.len(), self.peer_addr);
        Ok(response)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == ConnectionState::Authenticated
    }

    /// Session id written into outgoing envelopes
    pub fn session_id(&self) -> u16 {
        self.session_id
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}
