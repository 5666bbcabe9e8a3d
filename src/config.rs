//! Configuration for tdwire
//!
//! Connection parameters with sensible defaults.

use std::time::Duration;

use crate::error::{Result, TdError};
use crate::protocol::ENVELOPE_HEADER_SIZE;

/// Default TCP port of the target server
pub const DEFAULT_PORT: u16 = 1025;

/// Main configuration for a tdwire connection
#[derive(Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Target
    // -------------------------------------------------------------------------
    /// Target address (hostname or IP)
    pub host: String,

    /// Target TCP port
    pub port: u16,

    // -------------------------------------------------------------------------
    // Logon
    // -------------------------------------------------------------------------
    /// Plaintext username
    pub username: String,

    /// Plaintext password
    pub password: String,

    /// Target schema name
    pub database: String,

    /// Declared text encoding (informational only, text is always UTF-8)
    pub charset: String,

    /// Protocol dialect tag written into every envelope
    pub flavor: u32,

    // -------------------------------------------------------------------------
    // Timeouts (milliseconds, 0 disables)
    // -------------------------------------------------------------------------
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Buffers
    // -------------------------------------------------------------------------
    /// Size of the single blocking read after a logon request
    pub logon_buffer_size: usize,

    /// Size of the single blocking read after a run request
    pub response_buffer_size: usize,

    /// Largest declared envelope length the reader will follow
    pub max_message_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            username: String::new(),
            password: String::new(),
            database: "test".to_string(),
            charset: "UTF8".to_string(),
            flavor: 1,
            connect_timeout_ms: 5000,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
            logon_buffer_size: 4096,
            response_buffer_size: 8192,
            max_message_size: 16 * 1024 * 1024, // 16 MB
        }
    }
}

// Hand-written so the password never reaches a log line.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("charset", &self.charset)
            .field("flavor", &self.flavor)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("read_timeout_ms", &self.read_timeout_ms)
            .field("write_timeout_ms", &self.write_timeout_ms)
            .field("logon_buffer_size", &self.logon_buffer_size)
            .field("response_buffer_size", &self.response_buffer_size)
            .field("max_message_size", &self.max_message_size)
            .finish()
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// `host:port` as passed to the resolver
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check the values a connection cannot work without
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(TdError::Config("host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(TdError::Config("port must be non-zero".to_string()));
        }
        if self.logon_buffer_size == 0 || self.response_buffer_size == 0 {
            return Err(TdError::Config(
                "read buffer sizes must be non-zero".to_string(),
            ));
        }
        if self.max_message_size < ENVELOPE_HEADER_SIZE {
            return Err(TdError::Config(format!(
                "max_message_size {} is smaller than the {}-byte envelope header",
                self.max_message_size, ENVELOPE_HEADER_SIZE
            )));
        }
        Ok(())
    }

    pub(crate) fn connect_timeout(&self) -> Option<Duration> {
        millis(self.connect_timeout_ms)
    }

    pub(crate) fn read_timeout(&self) -> Option<Duration> {
        millis(self.read_timeout_ms)
    }

    pub(crate) fn write_timeout(&self) -> Option<Duration> {
        millis(self.write_timeout_ms)
    }
}

fn millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the target host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the target port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the logon username
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.config.username = username.into();
        self
    }

    /// Set the logon password
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = password.into();
        self
    }

    /// Set the target database
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.config.database = database.into();
        self
    }

    /// Set the declared character set
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.config.charset = charset.into();
        self
    }

    /// Set the protocol flavor
    pub fn flavor(mut self, flavor: u32) -> Self {
        self.config.flavor = flavor;
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the logon read buffer size (in bytes)
    pub fn logon_buffer_size(mut self, size: usize) -> Self {
        self.config.logon_buffer_size = size;
        self
    }

    /// Set the response read buffer size (in bytes)
    pub fn response_buffer_size(mut self, size: usize) -> Self {
        self.config.response_buffer_size = size;
        self
    }

    /// Set the maximum followed message size (in bytes)
    pub fn max_message_size(mut self, size: usize) -> Self {
        self.config.max_message_size = size;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
