//! # tdwire
//!
//! A minimal blocking client for a Teradata-style binary parcel protocol:
//! - Length-prefixed field encoding
//! - Parcel codec for logon, run and logoff requests
//! - Envelope framing with a structural response parser
//! - Session lifecycle over a single TCP connection
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Connection                              │
//! │          connect / execute / query / close                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Framer    │          │  Scanner /  │
//!   │ (envelope)  │          │  Unframer   │
//!   └──────┬──────┘          └─────────────┘
//!          │
//!          ▼
//!   ┌─────────────┐
//!   │   Parcel    │
//!   │   Codec     │
//!   └──────┬──────┘
//!          │
//!          ▼
//!   ┌─────────────┐
//!   │   Field     │
//!   │  Encoder    │
//!   └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{TdError, Result};
pub use config::Config;
pub use network::{Connection, ConnectionState};
pub use protocol::StatementResult;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of tdwire
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
