//! # sqlgate - SQL over a Null-Terminated TCP Protocol
//!
//! sqlgate is a minimal network front-end to an embedded SQLite database.
//! Clients connect over plain TCP, send UTF-8 text messages terminated by a
//! single `0x00` byte, and receive responses framed the same way. Each
//! message is either a fixed server-side report request or an opaque SQL
//! statement forwarded almost verbatim to the database engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          sqlgate                             │
//! │                                                              │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐       │
//! │  │ TCP Server  │───>│ Connection  │───>│  Command    │       │
//! │  │ (Listener)  │    │  Handler    │    │  Handler    │       │
//! │  └─────────────┘    └─────────────┘    └──────┬──────┘       │
//! │                                               │              │
//! │  ┌─────────────┐                              ▼              │
//! │  │ Null-byte   │                     ┌─────────────────┐     │
//! │  │ Codec       │                     │      Store      │     │
//! │  │             │                     │  (SQLite file)  │     │
//! │  └─────────────┘                     └─────────────────┘     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Protocol
//!
//! Each logical message, in both directions, is UTF-8 text followed by one
//! `0x00` byte. There is no length prefix, no headers, no versioning.
//!
//! | Message | Behavior | Response |
//! |---|---|---|
//! | `REPORT` | dumps Users/Logins/Files to the console | `Report printed on server console` |
//! | `SELECT ...` | row-returning query | rows joined by `\|`, columns by space |
//! | anything else | mutating statement | `done` or `SQL ERROR: <message>` |
//!
//! Keyword matching is case-insensitive and whitespace-tolerant; the
//! statement itself is forwarded unmodified. There is no SQL validation or
//! injection defense of any kind - the passthrough is the documented
//! contract, inherited as-is from the system this replaces.
//!
//! ## Module Overview
//!
//! - [`protocol`]: null-terminated message codec
//! - [`store`]: SQLite-backed store (one connection per call, no pool)
//! - [`commands`]: message classification and dispatch
//! - [`connection`]: per-client connection loop
//!
//! ## Concurrency Model
//!
//! One tokio task per accepted connection, with no upper bound. Tasks share
//! nothing but the database file; every store call opens and closes its own
//! SQLite connection, so cross-connection exclusion is delegated entirely to
//! SQLite's file locking. Within a connection, messages are processed
//! strictly in arrival order.

pub mod commands;
pub mod connection;
pub mod protocol;
pub mod store;

// Re-export commonly used types for convenience
pub use commands::CommandHandler;
pub use connection::{handle_connection, ConnectionStats};
pub use protocol::{encode_message, read_message, write_message};
pub use store::{ServerReport, Store, StoreError};

/// The default port sqlgate listens on
pub const DEFAULT_PORT: u16 = 7778;

/// The default host sqlgate binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// The default SQLite database file, relative to the working directory
pub const DEFAULT_DB_PATH: &str = "sqlgate.db";

/// Version of sqlgate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
