//! SQLite Store Module
//!
//! This module owns all persistent state: the three tables (Users, Logins,
//! Files) living in a single SQLite database file.
//!
//! ## Connection Model
//!
//! There is deliberately no connection pool. Every operation opens a fresh
//! SQLite connection, runs exactly one statement (or the fixed report
//! queries), and closes the connection before returning:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                       Store                          │
//! │                                                      │
//! │   execute("INSERT ...")  ──> open ─ run ─ close      │
//! │   query("SELECT ...")    ──> open ─ run ─ close      │
//! │   report()               ──> open ─ run ─ close      │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! This bounds the blast radius of a single bad statement, and it means all
//! cross-connection mutual exclusion is delegated to SQLite's own file-level
//! locking. There is no cross-statement atomicity.
//!
//! ## Modules
//!
//! - `schema`: DDL for initializing the database
//! - `engine`: the `Store` type and row serialization
//! - `report`: the operator-facing `ServerReport`

pub mod engine;
pub mod report;
pub mod schema;

// Re-export commonly used types for convenience
pub use engine::{Store, StoreError};
pub use report::{FileEntry, LoginEntry, ServerReport};
pub use schema::SQLITE_INIT;
