//! Command Dispatch Module
//!
//! This module decides what to do with a decoded message and produces the
//! response text that goes back on the wire.
//!
//! ```text
//! Decoded message
//!       │
//!       ▼
//! ┌─────────────────┐
//! │   classify()    │  keyword only: trim + uppercase
//! └────────┬────────┘
//!          │
//!    ┌─────┴──────────────┬───────────────────┐
//!    ▼                    ▼                   ▼
//! REPORT              SELECT ...          anything else
//! console dump        Store::query        Store::execute
//! fixed ack           rows or ""          "done"
//! ```
//!
//! Classification is case-insensitive and whitespace-tolerant on the
//! keyword only; the statement forwarded to the store is the original,
//! untouched message text.

pub mod handler;

// Re-export commonly used types for convenience
pub use handler::{classify, Command, CommandHandler, EXECUTE_ACK, REPORT_ACK};
