//! Null-Terminated Message Codec
//!
//! This module implements the wire format sqlgate speaks: each logical
//! message, in both directions, is UTF-8 text followed by a single `0x00`
//! byte. There is no length prefix and no header - the terminator is the
//! entire framing.
//!
//! ## Modules
//!
//! - `codec`: async read/write of null-terminated messages
//!
//! ## Example
//!
//! ```ignore
//! use sqlgate::protocol::{read_message, write_message};
//!
//! // Server side of one round-trip
//! if let Some(message) = read_message(&mut stream).await? {
//!     write_message(&mut stream, "done").await?;
//! }
//! ```

pub mod codec;

// Re-export commonly used functions for convenience
pub use codec::{encode_message, read_message, write_message, TERMINATOR};
