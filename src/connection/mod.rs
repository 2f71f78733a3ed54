//! Connection Handling Module
//!
//! Each accepted TCP connection is owned by exactly one async task running
//! a [`ConnectionHandler`] to completion.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     TCP Listener                            │
//! │                      (main.rs)                              │
//! └──────────────────────┬──────────────────────────────────────┘
//!                        │ accept()
//!                        ▼
//!           ┌────────────────────────┐
//!           │   For each client...   │
//!           └────────────┬───────────┘
//!                        │ spawn task
//!                        ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 ConnectionHandler                           │
//! │                                                             │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐     │
//! │  │ Read message │──>│ Dispatch     │──>│ Write resp   │     │
//! │  └──────────────┘   └──────────────┘   └──────┬───────┘     │
//! │         ▲                                     │             │
//! │         └─────────────────────────────────────┘             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The loop ends on end-of-stream or any I/O error; either way the socket
//! is released exactly once when the handler is dropped. Nothing is shared
//! between handlers except the store (which opens its own connection per
//! call) and the [`ConnectionStats`] counters.

pub mod handler;

// Re-export commonly used types for convenience
pub use handler::{handle_connection, ConnectionHandler, ConnectionStats};
