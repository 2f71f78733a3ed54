//! Async codec for null-terminated text messages.
//!
//! Reading accumulates bytes from the stream until the first `0x00` byte is
//! observed, then decodes everything before it as UTF-8. Invalid sequences
//! are replaced with U+FFFD rather than failing - a malformed client message
//! must never tear down the connection by itself.
//!
//! ## Known limitation
//!
//! If a single accumulation contains bytes past the terminator (a second
//! pipelined message in the same read), those bytes are discarded. Pipelining
//! is not part of the protocol contract; clients are expected to wait for a
//! response before sending the next message.

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// The byte that ends every message, in both directions.
pub const TERMINATOR: u8 = 0x00;

/// Initial capacity of the per-message read buffer.
const INITIAL_BUFFER_SIZE: usize = 1024;

/// Reads one null-terminated message from the stream.
///
/// # Returns
///
/// - `Ok(Some(text))` - a complete message, terminator stripped
/// - `Ok(None)` - end of stream before any terminator arrived (the peer
///   disconnected; any partial bytes are dropped)
/// - `Err(e)` - I/O error on the underlying stream
pub async fn read_message<R>(stream: &mut R) -> std::io::Result<Option<String>>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = BytesMut::with_capacity(INITIAL_BUFFER_SIZE);

    loop {
        if let Some(pos) = buffer.iter().position(|&b| b == TERMINATOR) {
            // Anything past the terminator in this accumulation is dropped.
            return Ok(Some(String::from_utf8_lossy(&buffer[..pos]).into_owned()));
        }

        let n = stream.read_buf(&mut buffer).await?;
        if n == 0 {
            return Ok(None);
        }
    }
}

/// Encodes a message as UTF-8 text plus the trailing terminator byte.
pub fn encode_message(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len() + 1);
    bytes.extend_from_slice(text.as_bytes());
    bytes.push(TERMINATOR);
    bytes
}

/// Writes one null-terminated message to the stream and flushes it.
///
/// The payload and terminator are written as a single buffer so a response
/// is never interleaved with itself.
pub async fn write_message<W>(stream: &mut W, text: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    stream.write_all(&encode_message(text)).await?;
    stream.flush().await
}
