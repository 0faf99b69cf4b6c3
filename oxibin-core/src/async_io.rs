//! Async producer/consumer helpers for ring buffer streams.
//!
//! The ring buffers themselves are synchronous. These helpers let an async
//! task stage bytes from a Tokio [`AsyncRead`] into a stream, or flush a
//! stream into an [`AsyncWrite`], between synchronous parsing passes.
//!
//! # Example
//!
//! ```rust,ignore
//! use oxibin_core::async_io::fill_from_async;
//! use oxibin_core::stream::RingBufferStream;
//!
//! async fn stage(socket: &mut tokio::net::TcpStream) -> oxibin_core::Result<usize> {
//!     let mut stream = RingBufferStream::new(1 << 16);
//!     fill_from_async(&mut stream, socket).await
//! }
//! ```
//!
//! # Feature Flag
//!
//! This module is only available when the `async-io` feature is enabled:
//!
//! ```toml
//! [dependencies]
//! oxibin-core = { version = "0.1.0", features = ["async-io"] }
//! ```

use crate::error::Result;
use crate::ringbuffer::{Addressing, RingBuffer};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Read from `reader` straight into the free slots of `ring`.
///
/// Fills the contiguous run after the write position first and, if that
/// run filled up, the wrapped run. Returns the number of bytes staged; `0`
/// means the ring is full or the reader reached end of stream.
pub async fn fill_from_async<A, R>(ring: &mut RingBuffer<u8, A>, reader: &mut R) -> Result<usize>
where
    A: Addressing,
    R: AsyncRead + Unpin,
{
    let n = {
        let (first, second) = ring.free_slices_mut();
        if first.is_empty() {
            return Ok(0);
        }
        let mut n = reader.read(first).await?;
        if n == first.len() && !second.is_empty() {
            n += reader.read(second).await?;
        }
        n
    };
    ring.advance_write(n)?;
    Ok(n)
}

/// Write every buffered byte of `ring` to `writer` and consume it.
pub async fn drain_to_async<A, W>(ring: &mut RingBuffer<u8, A>, writer: &mut W) -> Result<usize>
where
    A: Addressing,
    W: AsyncWrite + Unpin,
{
    let total = ring.len();
    {
        let (first, second) = ring.as_slices();
        writer.write_all(first).await?;
        writer.write_all(second).await?;
    }
    writer.flush().await?;
    ring.seek(total as u64)?;
    Ok(total)
}
