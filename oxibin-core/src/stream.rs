//! Ring buffer streams for staging bytes between a producer and a parser.
//!
//! A ring buffer stream is a [`RingBuffer`] of bytes. Two flavours are
//! provided:
//!
//! - [`RingBufferStream`]: power-of-two capacity with mask addressing.
//! - [`ShortRingBufferStream`]: 64 KiB addressed by a 16-bit counter.
//!
//! Both implement [`ByteSource`], so a [`BitReader`](crate::BitReader) can
//! drain them directly, as well as `std::io::{Read, Write, Seek}`.
//!
//! # Example
//!
//! ```
//! use oxibin_core::stream::RingBufferStream;
//!
//! let mut stream = RingBufferStream::new(8);
//! stream.write(b"key=val\n").unwrap();
//!
//! assert_eq!(stream.scan(b'='), Some(3));
//! stream.seek(4).unwrap();
//!
//! let mut value = [0u8; 3];
//! stream.read(&mut value).unwrap();
//! assert_eq!(&value, b"val");
//! ```

use crate::error::{OxiBinError, Result};
use crate::ringbuffer::{Addressing, Masked, RingBuffer, Wrapping};
use crate::source::{ByteSource, read_retrying};
use std::io::{self, Read, SeekFrom, Write};

/// Byte ring buffer with power-of-two capacity and mask addressing.
pub type RingBufferStream = RingBuffer<u8, Masked>;

/// 64 KiB byte ring buffer addressed by a wrapping 16-bit counter.
pub type ShortRingBufferStream = RingBuffer<u8, Wrapping<u16>>;

impl<A: Addressing> RingBuffer<u8, A> {
    /// Offset from the read position of the first buffered `byte`.
    pub fn scan(&self, byte: u8) -> Option<usize> {
        self.position_of(&byte)
    }

    /// Read whatever fits from `reader` into the free space.
    ///
    /// Reads straight into the free slots: once into the contiguous run
    /// after the write position and, if that run filled up, once more into
    /// the wrapped run. Returns the number of bytes staged; `0` means either
    /// the buffer is full or the reader is dry.
    pub fn fill_from<R: Read>(&mut self, reader: &mut R) -> Result<usize> {
        let n = {
            let (first, second) = self.free_slices_mut();
            let mut n = read_retrying(reader, first)?;
            if n == first.len() && !second.is_empty() {
                n += read_retrying(reader, second)?;
            }
            n
        };
        self.advance_write(n)?;
        Ok(n)
    }

    /// Write every buffered byte to `writer` and consume it.
    pub fn drain_to<W: Write>(&mut self, writer: &mut W) -> Result<usize> {
        let total = self.len();
        {
            let (first, second) = self.as_slices();
            writer.write_all(first)?;
            writer.write_all(second)?;
        }
        self.seek(total as u64)?;
        Ok(total)
    }

    /// Changing the length of a ring buffer stream is not supported.
    pub fn set_len(&mut self, _len: u64) -> Result<()> {
        Err(OxiBinError::not_supported("set_len on a ring buffer stream"))
    }
}

impl<A: Addressing> ByteSource for RingBuffer<u8, A> {
    /// Short reads are part of the contract, so this always clamps to the
    /// buffered length regardless of the underflow policy.
    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = buf.len().min(self.len());
        RingBuffer::read(self, &mut buf[..n])
    }

    fn seek_forward(&mut self, count: u64) -> Result<()> {
        self.seek(count)?;
        Ok(())
    }
}

impl<A: Addressing> Read for RingBuffer<u8, A> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_into(buf)?)
    }
}

impl<A: Addressing> Write for RingBuffer<u8, A> {
    /// Writes all of `buf` or fails, following the overflow policy.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        RingBuffer::write(self, buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(OxiBinError::not_supported("flush on a ring buffer stream").into())
    }
}

impl<A: Addressing> io::Seek for RingBuffer<u8, A> {
    /// Only forward seeks relative to the read position are supported.
    ///
    /// Returns the new logical read position.
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match pos {
            SeekFrom::Current(offset) if offset >= 0 => {
                RingBuffer::seek(self, offset as u64)?;
                Ok(self.read_position())
            }
            SeekFrom::Current(_) => {
                Err(OxiBinError::not_supported("backward seek on a ring buffer stream").into())
            }
            SeekFrom::Start(_) | SeekFrom::End(_) => {
                Err(OxiBinError::not_supported("absolute seek on a ring buffer stream").into())
            }
        }
    }
}
