//! Byte sources feeding the bit readers.
//!
//! A [`ByteSource`] is anything that can hand out up to `N` bytes at a time
//! and skip forward without transferring data. The bit readers only ever
//! talk to this trait, so a ring buffer stream, an in-memory slice or any
//! `std::io` reader can sit underneath them.
//!
//! # Example
//!
//! ```
//! use oxibin_core::source::{ByteSource, IoSource};
//! use std::io::Cursor;
//!
//! let mut source = IoSource::new(Cursor::new(vec![1u8, 2, 3, 4]));
//! source.seek_forward(1).unwrap();
//!
//! let mut buf = [0u8; 2];
//! assert_eq!(source.read_into(&mut buf).unwrap(), 2);
//! assert_eq!(buf, [2, 3]);
//! ```

use crate::error::{OxiBinError, Result};
use std::io::{self, Read, Seek, SeekFrom};

/// Capability required by the bit readers: bounded reads and forward seeks.
pub trait ByteSource {
    /// Read up to `buf.len()` bytes into `buf`, returning the count read.
    ///
    /// A return of `0` means no more data is currently available, which is
    /// not necessarily the end of the stream.
    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Advance the read position by `count` bytes without transferring data.
    ///
    /// Slices and ring buffer streams leave their position untouched when
    /// the seek fails. Sources that skip by discarding may already have
    /// consumed part of the distance.
    fn seek_forward(&mut self, count: u64) -> Result<()>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    #[inline]
    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read_into(buf)
    }

    #[inline]
    fn seek_forward(&mut self, count: u64) -> Result<()> {
        (**self).seek_forward(count)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    #[inline]
    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read_into(buf)
    }

    #[inline]
    fn seek_forward(&mut self, count: u64) -> Result<()> {
        (**self).seek_forward(count)
    }
}

impl ByteSource for &[u8] {
    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize> {
        let data: &[u8] = *self;
        let n = buf.len().min(data.len());
        let (head, tail) = data.split_at(n);
        buf[..n].copy_from_slice(head);
        *self = tail;
        Ok(n)
    }

    fn seek_forward(&mut self, count: u64) -> Result<()> {
        let data: &[u8] = *self;
        match usize::try_from(count) {
            Ok(count) if count <= data.len() => {
                *self = &data[count..];
                Ok(())
            }
            _ => Err(OxiBinError::insufficient_data(
                count.saturating_mul(8),
                data.len() as u64 * 8,
            )),
        }
    }
}

/// Adapts any [`Read`] into a [`ByteSource`].
///
/// Forward seeks are served by reading and discarding, so this works for
/// pipes and sockets that cannot seek.
#[derive(Debug)]
pub struct IoSource<R> {
    inner: R,
}

impl<R: Read> IoSource<R> {
    /// Wrap a reader.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Get a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Get a mutable reference to the underlying reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consume this adapter and return the underlying reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> ByteSource for IoSource<R> {
    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize> {
        read_retrying(&mut self.inner, buf)
    }

    fn seek_forward(&mut self, count: u64) -> Result<()> {
        let skipped = io::copy(&mut self.inner.by_ref().take(count), &mut io::sink())?;
        if skipped < count {
            return Err(OxiBinError::insufficient_data(
                count.saturating_mul(8),
                skipped.saturating_mul(8),
            ));
        }
        Ok(())
    }
}

/// Adapts a [`Read`] + [`Seek`] into a [`ByteSource`].
///
/// Forward seeks are relative seeks on the underlying stream; no bytes are
/// transferred.
#[derive(Debug)]
pub struct SeekSource<R> {
    inner: R,
}

impl<R: Read + Seek> SeekSource<R> {
    /// Wrap a seekable reader.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Get a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Get a mutable reference to the underlying reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consume this adapter and return the underlying reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> ByteSource for SeekSource<R> {
    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize> {
        read_retrying(&mut self.inner, buf)
    }

    fn seek_forward(&mut self, count: u64) -> Result<()> {
        let offset = i64::try_from(count)
            .map_err(|_| OxiBinError::not_supported("forward seek beyond i64::MAX"))?;
        self.inner.seek(SeekFrom::Current(offset))?;
        Ok(())
    }
}

pub(crate) fn read_retrying<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    if buf.is_empty() {
        return Ok(0);
    }
    loop {
        match reader.read(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
}
