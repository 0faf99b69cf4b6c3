//! Bit-level reading over a [`ByteSource`].
//!
//! This module provides [`BitReader`], which presents a byte stream as an
//! addressable sequence of single bits, and the [`ReadBits`] trait that
//! decoders use to consume bits without caring about the window width.
//!
//! # Bit Ordering
//!
//! Bits are consumed MSB-first within each byte: the most significant bit of
//! the first byte is the first bit of the stream. The window keeps its
//! unconsumed bits left-justified, so a peek is a mask and a right shift.
//!
//! # Window Widths
//!
//! The accumulator is either a `u32` ([`BitReader32`]) or a `u64`
//! ([`BitReader64`]). Both behave identically; the 64-bit reader can return
//! up to 64 bits from a single [`BitReader::read`].
//!
//! # Example
//!
//! ```
//! use oxibin_core::bitstream::BitReader32;
//!
//! let data = [0b1011_0101u8, 0xFF];
//! let mut reader = BitReader32::new(&data[..]);
//!
//! assert_eq!(reader.peek(3).unwrap(), 0b101);
//! assert_eq!(reader.read(3).unwrap(), 0b101);
//! assert_eq!(reader.byte_align(), 5);
//! assert_eq!(reader.read(8).unwrap(), 0xFF);
//! ```

use crate::error::{OxiBinError, Result};
use crate::source::ByteSource;
use log::trace;
use std::fmt;

mod private {
    pub trait Sealed {}

    impl Sealed for u32 {}
    impl Sealed for u64 {}
}

/// Fixed-width accumulator backing a [`BitReader`].
///
/// Implemented for `u32` and `u64` only.
pub trait Window: Copy + Default + PartialEq + fmt::Debug + private::Sealed {
    /// Width of the accumulator in bits.
    const BITS: u32;

    /// An empty window.
    const ZERO: Self;

    /// The top `length` bits, right-aligned. `length` must be in `1..=BITS`.
    fn top(self, length: u32) -> Self;

    /// Drop the top `length` bits and shift the rest up. Shifting by `BITS`
    /// yields an empty window.
    fn shift_out(self, length: u32) -> Self;

    /// Insert `byte` so its most significant bit sits `offset` bits below
    /// the top. `offset` must be at most `BITS - 8`.
    fn with_byte(self, byte: u8, offset: u32) -> Self;

    /// Truncating conversion to `u32`.
    fn low_u32(self) -> u32;
}

macro_rules! impl_window {
    ($ty:ty) => {
        impl Window for $ty {
            const BITS: u32 = <$ty>::BITS;
            const ZERO: Self = 0;

            #[inline(always)]
            fn top(self, length: u32) -> Self {
                debug_assert!(length >= 1 && length <= Self::BITS);
                let mask = if length == Self::BITS {
                    <$ty>::MAX
                } else {
                    !(<$ty>::MAX >> length)
                };
                (self & mask) >> (Self::BITS - length)
            }

            #[inline(always)]
            fn shift_out(self, length: u32) -> Self {
                self.checked_shl(length).unwrap_or(0)
            }

            #[inline(always)]
            fn with_byte(self, byte: u8, offset: u32) -> Self {
                debug_assert!(offset <= Self::BITS - 8);
                self | (<$ty>::from(byte) << (Self::BITS - 8 - offset))
            }

            #[inline(always)]
            fn low_u32(self) -> u32 {
                self as u32
            }
        }
    };
}

impl_window!(u32);
impl_window!(u64);

/// Width-independent bit reading, as consumed by decoders.
pub trait ReadBits {
    /// Peek at up to 32 bits without consuming them.
    fn peek_bits(&mut self, length: u32) -> Result<u32>;

    /// Read up to 32 bits.
    fn read_bits(&mut self, length: u32) -> Result<u32>;

    /// Skip `length` bits, returning `length`.
    fn skip_bits(&mut self, length: u64) -> Result<u64>;

    /// Skip to the next byte boundary, returning the number of bits skipped.
    fn byte_align(&mut self) -> u32;

    /// Byte-align, then fill `buf` with whole bytes. Returns the count placed.
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Number of bits consumed so far.
    fn bit_position(&self) -> u64;

    /// Read a single bit as a boolean.
    fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? == 1)
    }

    /// Peek at a single bit as a boolean.
    fn peek_bool(&mut self) -> Result<bool> {
        Ok(self.peek_bits(1)? == 1)
    }
}

impl<T: ReadBits + ?Sized> ReadBits for &mut T {
    fn peek_bits(&mut self, length: u32) -> Result<u32> {
        (**self).peek_bits(length)
    }

    fn read_bits(&mut self, length: u32) -> Result<u32> {
        (**self).read_bits(length)
    }

    fn skip_bits(&mut self, length: u64) -> Result<u64> {
        (**self).skip_bits(length)
    }

    fn byte_align(&mut self) -> u32 {
        (**self).byte_align()
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read_bytes(buf)
    }

    fn bit_position(&self) -> u64 {
        (**self).bit_position()
    }
}

/// A bit reader with a 32-bit window.
pub type BitReader32<S> = BitReader<S, u32>;

/// A bit reader with a 64-bit window.
pub type BitReader64<S> = BitReader<S, u64>;

/// A bit-level reader over any [`ByteSource`].
///
/// `BitReader` buffers whole bytes from its source into a fixed-width
/// window and refills on demand. To borrow a source instead of owning it,
/// pass `&mut source`.
#[derive(Debug)]
pub struct BitReader<S, W = u64> {
    /// Underlying byte source.
    source: S,
    /// Bit window (MSB-first, left-justified).
    window: W,
    /// Number of valid bits at the top of the window.
    bits_loaded: u32,
    /// Total bits consumed (for error reporting).
    total_bits_read: u64,
}

impl<S: ByteSource, W: Window> BitReader<S, W> {
    /// Create a new `BitReader` over the given source.
    pub fn new(source: S) -> Self {
        Self {
            source,
            window: W::ZERO,
            bits_loaded: 0,
            total_bits_read: 0,
        }
    }

    /// Get a reference to the underlying source.
    pub fn get_ref(&self) -> &S {
        &self.source
    }

    /// Get a mutable reference to the underlying source.
    ///
    /// Reading from the source directly skips over any bits still buffered.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Consume this `BitReader` and return the underlying source.
    ///
    /// Bits still buffered in the window are lost.
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Get the current bit position (total bits consumed).
    pub fn bit_position(&self) -> u64 {
        self.total_bits_read
    }

    /// Number of bits currently buffered in the window.
    pub fn bits_buffered(&self) -> u32 {
        self.bits_loaded
    }

    /// Whether the next unconsumed bit starts a byte.
    pub fn is_byte_aligned(&self) -> bool {
        self.bits_loaded % 8 == 0
    }

    /// Largest request the window can satisfy at its current alignment.
    #[inline]
    fn request_limit(&self) -> u32 {
        W::BITS - (W::BITS - self.bits_loaded) % 8
    }

    #[inline]
    fn invalidate(&mut self) {
        self.total_bits_read += u64::from(self.bits_loaded);
        self.window = W::ZERO;
        self.bits_loaded = 0;
    }

    #[inline]
    fn consume(&mut self, length: u32) {
        debug_assert!(length <= self.bits_loaded);
        self.window = self.window.shift_out(length);
        self.bits_loaded -= length;
        self.total_bits_read += u64::from(length);
    }

    /// Pull whole bytes from the source until at least `min_bits` are
    /// buffered or the window has no room for another byte.
    fn refill(&mut self, min_bits: u32) -> Result<()> {
        let free_bytes = ((W::BITS - self.bits_loaded) / 8) as usize;
        let mut bytes = [0u8; 8];
        let mut got = 0usize;
        let mut failure = None;

        while got < free_bytes && self.bits_loaded + (got as u32) * 8 < min_bits {
            match self.source.read_into(&mut bytes[got..free_bytes]) {
                Ok(0) => break,
                Ok(n) => got += n,
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        // Keep whatever arrived, even on failure.
        for &byte in &bytes[..got] {
            self.window = self.window.with_byte(byte, self.bits_loaded);
            self.bits_loaded += 8;
        }
        trace!(
            "refilled {} bytes, {} bits buffered (need {})",
            got, self.bits_loaded, min_bits
        );

        if let Some(e) = failure {
            return Err(e);
        }
        if self.bits_loaded < min_bits {
            return Err(OxiBinError::insufficient_data(
                u64::from(min_bits),
                u64::from(self.bits_loaded),
            ));
        }
        Ok(())
    }

    /// Peek at the next `length` bits without consuming them.
    ///
    /// # Arguments
    ///
    /// * `length` - Number of bits to peek (0 to the window width)
    ///
    /// # Returns
    ///
    /// The bits right-aligned, first stream bit most significant.
    #[inline]
    pub fn peek(&mut self, length: u32) -> Result<W> {
        if length == 0 {
            return Ok(W::ZERO);
        }
        if length > W::BITS {
            return Err(OxiBinError::oversized_request(length, W::BITS));
        }

        if length > self.bits_loaded {
            let limit = self.request_limit();
            if length > limit {
                return Err(OxiBinError::oversized_request(length, limit));
            }
            self.refill(length)?;
        }

        Ok(self.window.top(length))
    }

    /// Skip `length` bits.
    ///
    /// Skips that do not fit in the window seek the source forward by whole
    /// bytes instead of reading them. Returns `length`.
    ///
    /// A failed skip consumes nothing as long as the target fits in the
    /// window or the source rejects the seek, so it can be retried once more
    /// data arrives. If the seek succeeds but the trailing bits are missing,
    /// [`bit_position`](Self::bit_position) reports how far the skip got.
    pub fn skip(&mut self, length: u64) -> Result<u64> {
        let loaded = u64::from(self.bits_loaded);

        if length < loaded {
            self.consume(length as u32);
        } else if length == loaded {
            self.invalidate();
        } else if length <= u64::from(self.request_limit()) {
            let length = length as u32;
            self.refill(length)?;
            self.consume(length);
        } else {
            let remaining = length - loaded;
            let bytes = remaining / 8;
            trace!("seeking source forward {} bytes", bytes);
            self.source.seek_forward(bytes)?;
            self.invalidate();
            self.total_bits_read += bytes * 8;

            let remaining = (remaining % 8) as u32;
            if remaining > 0 {
                self.refill(remaining)?;
                self.consume(remaining);
            }
        }

        Ok(length)
    }

    /// Read the next `length` bits.
    ///
    /// Equivalent to [`peek`](Self::peek) followed by [`skip`](Self::skip).
    #[inline]
    pub fn read(&mut self, length: u32) -> Result<W> {
        let value = self.peek(length)?;
        self.skip(u64::from(length))?;
        Ok(value)
    }

    /// Peek at up to 32 bits as a `u32`.
    #[inline]
    pub fn peek_u32(&mut self, length: u32) -> Result<u32> {
        if length > 32 {
            return Err(OxiBinError::oversized_request(length, 32));
        }
        Ok(self.peek(length)?.low_u32())
    }

    /// Read up to 32 bits as a `u32`.
    #[inline]
    pub fn read_u32(&mut self, length: u32) -> Result<u32> {
        let value = self.peek_u32(length)?;
        self.skip(u64::from(length))?;
        Ok(value)
    }

    /// Read a single bit.
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u32(1)? == 1)
    }

    /// Peek at a single bit.
    pub fn peek_bool(&mut self) -> Result<bool> {
        Ok(self.peek_u32(1)? == 1)
    }

    /// Skip to the next byte boundary by discarding partial bits.
    ///
    /// Returns the number of bits skipped (0-7).
    pub fn byte_align(&mut self) -> u32 {
        let remainder = self.bits_loaded % 8;
        self.consume(remainder);
        remainder
    }

    /// Read whole bytes into `buf`.
    ///
    /// The reader is byte-aligned first. Bytes still in the window are
    /// drained before reading the rest directly from the source. Returns the
    /// number of bytes placed, which is short only if the source ran dry.
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.byte_align();

        let mut placed = 0;
        while self.bits_loaded >= 8 && placed < buf.len() {
            buf[placed] = self.window.top(8).low_u32() as u8;
            self.consume(8);
            placed += 1;
        }

        if self.bits_loaded > 0 {
            return Ok(placed);
        }

        while placed < buf.len() {
            let n = self.source.read_into(&mut buf[placed..])?;
            if n == 0 {
                break;
            }
            placed += n;
            self.total_bits_read += n as u64 * 8;
        }

        Ok(placed)
    }
}

impl<S: ByteSource> BitReader<S, u64> {
    /// Read up to 64 bits as a `u64`.
    #[inline]
    pub fn read_u64(&mut self, length: u32) -> Result<u64> {
        self.read(length)
    }

    /// Peek at up to 64 bits as a `u64`.
    #[inline]
    pub fn peek_u64(&mut self, length: u32) -> Result<u64> {
        self.peek(length)
    }
}

impl<S: ByteSource, W: Window> ReadBits for BitReader<S, W> {
    #[inline]
    fn peek_bits(&mut self, length: u32) -> Result<u32> {
        self.peek_u32(length)
    }

    #[inline]
    fn read_bits(&mut self, length: u32) -> Result<u32> {
        self.read_u32(length)
    }

    #[inline]
    fn skip_bits(&mut self, length: u64) -> Result<u64> {
        self.skip(length)
    }

    fn byte_align(&mut self) -> u32 {
        BitReader::byte_align(self)
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize> {
        BitReader::read_bytes(self, buf)
    }

    fn bit_position(&self) -> u64 {
        self.total_bits_read
    }
}
