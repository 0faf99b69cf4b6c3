//! Fixed-capacity ring buffer with independent read and write cursors.
//!
//! [`RingBuffer`] is a bounded FIFO over any `Copy` element type. Cursors
//! are 64-bit logical positions that only ever grow; the physical slot of a
//! position is chosen by an [`Addressing`] strategy:
//!
//! - [`Masked`]: capacity is `2^k`, slot is `position & (capacity - 1)`.
//! - [`Wrapping`]: capacity is the full range of a narrow counter (`u8` or
//!   `u16`), slot is the position truncated to that counter.
//!
//! Storage is allocated once and never compacted or resized. Copies that
//! cross the end of the physical array are split into two slice copies.
//!
//! # Policy
//!
//! - Overflow: a write that does not fit either fails, leaving the buffer
//!   untouched, or evicts the oldest elements when `allow_overflow` is set.
//! - Underflow: a peek/read/discard of more than is buffered either fails or
//!   clamps to the buffered length when `safe_underflow` is set.

use crate::config::RingBufferConfig;
use crate::error::{OxiBinError, Result};
use log::debug;
use std::fmt;
use std::iter::Chain;
use std::marker::PhantomData;
use std::ops::Range;
use std::slice;

/// Maps a logical cursor position to a physical slot.
pub trait Addressing: Clone + fmt::Debug {
    /// Number of physical slots.
    fn capacity(&self) -> usize;

    /// Physical slot of logical `position`.
    fn slot(&self, position: u64) -> usize;
}

/// Explicit bit-mask addressing over a power-of-two capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Masked {
    mask: u64,
}

impl Masked {
    /// Create mask addressing for `capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is not a power of 2 or is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than 0");
        assert!(
            capacity.is_power_of_two(),
            "Capacity must be a power of 2, got {}",
            capacity
        );
        Self {
            mask: capacity as u64 - 1,
        }
    }
}

impl Addressing for Masked {
    #[inline]
    fn capacity(&self) -> usize {
        self.mask as usize + 1
    }

    #[inline(always)]
    fn slot(&self, position: u64) -> usize {
        (position & self.mask) as usize
    }
}

mod private {
    pub trait Sealed {}

    impl Sealed for u8 {}
    impl Sealed for u16 {}
}

/// Unsigned counter whose natural wraparound defines a buffer capacity.
pub trait NarrowCounter: Copy + fmt::Debug + private::Sealed {
    /// Number of distinct counter values.
    const CAPACITY: usize;

    /// Truncate a logical position to the counter width.
    fn truncate(position: u64) -> usize;
}

impl NarrowCounter for u8 {
    const CAPACITY: usize = 1 << 8;

    #[inline(always)]
    fn truncate(position: u64) -> usize {
        usize::from(position as u8)
    }
}

impl NarrowCounter for u16 {
    const CAPACITY: usize = 1 << 16;

    #[inline(always)]
    fn truncate(position: u64) -> usize {
        usize::from(position as u16)
    }
}

/// Implicit addressing: the slot is the position truncated to `C`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wrapping<C> {
    _counter: PhantomData<C>,
}

impl<C> Wrapping<C> {
    /// Addressing over the full range of the counter `C`.
    pub const fn new() -> Self {
        Self {
            _counter: PhantomData,
        }
    }
}

impl<C> Default for Wrapping<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: NarrowCounter> Addressing for Wrapping<C> {
    #[inline]
    fn capacity(&self) -> usize {
        C::CAPACITY
    }

    #[inline(always)]
    fn slot(&self, position: u64) -> usize {
        C::truncate(position)
    }
}

/// Iterator over buffered elements in read order.
pub type Iter<'a, T> = Chain<slice::Iter<'a, T>, slice::Iter<'a, T>>;

/// A fixed-capacity FIFO ring buffer.
#[derive(Debug, Clone)]
pub struct RingBuffer<T, A = Masked> {
    /// Backing storage, `capacity` slots.
    storage: Box<[T]>,
    /// Logical read cursor.
    read: u64,
    /// Logical write cursor.
    write: u64,
    /// Evict oldest elements instead of failing a write.
    allow_overflow: bool,
    /// Clamp over-long reads instead of failing.
    safe_underflow: bool,
    /// Position to slot mapping.
    addressing: A,
}

impl<T: Copy + Default> RingBuffer<T, Masked> {
    /// Create a new ring buffer with the specified capacity.
    ///
    /// The buffer starts with the strict policy (no overflow, no safe
    /// underflow).
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is not a power of 2 or is zero.
    pub fn new(capacity: usize) -> Self {
        Self::with_addressing(Masked::new(capacity))
    }

    /// Create a ring buffer holding `2^size_bits` elements.
    pub fn with_size_bits(size_bits: u32) -> Result<Self> {
        Self::from_config(&RingBufferConfig::new(size_bits))
    }

    /// Create a ring buffer from a configuration.
    pub fn from_config(config: &RingBufferConfig) -> Result<Self> {
        config.validate()?;
        let mut ring = Self::new(config.capacity());
        ring.apply_policy(config);
        Ok(ring)
    }
}

impl<T: Copy + Default, C: NarrowCounter> RingBuffer<T, Wrapping<C>> {
    /// Create a ring buffer spanning the full range of the counter `C`.
    pub fn wrapping() -> Self {
        Self::with_addressing(Wrapping::new())
    }
}

impl<T: Copy + Default, C: NarrowCounter> Default for RingBuffer<T, Wrapping<C>> {
    fn default() -> Self {
        Self::wrapping()
    }
}

impl<T: Copy + Default, A: Addressing> RingBuffer<T, A> {
    fn with_addressing(addressing: A) -> Self {
        Self {
            storage: vec![T::default(); addressing.capacity()].into_boxed_slice(),
            read: 0,
            write: 0,
            allow_overflow: false,
            safe_underflow: false,
            addressing,
        }
    }
}

impl<T: Copy, A: Addressing> RingBuffer<T, A> {
    /// Get the capacity of the buffer.
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Get the number of buffered elements.
    pub fn len(&self) -> usize {
        (self.write - self.read) as usize
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.write == self.read
    }

    /// Check if the buffer is full.
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    /// Number of elements that can be written without overflowing.
    pub fn free_space(&self) -> usize {
        self.capacity() - self.len()
    }

    /// Logical read cursor (total elements consumed).
    pub fn read_position(&self) -> u64 {
        self.read
    }

    /// Logical write cursor (total elements written).
    pub fn write_position(&self) -> u64 {
        self.write
    }

    /// Whether writes past capacity evict the oldest elements.
    pub fn allow_overflow(&self) -> bool {
        self.allow_overflow
    }

    /// Set the overflow policy.
    pub fn set_allow_overflow(&mut self, allow: bool) {
        self.allow_overflow = allow;
    }

    /// Whether over-long reads clamp to the buffered length.
    pub fn safe_underflow(&self) -> bool {
        self.safe_underflow
    }

    /// Set the underflow policy.
    pub fn set_safe_underflow(&mut self, safe: bool) {
        self.safe_underflow = safe;
    }

    /// Take the overflow and underflow policy from a configuration.
    pub fn apply_policy(&mut self, config: &RingBufferConfig) {
        self.allow_overflow = config.allow_overflow;
        self.safe_underflow = config.safe_underflow;
    }

    /// Discard all buffered elements.
    pub fn clear(&mut self) {
        self.read = self.write;
    }

    /// Split `count` slots starting at logical `start` into the part before
    /// the physical end and the part wrapped to the front.
    #[inline]
    fn segments(&self, start: u64, count: usize) -> (Range<usize>, Range<usize>) {
        debug_assert!(count <= self.capacity());
        let begin = self.addressing.slot(start);
        let first = count.min(self.capacity() - begin);
        (begin..begin + first, 0..count - first)
    }

    /// Apply the underflow policy to a request of `requested` elements.
    fn clamp_request(&self, requested: u64) -> Result<u64> {
        let available = self.len() as u64;
        if requested <= available {
            return Ok(requested);
        }
        if !self.safe_underflow {
            return Err(OxiBinError::underflow(requested, available));
        }
        debug!(
            "ring buffer underflow: clamping request of {} to {}",
            requested, available
        );
        Ok(available)
    }

    /// Write all of `items`.
    ///
    /// If the items do not fit, the write fails with an overflow error and
    /// the buffer is left unmodified, unless overflow is allowed, in which
    /// case the oldest elements are discarded to make room. When more than
    /// `capacity` items are written under that policy only the last
    /// `capacity` of them are kept.
    pub fn write(&mut self, items: &[T]) -> Result<()> {
        let count = items.len();
        if count == 0 {
            return Ok(());
        }

        let capacity = self.capacity();
        let free = self.free_space();
        if count > free && !self.allow_overflow {
            return Err(OxiBinError::overflow(count, free, capacity));
        }

        let items = if count > capacity {
            self.write += (count - capacity) as u64;
            &items[count - capacity..]
        } else {
            items
        };

        let (first, second) = self.segments(self.write, items.len());
        let split = first.len();
        self.storage[first].copy_from_slice(&items[..split]);
        self.storage[second].copy_from_slice(&items[split..]);
        self.write += items.len() as u64;

        let oldest = self.write.saturating_sub(capacity as u64);
        if oldest > self.read {
            debug!(
                "ring buffer overflow: discarding {} oldest items",
                oldest - self.read
            );
            self.read = oldest;
        }

        Ok(())
    }

    /// Write a single element.
    pub fn push(&mut self, item: T) -> Result<()> {
        self.write(slice::from_ref(&item))
    }

    /// Copy buffered elements into `out` without consuming them.
    ///
    /// Returns the number of elements copied, which is `out.len()` unless
    /// safe underflow clamped the request.
    pub fn peek(&self, out: &mut [T]) -> Result<usize> {
        let count = self.clamp_request(out.len() as u64)? as usize;
        let (first, second) = self.segments(self.read, count);
        let split = first.len();
        out[..split].copy_from_slice(&self.storage[first]);
        out[split..count].copy_from_slice(&self.storage[second]);
        Ok(count)
    }

    /// Copy buffered elements into `out` and consume them.
    pub fn read(&mut self, out: &mut [T]) -> Result<usize> {
        let count = self.peek(out)?;
        self.read += count as u64;
        Ok(count)
    }

    /// Remove and return the oldest element.
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let item = self.storage[self.addressing.slot(self.read)];
        self.read += 1;
        Some(item)
    }

    /// Move the read cursor forward by `offset` elements without copying.
    ///
    /// Seeking past the write cursor is an underflow regardless of policy.
    pub fn seek(&mut self, offset: u64) -> Result<u64> {
        let available = self.len() as u64;
        if offset > available {
            return Err(OxiBinError::underflow(offset, available));
        }
        self.read += offset;
        Ok(offset)
    }

    /// Drop up to `count` elements from the front.
    ///
    /// Unlike [`seek`](Self::seek) this follows the underflow policy and
    /// returns the number of elements actually dropped.
    pub fn discard(&mut self, count: u64) -> Result<u64> {
        let count = self.clamp_request(count)?;
        self.read += count;
        Ok(count)
    }

    /// Get the element `index` positions after the read cursor.
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len() {
            return None;
        }
        Some(&self.storage[self.addressing.slot(self.read + index as u64)])
    }

    /// The buffered elements as two slices, in read order.
    ///
    /// The second slice is empty unless the contents wrap around the end of
    /// the physical storage.
    pub fn as_slices(&self) -> (&[T], &[T]) {
        let (first, second) = self.segments(self.read, self.len());
        (&self.storage[first], &self.storage[second])
    }

    /// The free slots as two mutable slices, in write order.
    ///
    /// Elements placed here become visible once
    /// [`advance_write`](Self::advance_write) commits them.
    pub fn free_slices_mut(&mut self) -> (&mut [T], &mut [T]) {
        let (first, second) = self.segments(self.write, self.free_space());
        let (head, tail) = self.storage.split_at_mut(first.start);
        (&mut tail[..first.len()], &mut head[second])
    }

    /// Commit `count` elements written through
    /// [`free_slices_mut`](Self::free_slices_mut).
    pub fn advance_write(&mut self, count: usize) -> Result<()> {
        let free = self.free_space();
        if count > free {
            return Err(OxiBinError::overflow(count, free, self.capacity()));
        }
        self.write += count as u64;
        Ok(())
    }

    /// Iterate over buffered elements in read order.
    pub fn iter(&self) -> Iter<'_, T> {
        let (first, second) = self.as_slices();
        first.iter().chain(second.iter())
    }
}

impl<T: Copy + PartialEq, A: Addressing> RingBuffer<T, A> {
    /// Offset from the read cursor of the first buffered `item`.
    ///
    /// The segment up to the physical end is searched before the wrapped
    /// segment.
    pub fn position_of(&self, item: &T) -> Option<usize> {
        let (first, second) = self.as_slices();
        first
            .iter()
            .position(|x| x == item)
            .or_else(|| second.iter().position(|x| x == item).map(|i| i + first.len()))
    }

    /// Whether `item` is currently buffered.
    pub fn contains(&self, item: &T) -> bool {
        self.position_of(item).is_some()
    }
}

impl<'a, T: Copy, A: Addressing> IntoIterator for &'a RingBuffer<T, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
