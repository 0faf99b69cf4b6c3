//! # OxiBin Core
//!
//! Core components for the OxiBin binary decoding toolkit.
//!
//! This crate provides the substrate that binary-format parsers and codecs
//! are built on:
//!
//! - [`source`]: Byte sources (bounded reads and forward seeks)
//! - [`bitstream`]: MSB-first bit readers with 32- and 64-bit windows
//! - [`ringbuffer`]: Generic fixed-capacity FIFO with pluggable addressing
//! - [`stream`]: Byte ring buffer streams (scan, `std::io` integration)
//! - [`config`]: Ring buffer configuration
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: Decoders                                            │
//! │     Canonical (prefix) code tables (oxibin-huffman)    │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Bit Window                                          │
//! │     BitReader32 / BitReader64, ReadBits                 │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Byte Staging (this crate)                           │
//! │     ByteSource, RingBufferStream, ShortRingBufferStream │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxibin_core::bitstream::BitReader64;
//! use oxibin_core::stream::RingBufferStream;
//!
//! // A producer stages bytes...
//! let mut stream = RingBufferStream::new(64);
//! stream.write(&[0b1010_0000, 0xFF]).unwrap();
//!
//! // ...and a bit reader drains them.
//! let mut reader = BitReader64::new(&mut stream);
//! assert_eq!(reader.read(3).unwrap(), 0b101);
//! assert_eq!(reader.byte_align(), 5);
//! assert_eq!(reader.read(8).unwrap(), 0xFF);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

#[cfg(feature = "async-io")]
pub mod async_io;
pub mod bitstream;
pub mod config;
pub mod error;
pub mod ringbuffer;
pub mod source;
pub mod stream;

// Re-exports for convenience
pub use bitstream::{BitReader, BitReader32, BitReader64, ReadBits, Window};
pub use config::RingBufferConfig;
pub use error::{OxiBinError, Result};
pub use ringbuffer::{Addressing, Masked, NarrowCounter, RingBuffer, Wrapping};
pub use source::{ByteSource, IoSource, SeekSource};
pub use stream::{RingBufferStream, ShortRingBufferStream};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::{BitReader32, BitReader64, ReadBits};
    pub use crate::config::RingBufferConfig;
    pub use crate::error::{OxiBinError, Result};
    pub use crate::ringbuffer::RingBuffer;
    pub use crate::source::ByteSource;
    pub use crate::stream::{RingBufferStream, ShortRingBufferStream};
}
