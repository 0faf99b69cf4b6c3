//! # OxiBin Huffman
//!
//! Canonical prefix-code decoding on top of the OxiBin bit readers.
//!
//! A [`CanonicalDecoder`] maps every `max_code_length`-bit window to the
//! code it starts with, so decoding a symbol is one peek, one table lookup
//! and one skip. Tables can be filled code by code or derived from
//! per-symbol code lengths the way DEFLATE-style formats transmit them.
//!
//! ## Example
//!
//! ```rust
//! use oxibin_core::BitReader32;
//! use oxibin_huffman::CanonicalDecoder;
//!
//! let mut decoder = CanonicalDecoder::new(2).unwrap();
//! decoder.add("0", 'A').unwrap();
//! decoder.add("10", 'B').unwrap();
//! decoder.add("11", 'C').unwrap();
//!
//! let data = [0b0101_1000u8];
//! let mut reader = BitReader32::new(&data[..]);
//! assert_eq!(decoder.parse(&mut reader).unwrap(), 'A');
//! assert_eq!(decoder.parse(&mut reader).unwrap(), 'B');
//! assert_eq!(decoder.parse(&mut reader).unwrap(), 'C');
//! assert_eq!(reader.bit_position(), 5);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod decoder;

// Re-exports
pub use decoder::{CanonicalDecoder, MAX_CODE_LENGTH};
