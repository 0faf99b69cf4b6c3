//! Direct-lookup decoding table for canonical prefix codes.
//!
//! The table has `2^max_code_length` slots. A code of length `n` occupies
//! every slot whose top `n` index bits equal the code, so a single
//! `max_code_length`-bit peek resolves any symbol.

use log::{debug, trace};
use oxibin_core::ReadBits;
use oxibin_core::error::{OxiBinError, Result};

/// Longest supported code length in bits.
pub const MAX_CODE_LENGTH: u32 = 24;

/// A populated table slot.
#[derive(Debug, Clone)]
struct TableEntry<T> {
    value: T,
    length: u8,
}

/// Prefix-code decoder backed by a direct lookup table.
///
/// Codes are registered with [`add`](Self::add) or
/// [`add_code`](Self::add_code), or built in one go from per-symbol code
/// lengths with [`from_lengths`](CanonicalDecoder::from_lengths).
#[derive(Debug, Clone)]
pub struct CanonicalDecoder<T> {
    table: Vec<Option<TableEntry<T>>>,
    max_code_length: u32,
    codes: usize,
}

impl<T: Clone> CanonicalDecoder<T> {
    /// Create an empty decoder for codes of at most `max_code_length` bits.
    pub fn new(max_code_length: u32) -> Result<Self> {
        if !(1..=MAX_CODE_LENGTH).contains(&max_code_length) {
            return Err(OxiBinError::invalid_config(format!(
                "max code length {max_code_length} outside 1..={MAX_CODE_LENGTH}"
            )));
        }
        Ok(Self {
            table: vec![None; 1 << max_code_length],
            max_code_length,
            codes: 0,
        })
    }

    /// Register a code written as a string of `'0'` and `'1'` characters.
    ///
    /// Any other character is ignored, so `"10 11"` and `"1011"` are the
    /// same code.
    pub fn add(&mut self, pattern: &str, value: T) -> Result<()> {
        let bits = pattern.chars().filter(|c| matches!(c, '0' | '1'));
        let length = bits.clone().count() as u32;
        if length == 0 || length > self.max_code_length {
            return Err(OxiBinError::invalid_code(length, self.max_code_length));
        }
        let code = bits.fold(0u32, |acc, c| (acc << 1) | u32::from(c == '1'));
        self.add_code(code, length, value)
    }

    /// Register `code` of `code_length` bits.
    ///
    /// Fails without touching the table if any slot the code would cover is
    /// already taken.
    pub fn add_code(&mut self, code: u32, code_length: u32, value: T) -> Result<()> {
        if code_length == 0 || code_length > self.max_code_length {
            return Err(OxiBinError::invalid_code(
                code_length,
                self.max_code_length,
            ));
        }
        if code >> code_length != 0 {
            return Err(OxiBinError::invalid_config(format!(
                "code {code:#b} does not fit in {code_length} bits"
            )));
        }

        let prefix_bits = self.max_code_length - code_length;
        let start = (code as usize) << prefix_bits;
        let end = start + (1usize << prefix_bits);

        if let Some(offset) = self.table[start..end].iter().position(Option::is_some) {
            return Err(OxiBinError::duplicate_code(
                code,
                code_length,
                start + offset,
            ));
        }

        let entry = TableEntry {
            value,
            length: code_length as u8,
        };
        for slot in &mut self.table[start..end] {
            *slot = Some(entry.clone());
        }
        self.codes += 1;
        trace!(
            "registered code {:0width$b} at slots {}..{}",
            code,
            start,
            end,
            width = code_length as usize
        );
        Ok(())
    }

    /// Decode one symbol from `reader`.
    ///
    /// Peeks `max_code_length` bits, so at least that many must remain in
    /// the stream even when the final code is shorter.
    pub fn parse<R: ReadBits + ?Sized>(&self, reader: &mut R) -> Result<T> {
        let window = reader.peek_bits(self.max_code_length)?;
        match &self.table[window as usize] {
            Some(entry) => {
                reader.skip_bits(u64::from(entry.length))?;
                Ok(entry.value.clone())
            }
            None => Err(OxiBinError::code_not_found(window, reader.bit_position())),
        }
    }

    /// Whether every possible window resolves to a code.
    pub fn is_complete(&self) -> bool {
        let empty = self.table.iter().filter(|slot| slot.is_none()).count();
        debug!(
            "{} codes cover {} of {} slots",
            self.codes,
            self.table.len() - empty,
            self.table.len()
        );
        empty == 0
    }

    /// Number of registered codes.
    pub fn len(&self) -> usize {
        self.codes
    }

    /// Whether no code has been registered.
    pub fn is_empty(&self) -> bool {
        self.codes == 0
    }

    /// Width of the lookup window in bits.
    pub fn max_code_length(&self) -> u32 {
        self.max_code_length
    }
}

impl CanonicalDecoder<usize> {
    /// Build a decoder from per-symbol code lengths.
    ///
    /// Codes are assigned canonically (shorter codes first, ties broken by
    /// symbol index) and each decodes to its symbol index. A length of zero
    /// means the symbol is unused.
    pub fn from_lengths(lengths: &[u8]) -> Result<Self> {
        let max_length = lengths.iter().copied().max().unwrap_or(0);
        if max_length == 0 {
            return Err(OxiBinError::invalid_config(
                "no symbol has a non-zero code length",
            ));
        }
        let mut decoder = Self::new(u32::from(max_length))?;
        let max_length = max_length as usize;

        // Count codes of each length
        let mut bl_count = vec![0u32; max_length + 1];
        for &len in lengths {
            if len > 0 {
                bl_count[len as usize] += 1;
            }
        }

        // Calculate starting codes
        let mut next_code = vec![0u32; max_length + 1];
        let mut code = 0u32;
        for bits in 1..=max_length {
            code = (code + bl_count[bits - 1]) << 1;
            next_code[bits] = code;
        }

        for (symbol, &len) in lengths.iter().enumerate() {
            if len > 0 {
                let len = len as usize;
                decoder.add_code(next_code[len], len as u32, symbol)?;
                next_code[len] += 1;
            }
        }

        Ok(decoder)
    }
}
