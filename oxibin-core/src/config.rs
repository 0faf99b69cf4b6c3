//! Ring buffer configuration.

use crate::error::{OxiBinError, Result};

/// Largest supported capacity exponent.
pub const MAX_SIZE_BITS: u32 = 31;

/// Ring buffer configuration parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RingBufferConfig {
    /// Capacity exponent: the buffer holds `2^size_bits` elements.
    pub size_bits: u32,
    /// Whether a write past capacity evicts the oldest elements instead of
    /// failing.
    pub allow_overflow: bool,
    /// Whether reads past the buffered length clamp instead of failing.
    pub safe_underflow: bool,
}

impl RingBufferConfig {
    /// Default configuration.
    ///
    /// - 1 MiB capacity (`2^20`)
    /// - Overflow is an error
    /// - Underflow is an error
    pub const DEFAULT: Self = Self {
        size_bits: 20,
        allow_overflow: false,
        safe_underflow: false,
    };

    /// Strict policy: every overflow and underflow is reported.
    pub const STRICT: Self = Self::DEFAULT;

    /// Lossy policy for live feeds.
    ///
    /// - Writes evict the oldest data when full
    /// - Reads return whatever is buffered
    pub const LOSSY: Self = Self {
        size_bits: 20,
        allow_overflow: true,
        safe_underflow: true,
    };

    /// Create a strict configuration with the given capacity exponent.
    pub fn new(size_bits: u32) -> Self {
        Self {
            size_bits,
            ..Self::DEFAULT
        }
    }

    /// Set the capacity exponent.
    pub fn with_size_bits(mut self, size_bits: u32) -> Self {
        self.size_bits = size_bits;
        self
    }

    /// Set the overflow policy.
    pub fn with_allow_overflow(mut self, allow: bool) -> Self {
        self.allow_overflow = allow;
        self
    }

    /// Set the underflow policy.
    pub fn with_safe_underflow(mut self, safe: bool) -> Self {
        self.safe_underflow = safe;
        self
    }

    /// Capacity in elements.
    pub fn capacity(&self) -> usize {
        1usize << self.size_bits
    }

    /// Check that the configuration describes a buffer that can exist.
    pub fn validate(&self) -> Result<()> {
        if self.size_bits == 0 || self.size_bits > MAX_SIZE_BITS {
            return Err(OxiBinError::invalid_config(format!(
                "size_bits must be between 1 and {}, got {}",
                MAX_SIZE_BITS, self.size_bits
            )));
        }
        if self.size_bits >= usize::BITS {
            return Err(OxiBinError::invalid_config(format!(
                "size_bits {} exceeds the platform word size",
                self.size_bits
            )));
        }
        Ok(())
    }
}

impl Default for RingBufferConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
