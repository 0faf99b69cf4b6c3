//! Error types for OxiBin operations.
//!
//! Every failure in the toolkit is surfaced synchronously to the immediate
//! caller through [`OxiBinError`]. Nothing is retried internally.

use std::io;
use thiserror::Error;

/// The main error type for OxiBin operations.
#[derive(Debug, Error)]
pub enum OxiBinError {
    /// I/O error from an underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The byte source ran out before the requested bits were available.
    #[error("Insufficient data: requested {requested} bits, only {available} available")]
    InsufficientData {
        /// Number of bits requested.
        requested: u64,
        /// Number of bits that could be supplied.
        available: u64,
    },

    /// More bits were requested than the bit window can hold.
    #[error("Oversized request: {requested} bits exceeds window limit of {limit} bits")]
    OversizedRequest {
        /// Number of bits requested.
        requested: u32,
        /// Largest request the window can satisfy in its current state.
        limit: u32,
    },

    /// A code overlaps a code already registered in a code table.
    #[error("Duplicate code {code:#b} (length {length}) collides at table index {index}")]
    DuplicateCode {
        /// The offending code.
        code: u32,
        /// Length of the offending code in bits.
        length: u32,
        /// First table index that was already populated.
        index: usize,
    },

    /// A code has a length the table cannot represent.
    #[error("Invalid code length {length}: must be between 1 and {max}")]
    InvalidCode {
        /// Length of the rejected code in bits.
        length: u32,
        /// Maximum code length of the table.
        max: u32,
    },

    /// No table entry matched the bits at the current position.
    #[error("Code not found for window {window:#b} at bit position {bit_position}")]
    CodeNotFound {
        /// The peeked window that matched nothing.
        window: u32,
        /// Bit position of the reader when the lookup failed.
        bit_position: u64,
    },

    /// A ring buffer write would exceed capacity.
    #[error("Ring buffer overflow: writing {requested} items with {free} free of {capacity}")]
    Overflow {
        /// Number of items the write attempted.
        requested: usize,
        /// Free slots at the time of the write.
        free: usize,
        /// Total capacity of the buffer.
        capacity: usize,
    },

    /// A read, peek or seek would consume more than is buffered.
    #[error("Ring buffer underflow: requested {requested} items, {available} buffered")]
    Underflow {
        /// Number of items requested.
        requested: u64,
        /// Number of items buffered.
        available: u64,
    },

    /// Operation outside the supported contract.
    #[error("Unsupported operation: {operation}")]
    NotSupported {
        /// Description of the rejected operation.
        operation: String,
    },

    /// Invalid configuration value.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },
}

/// Result type alias for OxiBin operations.
pub type Result<T> = std::result::Result<T, OxiBinError>;

impl OxiBinError {
    /// Create an insufficient data error.
    pub fn insufficient_data(requested: u64, available: u64) -> Self {
        Self::InsufficientData {
            requested,
            available,
        }
    }

    /// Create an oversized request error.
    pub fn oversized_request(requested: u32, limit: u32) -> Self {
        Self::OversizedRequest { requested, limit }
    }

    /// Create a duplicate code error.
    pub fn duplicate_code(code: u32, length: u32, index: usize) -> Self {
        Self::DuplicateCode {
            code,
            length,
            index,
        }
    }

    /// Create an invalid code length error.
    pub fn invalid_code(length: u32, max: u32) -> Self {
        Self::InvalidCode { length, max }
    }

    /// Create a code not found error.
    pub fn code_not_found(window: u32, bit_position: u64) -> Self {
        Self::CodeNotFound {
            window,
            bit_position,
        }
    }

    /// Create an overflow error.
    pub fn overflow(requested: usize, free: usize, capacity: usize) -> Self {
        Self::Overflow {
            requested,
            free,
            capacity,
        }
    }

    /// Create an underflow error.
    pub fn underflow(requested: u64, available: u64) -> Self {
        Self::Underflow {
            requested,
            available,
        }
    }

    /// Create a not supported error.
    pub fn not_supported(operation: impl Into<String>) -> Self {
        Self::NotSupported {
            operation: operation.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

impl From<OxiBinError> for io::Error {
    fn from(err: OxiBinError) -> Self {
        let kind = match err {
            OxiBinError::Io(inner) => return inner,
            OxiBinError::InsufficientData { .. } | OxiBinError::Underflow { .. } => {
                io::ErrorKind::UnexpectedEof
            }
            OxiBinError::Overflow { .. } => io::ErrorKind::WriteZero,
            OxiBinError::NotSupported { .. } => io::ErrorKind::Unsupported,
            OxiBinError::OversizedRequest { .. }
            | OxiBinError::InvalidCode { .. }
            | OxiBinError::InvalidConfig { .. } => io::ErrorKind::InvalidInput,
            OxiBinError::DuplicateCode { .. } | OxiBinError::CodeNotFound { .. } => {
                io::ErrorKind::InvalidData
            }
        };
        io::Error::new(kind, err)
    }
}
