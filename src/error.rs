//! Error types for binstruc operations.

use thiserror::Error;

/// Result type for binstruc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for binstruc operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Pack destination is smaller than the field being written.
    #[error("buffer too short: needed {needed} bytes, only {available} available")]
    BufferTooShort { needed: usize, available: usize },

    /// The input stream ended before a field was complete.
    #[error("short read: needed {needed} bytes")]
    ShortRead { needed: usize },

    /// A size reference does not resolve to an integer-bearing field.
    #[error("invalid reference on field {field}: {reason}")]
    InvalidReference { field: String, reason: String },

    /// The descriptor's type has no primitive codec.
    #[error("unsupported type {ty} on field {field}")]
    UnsupportedType { field: String, ty: String },

    /// The live value cannot be encoded as the descriptor's type.
    #[error("type mismatch on field {field}: expected {expected}")]
    TypeMismatch { field: String, expected: String },

    /// Invalid UTF-8 string.
    #[error("invalid UTF-8 string")]
    InvalidUtf8,

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Custom error message.
    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Creates a buffer-too-short error.
    pub fn buffer_too_short(needed: usize, available: usize) -> Self {
        Self::BufferTooShort { needed, available }
    }

    /// Creates a short-read error.
    pub fn short_read(needed: usize) -> Self {
        Self::ShortRead { needed }
    }

    /// Creates an invalid-reference error.
    pub fn invalid_reference(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidReference {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates an unsupported-type error.
    pub fn unsupported_type(field: impl Into<String>, ty: impl ToString) -> Self {
        Self::UnsupportedType {
            field: field.into(),
            ty: ty.to_string(),
        }
    }

    /// Creates a type-mismatch error.
    pub fn type_mismatch(field: impl Into<String>, expected: impl ToString) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected: expected.to_string(),
        }
    }

    /// Creates a custom error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Converts an IO failure from a fixed-size read into a short read when the
    /// stream simply ran out of bytes.
    pub(crate) fn from_read(err: std::io::Error, needed: usize) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            Self::short_read(needed)
        } else {
            Self::Io(err)
        }
    }
}
