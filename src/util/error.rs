//! Error types for the bridge.
//!
//! Channel-local variants ([`Error::CardinalityMismatch`], [`Error::ValueType`])
//! are recovered by the caller: the channel is dropped and translation goes on.
//! The remaining variants abort the current read or write pass only.

use thiserror::Error;

use crate::core::PrimKind;

/// Main error type for bridge operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Referenced prim is absent from the stage
    #[error("Prim not found: {0}")]
    NotFound(String),

    /// Prim exists but its kind is not accepted by the requested view
    #[error("Type mismatch at {path}: expected {expected}, got {actual}")]
    TypeMismatch {
        path: String,
        expected: String,
        actual: PrimKind,
    },

    /// Fetched array does not match the point count
    #[error("Wrong number of values for {channel} in {path}: expected {expected}, got {actual}")]
    CardinalityMismatch {
        path: String,
        channel: String,
        expected: usize,
        actual: usize,
    },

    /// A channel the pass cannot do without is absent
    #[error("Missing mandatory channel {channel} on {path}")]
    MissingMandatoryChannel { path: String, channel: String },

    /// Bridge used without a resolved prim reference
    #[error("Bridge has no valid prim reference")]
    InvalidReference,

    /// Write attempted through a read-mode reference
    #[error("Prim reference is read-only: {0}")]
    ReadOnly(String),

    /// Malformed prim path
    #[error("Invalid prim path: {0:?}")]
    InvalidPath(String),

    /// Value does not fit the attribute's declared type
    #[error("Value type mismatch for {name}: expected {expected}, got {actual}")]
    ValueType {
        name: String,
        expected: String,
        actual: String,
    },

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create a value type error.
    pub fn value_type(
        name: impl Into<String>,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        Self::ValueType {
            name: name.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// True for errors that only invalidate one channel, not the whole pass.
    pub fn is_channel_local(&self) -> bool {
        matches!(self, Self::CardinalityMismatch { .. } | Self::ValueType { .. })
    }
}

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, Error>;
