//! Errors raised by the container codec and the message envelope.

use crate::types::DataType;

/// Failures while building or walking containers, or while moving a
/// [`Msg`](crate::msg::Msg) to and from bytes.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("expected {expected:?}, found {found:?}")]
    UnexpectedType { expected: DataType, found: DataType },
    #[error("entry with a non-delete/non-clear action is missing its payload")]
    MissingPayload,
    #[error("delete/clear entry must not carry a payload")]
    UnexpectedPayload,
    #[error("invalid {kind} value: {value}")]
    InvalidValue { kind: &'static str, value: u64 },
    #[error("failed to encode message: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("failed to decode message: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}

impl CodecError {
    /// Shorthand for a type mismatch between what a caller asked for and what
    /// the container holds.
    #[must_use]
    pub fn mismatch(expected: DataType, found: DataType) -> Self {
        Self::UnexpectedType { expected, found }
    }
}
