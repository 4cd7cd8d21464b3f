use thiserror::Error;

/// Shared lightweight error type for core primitive operations.
///
/// `PartialEq` only: `hex::FromHexError` is not `Eq`.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// Byte slice does not have the length required by a fixed-size type.
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    /// Hex text could not be parsed.
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}
