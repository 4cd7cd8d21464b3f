use thiserror::Error;

/// Errors returned by value/payload codec operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Input ended before a fixed-size field could be read.
    #[error("truncated input: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },
    /// A length prefix points past the end of the input or over the size cap.
    #[error("length prefix {declared} exceeds limit {limit}")]
    LengthOverflow { declared: usize, limit: usize },
    /// Bytes left over after a complete record was decoded.
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),
    /// Flag byte carries unknown bits or an impossible combination.
    #[error("invalid flags: {0:#04x}")]
    InvalidFlags(u8),
    /// A field handed to the encoder is larger than any decoder accepts.
    #[error("field of {len} bytes exceeds limit {limit}")]
    FieldTooLarge { len: usize, limit: usize },
    /// Record-level consistency failure.
    #[error("invalid value: {0}")]
    InvalidValue(&'static str),
    /// Payload-level consistency failure.
    #[error("invalid payload: {0}")]
    InvalidPayload(&'static str),
    /// Operation is not defined for the value's current state.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),
}

impl CodecError {
    /// Whether this failure came from untrusted wire input (as opposed to local misuse).
    pub fn is_malformed_input(&self) -> bool {
        !matches!(
            self,
            CodecError::InvalidState(_) | CodecError::FieldTooLarge { .. }
        )
    }
}
