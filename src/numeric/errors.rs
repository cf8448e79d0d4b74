//! Numeric error types.

/// Errors raised by numeric operations.
///
/// Division by zero is deliberately absent: it produces [`Number::Dne`](super::Number::Dne)
/// instead of an error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error)]
pub enum NumericError {
    /// Result does not fit the backing representation
    #[error("arithmetic overflow")]
    Overflow,

    /// Input text is not a number literal
    #[error("invalid number literal {0:?}")]
    InvalidLiteral(String),

    /// Exponent has a fractional part the operation cannot honour
    #[error("cannot raise {base} to the non-integer power {exponent}")]
    NonIntegerPower { base: String, exponent: String },
}

/// Result type alias for numeric operations
pub type NumericResult<T> = Result<T, NumericError>;
