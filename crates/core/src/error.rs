//! Error types for variable parsing

/// Error produced when a variable word cannot be parsed as its declared type
///
/// Typed wrappers never surface this from `get_value()`; they log it and
/// fall back to the previous value. Use `try_get_value()` to observe it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Word is not a recognized boolean spelling
    #[error("Invalid bool value: '{0}'")]
    InvalidBool(String),

    /// Word is not a valid integer
    #[error("Invalid integer value: '{0}'")]
    InvalidInt(String),

    /// Word is a valid integer but does not fit the target type
    #[error("Integer value out of range: '{0}'")]
    IntOutOfRange(String),

    /// Word is not a valid floating-point number
    #[error("Invalid floating-point value: '{0}'")]
    InvalidDouble(String),

    /// Word does not name a member of the enum type
    #[error("Invalid value '{value}' for {type_name}: {reason}")]
    InvalidEnum {
        value: String,
        type_name: &'static str,
        reason: String,
    },
}

/// Result type for parse operations
pub type ParseResult<T> = Result<T, ParseError>;
