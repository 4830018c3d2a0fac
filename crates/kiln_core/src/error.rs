use std::fmt;
use thiserror::Error;

/// Status codes reported across the embedding boundary.
///
/// The string form of each code is exactly its identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Success,
    InvalidArgument,
    OutOfMemory,
    NotFound,
    AlreadyExists,
    InvalidState,
    Timeout,
    NotImplemented,
    SystemError,
    ValidationFailed,
    RollbackRequired,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Success => "Success",
            ErrorCode::InvalidArgument => "InvalidArgument",
            ErrorCode::OutOfMemory => "OutOfMemory",
            ErrorCode::NotFound => "NotFound",
            ErrorCode::AlreadyExists => "AlreadyExists",
            ErrorCode::InvalidState => "InvalidState",
            ErrorCode::Timeout => "Timeout",
            ErrorCode::NotImplemented => "NotImplemented",
            ErrorCode::SystemError => "SystemError",
            ErrorCode::ValidationFailed => "ValidationFailed",
            ErrorCode::RollbackRequired => "RollbackRequired",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error carrying a status code and a human-readable message.
#[derive(Debug, Clone, Error)]
#[error("{code}: {message}")]
pub struct CoreError {
    pub code: ErrorCode,
    pub message: String,
}

impl CoreError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_string_forms() {
        let expected = [
            (ErrorCode::Success, "Success"),
            (ErrorCode::InvalidArgument, "InvalidArgument"),
            (ErrorCode::OutOfMemory, "OutOfMemory"),
            (ErrorCode::NotFound, "NotFound"),
            (ErrorCode::AlreadyExists, "AlreadyExists"),
            (ErrorCode::InvalidState, "InvalidState"),
            (ErrorCode::Timeout, "Timeout"),
            (ErrorCode::NotImplemented, "NotImplemented"),
            (ErrorCode::SystemError, "SystemError"),
            (ErrorCode::ValidationFailed, "ValidationFailed"),
            (ErrorCode::RollbackRequired, "RollbackRequired"),
        ];
        for (code, text) in expected {
            assert_eq!(code.to_string(), text);
        }
    }

    #[test]
    fn test_error_display_includes_code() {
        let err = CoreError::new(ErrorCode::NotFound, "no such system");
        assert_eq!(err.to_string(), "NotFound: no such system");
    }
}
