//! Error types for conversion operations

use thiserror::Error;

/// Errors that can occur inside the conversion pipeline
///
/// These never cross the public conversion boundary as `Err`: the converter
/// records them in [`crate::converter::Conversion::FailedOpen`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// HTML parsing failed
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Input is structurally unacceptable (e.g. nested too deeply)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Style configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ConversionError {
    /// Numeric error code, stable for logs and stored review flags
    pub fn code(&self) -> u32 {
        match self {
            ConversionError::ParseError(_) => 1,
            ConversionError::InvalidInput(_) => 5,
            ConversionError::Config(_) => 6,
            ConversionError::InternalError(_) => 99,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            ConversionError::ParseError(String::new()),
            ConversionError::InvalidInput(String::new()),
            ConversionError::Config(String::new()),
            ConversionError::InternalError(String::new()),
        ];
        let mut codes: Vec<u32> = errors.iter().map(ConversionError::code).collect();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_display_includes_message() {
        let err = ConversionError::InvalidInput("nesting depth 1001".to_string());
        assert_eq!(err.to_string(), "Invalid input: nesting depth 1001");
    }
}
