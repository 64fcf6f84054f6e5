/// Module containing the error types for WavChunks
use thiserror::Error;

pub type WavChunksResult<T> = Result<T, WavChunksError>;

/// Error types for WavChunks
#[derive(Error, Debug)]
pub enum WavChunksError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Insufficient Bytes: {requested} > {available}")]
    Underflow { requested: usize, available: usize },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Unknown encoding: {0}")]
    UnsupportedEncoding(String),
    #[error("Invalid utf16 sequence at offset {0}")]
    InvalidUtf16(usize),
    #[error("Invalid WAV header, expected {expected} and got '{found}'")]
    InvalidHeader {
        expected: &'static str,
        found: String,
    },
    #[error("Failed to inflate chunk payload")]
    Decompression(#[from] std::io::Error),
    #[error("Failed to parse chunk payload")]
    Parse(#[from] serde_json::Error),
}

impl WavChunksError {
    pub(crate) fn underflow(requested: usize, available: usize) -> Self {
        WavChunksError::Underflow {
            requested,
            available,
        }
    }

    /// Returns true if the error was raised by reading past the end of the input.
    pub fn is_underflow(&self) -> bool {
        matches!(self, WavChunksError::Underflow { .. })
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn header_error_names_the_unexpected_value() {
        let err = WavChunksError::InvalidHeader {
            expected: "'WAVE'",
            found: "WAVF".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid WAV header, expected 'WAVE' and got 'WAVF'"
        );
    }

    #[test]
    fn underflow_is_detectable() {
        assert!(WavChunksError::underflow(4, 2).is_underflow());
        assert!(!WavChunksError::InvalidArgument("x".into()).is_underflow());
    }
}
