//! Error type for the benchmark harness and its compute subjects

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the harness and by the Fibonacci subject
#[derive(Error, Debug)]
pub enum HarnessError {
    /// Bad variant name, or a call that does not match the subject's signature
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A memory trace session is already active somewhere in this process
    #[error("Memory tracing unavailable: another trace session is already active")]
    TracingConflict,

    /// The requested index is above the largest that fits in a `u128`
    #[error("fibonacci({n}) does not fit in 128 bits")]
    Overflow { n: u64 },

    /// Existing output file was written with a different column layout
    #[error("Header mismatch in {}: expected `{expected}`, found `{found}`", path.display())]
    SchemaMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl HarnessError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_message_carries_detail() {
        let err = HarnessError::InvalidArgument("Unknown variant: random".to_string());
        assert_eq!(err.to_string(), "Invalid argument: Unknown variant: random");
    }

    #[test]
    fn test_schema_mismatch_message() {
        let err = HarnessError::SchemaMismatch {
            path: PathBuf::from("benchmarks/f_benchmarks.csv"),
            expected: "algorithm,n".to_string(),
            found: "algorithm,x".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("benchmarks/f_benchmarks.csv"));
        assert!(msg.contains("algorithm,x"));
    }
}
