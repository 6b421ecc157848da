//! Error types for run-length decoding and wire parsing.

use thiserror::Error;

/// Errors produced when runs are malformed.
///
/// Encoding never fails; only externally supplied runs can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// A run handed to the decoder has a count below one.
    #[error("malformed run at index {index}: count {count} must be at least 1")]
    MalformedRun { index: usize, count: i64 },

    /// A wire run whose count is not a positive 32-bit integer.
    #[error("run count {0} must be between 1 and 4294967295")]
    InvalidCount(i64),

    /// A wire run whose value does not fit a quantized sample.
    #[error("run value {0} does not fit in a 32-bit sample")]
    ValueOutOfRange(i64),

    /// Two neighbouring runs share a value and should have been merged.
    #[error("run at index {index} repeats value {value} of the run before it")]
    UnmergedRuns { index: usize, value: i32 },
}
