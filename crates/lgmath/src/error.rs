use thiserror::Error;

/// Errors raised while building group elements from caller data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LieError {
    /// A dynamically sized vector does not have the length the group requires.
    #[error("expected a vector of dimension {expected}, got {got}")]
    DimensionMismatch {
        /// The required length.
        expected: usize,
        /// The length that was provided.
        got: usize,
    },
}
