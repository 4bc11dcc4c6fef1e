use thiserror::Error;

/// An error type indicating a network
/// was evaluated on malformed input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// The input vector's length differs
    /// from the network's input count.
    #[error("network expects {expected} inputs, got {found}")]
    DimensionMismatch { expected: usize, found: usize },
}
