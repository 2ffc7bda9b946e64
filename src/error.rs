use thiserror::Error;

/// Crate-wide error type. Errors are raised at the public call boundary of
/// the offending operation and propagate to the caller unmodified; nothing
/// is retried internally.
#[derive(Debug, Error)]
pub enum Error {
    /// Dimension mismatch in a matrix operation, or between a dataset and
    /// the network's declared input size / label count.
    #[error("shape mismatch: {0}")]
    Shape(String),

    /// Out-of-range matrix access.
    #[error("index ({row}, {col}) out of bounds for {rows}x{cols} matrix")]
    Index {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Invalid network configuration.
    #[error("invalid config: {0}")]
    Config(String),

    /// A training label that is not one of the network's output labels.
    #[error("unknown label: {0:?}")]
    UnknownLabel(String),

    /// Forward pass requested before the weights exist.
    #[error("network has not been initialized")]
    Uninitialized,

    /// Malformed dataset bytes (bad magic number, truncated body, ...).
    #[error("malformed dataset: {0}")]
    Format(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
