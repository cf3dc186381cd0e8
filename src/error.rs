use thiserror::Error;

/// Failure raised by a [`GridStore`](crate::store::GridStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("cell table lock poisoned")]
    Poisoned,
}

/// Result of every call the client makes against the grid backend.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// The request never got an answer, or the answer could not be read.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The server answered but the persistence operation failed.
    #[error("store failure: {0}")]
    Store(String),
    #[error("cell ({row}, {column}) is outside the grid")]
    OutOfBounds { row: i32, column: i32 },
    /// The activation counter is already at `i32::MAX`.
    #[error("activation order exhausted")]
    OrderExhausted,
}

impl From<StoreError> for GridError {
    fn from(err: StoreError) -> Self {
        GridError::Store(err.to_string())
    }
}
