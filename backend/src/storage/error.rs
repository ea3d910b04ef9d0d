use thiserror::Error;

/// Failures a storage backend reports explicitly.
///
/// Backends wrap I/O and driver failures in `Unavailable` and undecodable
/// rows in `Malformed`. The domain layer never propagates these; it logs them
/// and falls back to an absent value or the last known collection.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Malformed stored value: {0}")]
    Malformed(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

impl From<csv::Error> for StoreError {
    fn from(e: csv::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}
