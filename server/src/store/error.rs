use thiserror::Error;

/// Infrastructure faults from the persistence backend, distinct from the
/// user-facing taxonomy: callers log these and surface a generic internal
/// failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backend could not be reached or the operation did not complete
    #[error("storage backend unavailable: {reason}")]
    Unavailable { reason: String },
}
