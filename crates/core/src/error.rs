#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

/// Failure reported by a session or user store.
///
/// "Not found" is never a `StoreError`: lookups return `Ok(None)` and deletes
/// of missing rows succeed.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("Store conflict: {0}")]
    Conflict(String),

    /// The backend could not be reached or failed the operation.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
