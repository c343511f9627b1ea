/// Error types shared by the course roadmap crates.
///
/// These errors represent failures in infrastructure components (embedding model) that
/// any binary in the workspace can hit. Application-specific errors are defined in each
/// binary crate and wrap `CommonError` via `#[from]`.

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("embedding error: {0}")]
    Embedding(String),
}
