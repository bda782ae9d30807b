use thiserror::Error;

/// Errors raised while talking to the remote asset store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The request never produced an HTTP response (DNS, TLS, connection reset, ...).
    #[error("image host unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("image host rejected upload ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The store answered 2xx but the body did not match the upload contract.
    #[error("unexpected response from image host: {0}")]
    InvalidResponse(String),
}
