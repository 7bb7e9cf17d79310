use axum::http::StatusCode;
use thiserror::Error;

/// Everything that can go wrong between an identifier hitting the service
/// and a report leaving it. All variants propagate to the front-ends
/// verbatim; nothing here is retried.
#[derive(Debug, Error)]
pub enum StatusError {
    #[error("\"{0}\" does not appear to be a job or submission id")]
    InvalidIdentifier(String),

    #[error("Lens client was not initialized")]
    ClientNotInitialized,

    #[error("lens query failed: {0}")]
    Backend(String),

    #[error("job info missing from response")]
    JobNotFound,

    #[error("request cancelled")]
    Cancelled,
}

impl StatusError {
    /// HTTP status for the error body. Misconfiguration reads as 503 so
    /// probes can tell it apart from a lookup that blew up.
    pub fn http_status(&self) -> StatusCode {
        match self {
            StatusError::ClientNotInitialized => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
