use thiserror::Error;

/// Errors surfaced to the UI layer. None of them reach the reducer: a failed
/// call means nothing is dispatched.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Missing or malformed form input, caught before any network call.
    #[error("{0}")]
    Validation(String),

    #[error("Backend request failed: {0}")]
    Backend(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not signed in")]
    Unauthorized,

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else if e.is_connect() {
            Self::Backend(format!("cannot connect to server: {}", e))
        } else {
            Self::Backend(e.to_string())
        }
    }
}
