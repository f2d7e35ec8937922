//! Unified error types for offline-worker.
//!
//! Every variant renders with a stable `CODE:` prefix so hosts can match on
//! the failure class without parsing free text.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error types for the offline worker.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid tool or host input.
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// A relative locator could not be resolved against the scope.
    #[error("INVALID_PATH: {0}")]
    InvalidPath(String),

    /// A cache write failed. Swallowed at the store boundary on the request path.
    #[error("STORE_WRITE: {0}")]
    StoreWrite(String),

    /// Transport-level fetch failure (DNS, connect, reset, body read).
    #[error("NETWORK_FETCH: {0}")]
    NetworkFetch(String),

    /// Response body exceeded the configured limit.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// Neither network nor cache can serve the entry point.
    #[error("OFFLINE_UNAVAILABLE: {0}")]
    OfflineUnavailable(String),

    /// Seeding the current generation failed.
    #[error("INSTALL_FAILED: {0}")]
    InstallFailed(String),

    /// Lifecycle transition not allowed from the current state.
    #[error("INVALID_STATE: {0}")]
    InvalidState(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),
}

impl Error {
    /// Whether this error came from the network rather than from storage or input.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::NetworkFetch(_) | Error::FetchTooLarge(_))
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::InvalidPath(msg) => (-32003, msg.clone()),
            Error::StoreWrite(msg) => (-32002, msg.clone()),
            Error::NetworkFetch(msg) => (-32008, msg.clone()),
            Error::FetchTooLarge(msg) => (-32007, msg.clone()),
            Error::OfflineUnavailable(msg) => (-32001, msg.clone()),
            Error::InstallFailed(msg) => (-32020, msg.clone()),
            Error::InvalidState(msg) => (-32021, msg.clone()),
            Error::Database(e) => (-32002, e.to_string()),
            Error::MigrationFailed(msg) => (-32002, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::OfflineUnavailable("https://example.com/index.html".to_string());
        assert!(err.to_string().contains("OFFLINE_UNAVAILABLE"));
        assert!(err.to_string().contains("index.html"));
    }

    #[test]
    fn test_error_to_mcp_error() {
        let err = Error::OfflineUnavailable("index".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32001);
    }

    #[test]
    fn test_is_network() {
        assert!(Error::NetworkFetch("reset".into()).is_network());
        assert!(Error::FetchTooLarge("big".into()).is_network());
        assert!(!Error::StoreWrite("disk".into()).is_network());
    }
}
