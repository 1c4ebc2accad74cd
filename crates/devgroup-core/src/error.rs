//! Errors raised by directory collaborators.

use thiserror::Error;

/// Result type alias using `DirectoryError`.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Errors a [`DirectoryClient`](crate::DirectoryClient) can report.
///
/// An empty result is never one of these: queries that legitimately match
/// nothing return an empty collection or `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// The session is missing or was rejected by the service.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The session is valid but lacks the required permission.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The service could not be reached.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The service rejected or failed the call.
    #[error("Directory service error ({status}): {code} - {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
    },

    /// The service answered with something that could not be understood.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The request was refused before being sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl DirectoryError {
    /// Builds a `Service` error.
    pub fn service(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            status,
            code: code.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_display_keeps_origin_detail() {
        let error = DirectoryError::service(
            400,
            "Request_BadRequest",
            "One or more added object references already exist",
        );
        let display = error.to_string();
        assert!(display.contains("400"));
        assert!(display.contains("Request_BadRequest"));
        assert!(display.contains("already exist"));
    }
}
