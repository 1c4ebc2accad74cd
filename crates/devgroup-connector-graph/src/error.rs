//! Error types for the Graph connector.

use devgroup_core::DirectoryError;
use thiserror::Error;

/// Result type alias using `GraphError`.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors that can occur when talking to Microsoft Graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// `OAuth2` token acquisition failed.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Microsoft Graph answered with an error status.
    #[error("Graph API error ({status}): {code} - {message}")]
    GraphApi {
        status: u16,
        code: String,
        message: String,
        inner_error: Option<String>,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// A record in a successful response lacked a required field.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<GraphError> for DirectoryError {
    fn from(error: GraphError) -> Self {
        match error {
            GraphError::Config(msg) => DirectoryError::InvalidRequest(msg),
            GraphError::Auth(msg) => DirectoryError::Authentication(msg),
            GraphError::GraphApi {
                status: 401,
                code,
                message,
                ..
            } => DirectoryError::Authentication(format!("{code} - {message}")),
            GraphError::GraphApi {
                status: 403,
                code,
                message,
                ..
            } => DirectoryError::PermissionDenied(format!("{code} - {message}")),
            GraphError::GraphApi {
                status,
                code,
                message,
                ..
            } => DirectoryError::service(status, code, message),
            GraphError::Http(e) => DirectoryError::Connection(e.to_string()),
            GraphError::Json(e) => DirectoryError::InvalidResponse(e.to_string()),
            GraphError::InvalidResponse(msg) => DirectoryError::InvalidResponse(msg),
            GraphError::Url(e) => DirectoryError::InvalidRequest(e.to_string()),
        }
    }
}
