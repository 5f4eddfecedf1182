use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Unified error type for the relay
#[derive(Error, Debug)]
pub enum RelayError {
    // Storage errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database connection failed: {0}")]
    DatabaseConnection(String),

    // Storage protocol errors
    #[error("Unknown module: {module}")]
    UnknownModule { module: String },

    #[error("Unknown command tag: {tag}")]
    UnknownCommand { tag: String },

    // Chat errors
    #[error("Chat session is closed")]
    SessionClosed,

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;

impl RelayError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            RelayError::UnknownModule { .. }
            | RelayError::UnknownCommand { .. }
            | RelayError::InvalidConfig(_) => StatusCode::BAD_REQUEST,

            // 410 Gone
            RelayError::SessionClosed => StatusCode::GONE,

            // 503 Service Unavailable
            RelayError::Database(_) | RelayError::DatabaseConnection(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }

            // 500 Internal Server Error
            RelayError::Serialization(_) | RelayError::Io(_) | RelayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({
            "error": self.to_string(),
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_code_mapping() {
        assert_eq!(
            RelayError::UnknownCommand {
                tag: "frob".to_string()
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RelayError::InvalidConfig("bad".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(RelayError::SessionClosed.status_code(), StatusCode::GONE);
        assert_eq!(
            RelayError::DatabaseConnection("refused".to_string()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            RelayError::Internal("boom".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_client_server_helpers() {
        let unknown = RelayError::UnknownModule {
            module: "WebSocket".to_string(),
        };
        assert!(unknown.is_client_error());
        assert!(!unknown.is_server_error());

        let db = RelayError::DatabaseConnection("down".to_string());
        assert!(db.is_server_error());
        assert!(!db.is_client_error());
    }

    #[tokio::test]
    async fn test_error_into_response_carries_status() {
        let response = RelayError::DatabaseConnection("down".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
