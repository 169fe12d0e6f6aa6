use std::io;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Terminal failure of a single streaming request.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The requested name could address something outside the media root.
    #[error("Invalid filename")]
    InvalidName,

    #[error("File not found")]
    NotFound,

    #[error("Range header required")]
    MissingHeader,

    #[error("Invalid Range header")]
    MalformedHeader,

    #[error("Requested range not satisfiable")]
    InvalidRange,

    /// Stat or read failure after every validation step passed.
    #[error("Error reading file")]
    Io(#[from] io::Error),
}

impl StreamError {
    pub fn status(&self) -> StatusCode {
        match self {
            StreamError::InvalidName
            | StreamError::MissingHeader
            | StreamError::MalformedHeader
            | StreamError::InvalidRange => StatusCode::BAD_REQUEST,
            StreamError::NotFound => StatusCode::NOT_FOUND,
            StreamError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the client caused this error.
    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }
}

impl IntoResponse for StreamError {
    fn into_response(self) -> Response {
        if let StreamError::Io(e) = &self {
            tracing::error!("stream request failed: {}", e);
        }
        (self.status(), self.to_string()).into_response()
    }
}
