use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(anyhow::Error::new(err))
    }
}

/// A write rejected by a unique index. Insert failures surface this as a
/// write error, findAndModify failures as a command error.
pub fn is_duplicate_key_error(err: &mongodb::error::Error) -> bool {
    match &*err.kind {
        mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(write_err)) => {
            write_err.code == 11000
        }
        mongodb::error::ErrorKind::Command(command_err) => command_err.code == 11000,
        _ => false,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // The public API uses two error shapes: client errors (400/404) carry
        // a bare { message }, server errors carry { success: false, message }.
        #[derive(Serialize)]
        struct ClientError {
            message: String,
        }

        #[derive(Serialize)]
        struct ServerError {
            success: bool,
            message: String,
        }

        match self {
            AppError::ValidationError(message) | AppError::Conflict(message) => {
                (StatusCode::BAD_REQUEST, Json(ClientError { message })).into_response()
            }
            AppError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(ClientError { message })).into_response()
            }
            other => {
                tracing::error!(error = %other, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ServerError {
                        success: false,
                        message: other.to_string(),
                    }),
                )
                    .into_response()
            }
        }
    }
}
