use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Failures reading or writing the durable ledger.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid ledger document: {0}")]
    Document(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StorageError {
    pub fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> StorageError {
        let path = path.into();
        move |source| StorageError::Io { path, source }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("User already exists")]
    DuplicateUser,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),

    #[error("Upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
struct UpstreamErrorResponse {
    error: &'static str,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::DuplicateUser | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::StorageUnavailable(_) | AppError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    // Internal failures are logged here and never described to the client
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::StorageUnavailable(e) => {
                log::error!("ledger storage failure: {}", e);
                HttpResponse::InternalServerError().json(MessageResponse {
                    message: "Internal server error".to_string(),
                })
            }
            AppError::Upstream(e) => {
                log::error!("market data fetch failed: {}", e);
                HttpResponse::InternalServerError().json(UpstreamErrorResponse {
                    error: "Failed to fetch data",
                })
            }
            other => HttpResponse::build(self.status_code()).json(MessageResponse {
                message: other.to_string(),
            }),
        }
    }
}
