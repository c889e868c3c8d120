use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),

    // 同一账户上的并发写入竞争失败, 调用方应重读后重试
    #[error("Concurrent modification, please retry")]
    ConcurrentModification,

    #[error("Drawing not found: {0}")]
    DrawingNotFound(i64),

    #[error("Drawing not open: {0}")]
    DrawingNotOpen(String),

    #[error("Drawing not ready: {0}")]
    DrawingNotReady(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Fulfillment is terminal: {0}")]
    FulfillmentTerminal(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status_code, error_code, message) = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                (
                    actix_web::http::StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    msg.clone(),
                )
            }
            AppError::NotFound(msg) => (
                actix_web::http::StatusCode::NOT_FOUND,
                "NOT_FOUND",
                msg.clone(),
            ),
            AppError::InsufficientBalance(msg) => {
                log::warn!("Insufficient balance: {msg}");
                (
                    actix_web::http::StatusCode::BAD_REQUEST,
                    "INSUFFICIENT_BALANCE",
                    msg.clone(),
                )
            }
            AppError::ConcurrentModification => (
                actix_web::http::StatusCode::CONFLICT,
                "CONCURRENT_MODIFICATION",
                "Concurrent modification, please retry".to_string(),
            ),
            AppError::DrawingNotFound(id) => (
                actix_web::http::StatusCode::NOT_FOUND,
                "DRAWING_NOT_FOUND",
                format!("Drawing not found: {id}"),
            ),
            AppError::DrawingNotOpen(msg) => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "DRAWING_NOT_OPEN",
                msg.clone(),
            ),
            AppError::DrawingNotReady(msg) => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "DRAWING_NOT_READY",
                msg.clone(),
            ),
            AppError::InvalidTransition(msg) => {
                log::warn!("Invalid fulfillment transition: {msg}");
                (
                    actix_web::http::StatusCode::BAD_REQUEST,
                    "INVALID_TRANSITION",
                    msg.clone(),
                )
            }
            AppError::FulfillmentTerminal(msg) => (
                actix_web::http::StatusCode::CONFLICT,
                "FULFILLMENT_TERMINAL",
                msg.clone(),
            ),
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Database error".to_string(),
                )
            }
            _ => {
                log::error!("Internal error: {self}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        HttpResponse::build(status_code).json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message
            }
        }))
    }
}
