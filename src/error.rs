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

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Transition rejected: {0}")]
    TransitionRejected(String),

    #[error("Duplicate billing cycle {cycle} for subscription {subscription_id}")]
    DuplicateCycle { subscription_id: i64, cycle: i32 },

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

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
            AppError::InvalidSchedule(msg) => {
                log::warn!("Invalid schedule: {msg}");
                (
                    actix_web::http::StatusCode::BAD_REQUEST,
                    "INVALID_SCHEDULE",
                    msg.clone(),
                )
            }
            AppError::TransitionRejected(msg) => {
                log::warn!("Transition rejected: {msg}");
                (
                    actix_web::http::StatusCode::CONFLICT,
                    "TRANSITION_REJECTED",
                    msg.clone(),
                )
            }
            AppError::DuplicateCycle {
                subscription_id,
                cycle,
            } => {
                // Benign for the sweep; only reaches a client when an external
                // caller retries a charge that was already recorded.
                log::warn!("Duplicate cycle {cycle} for subscription {subscription_id}");
                (
                    actix_web::http::StatusCode::CONFLICT,
                    "DUPLICATE_CYCLE",
                    self.to_string(),
                )
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                (
                    actix_web::http::StatusCode::UNAUTHORIZED,
                    "AUTH_ERROR",
                    msg.clone(),
                )
            }
            AppError::NotFound(msg) => (
                actix_web::http::StatusCode::NOT_FOUND,
                "NOT_FOUND",
                msg.clone(),
            ),
            AppError::Forbidden => {
                log::warn!("Forbidden access");
                (
                    actix_web::http::StatusCode::FORBIDDEN,
                    "FORBIDDEN",
                    "Forbidden".to_string(),
                )
            }
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
