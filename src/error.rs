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

    #[error("Invalid session: {0}")]
    InvalidSession(String),

    #[error("Visitor is {distance_m:.0}m away, geofence radius is {max_distance_m:.0}m")]
    GeofenceViolation { distance_m: f64, max_distance_m: f64 },

    #[error("Restaurant is closed to participation right now")]
    ServiceClosed,

    #[error("Already played this service window today")]
    AlreadyPlayed,

    #[error("Claim not found")]
    ClaimNotFound,

    #[error("Claim already redeemed")]
    ClaimAlreadyRedeemed,

    #[error("Claim expired")]
    ClaimExpired,

    #[error("Pool allocation conflict, retry the draw")]
    AllocationConflict,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        use actix_web::http::StatusCode;

        let (status_code, error_code, message) = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::InvalidSession(msg) => {
                log::warn!("Invalid session: {msg}");
                (StatusCode::FORBIDDEN, "INVALID_SESSION", msg.clone())
            }
            AppError::GeofenceViolation { .. } => (
                StatusCode::FORBIDDEN,
                "GEOFENCE_VIOLATION",
                self.to_string(),
            ),
            AppError::ServiceClosed => (StatusCode::FORBIDDEN, "SERVICE_CLOSED", self.to_string()),
            AppError::AlreadyPlayed => (StatusCode::CONFLICT, "ALREADY_PLAYED", self.to_string()),
            AppError::ClaimNotFound => {
                (StatusCode::NOT_FOUND, "CLAIM_NOT_FOUND", self.to_string())
            }
            AppError::ClaimAlreadyRedeemed => (
                StatusCode::CONFLICT,
                "CLAIM_ALREADY_REDEEMED",
                self.to_string(),
            ),
            AppError::ClaimExpired => (StatusCode::GONE, "CLAIM_EXPIRED", self.to_string()),
            AppError::AllocationConflict => {
                // Surfaced only after the internal draw retries are exhausted.
                log::warn!("Allocation conflict surfaced after retries");
                (
                    StatusCode::CONFLICT,
                    "ALLOCATION_CONFLICT",
                    "Please try again".to_string(),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Database error".to_string(),
                )
            }
            _ => {
                log::error!("Internal error: {self}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
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
