// storefront/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use saga::SagaError;
use serde_json::json;
use thiserror::Error;

use crate::gateway::GatewayError;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  /// The gateway answered, but reports the transaction as not successful.
  #[error("Payment verification failed with status '{status}'")]
  VerificationRejected { status: String },

  #[error("Payment Gateway Error: {0}")]
  Gateway(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Saga Workflow Error: {source}")]
  Workflow {
    #[from]
    source: SagaError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<GatewayError> for AppError {
  fn from(err: GatewayError) -> Self {
    match err {
      GatewayError::Configuration(m) => AppError::Config(m),
      other => AppError::Gateway(other.to_string()),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) | AppError::VerificationRejected { .. } => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Forbidden(_) => StatusCode::FORBIDDEN,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Gateway(_)
      | AppError::Config(_)
      | AppError::Sqlx(_)
      | AppError::Workflow { .. }
      | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    tracing::error!(application_error = %self, "Responding with error");
    let body = match self {
      AppError::Validation(m) | AppError::Auth(m) | AppError::Forbidden(m) | AppError::NotFound(m) => {
        json!({"success": false, "message": m})
      }
      AppError::VerificationRejected { status } => {
        json!({"success": false, "message": "Payment verification failed", "status": status})
      }
      AppError::Gateway(m) => json!({"success": false, "message": "Payment gateway error", "error": m}),
      AppError::Config(m) => json!({"success": false, "message": "Configuration issue", "error": m}),
      AppError::Sqlx(_) => json!({"success": false, "message": "Database operation failed"}),
      AppError::Workflow { source } => {
        tracing::error!(saga_error_source = ?source, "Workflow error details");
        json!({"success": false, "message": "Workflow processing error", "error": source.to_string()})
      }
      AppError::Internal(m) => json!({"success": false, "message": "An internal error occurred", "error": m}),
    };
    HttpResponse::build(self.status_code()).json(body)
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
