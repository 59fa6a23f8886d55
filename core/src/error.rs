// core/src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SagaError {
  #[error("Step not found in saga '{saga}': {step_name}")]
  StepNotFound { saga: String, step_name: String },

  #[error("Action missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("Configuration error for step '{step_name}': {message}")]
  ConfigurationError { step_name: String, message: String },

  #[error("Type mismatch during context downcast (expected {expected_type}, step: '{step_name}')")]
  TypeMismatch { step_name: String, expected_type: String },

  #[error("Internal saga error: {0}")]
  Internal(String),
}

pub type SagaResult<T, E = SagaError> = std::result::Result<T, E>;
