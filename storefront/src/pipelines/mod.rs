// storefront/src/pipelines/mod.rs

//! Defines and registers the sagas behind checkout and payment verification.

use crate::errors::AppError;
use saga::SagaRegistry;

pub mod checkout_pipeline;
pub mod contexts;
pub mod verification_pipeline;

/// Registers every saga with the registry. Called once at startup.
pub fn register_all_pipelines(sagas: &SagaRegistry<AppError>) {
  tracing::info!("Registering sagas...");
  checkout_pipeline::register_checkout_pipeline(sagas);
  verification_pipeline::register_verification_pipeline(sagas);
  tracing::info!("All application sagas registered.");
}
