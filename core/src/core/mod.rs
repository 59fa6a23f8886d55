pub mod context_data;
pub mod control;
pub mod handler;
pub mod step;

pub use context_data::ContextData;
pub use control::{SagaOutcome, StepControl};
pub use handler::{Compensation, Handler};
pub use step::StepDef;
