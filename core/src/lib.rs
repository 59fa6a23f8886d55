// core/src/lib.rs

//! Saga: an async, type-safe step engine with compensating actions.
//!
//! A `Saga<TData, Err>` is an ordered list of named steps operating on a shared
//! `ContextData<TData>`. Each step may carry:
//!  - an action, which returns `StepControl::Continue` or `StepControl::Halt`;
//!  - a compensation, run in reverse order when a later non-optional step fails;
//!  - a skip condition evaluated against the context before the step runs.
//!
//! Sagas are usually registered once at startup in a `SagaRegistry<E>`, keyed by the
//! context data type, and executed per request with `registry.run(ctx_data)`.

pub mod core;
pub mod error;
pub mod registry;
pub mod saga;

pub use crate::core::context_data::ContextData;
pub use crate::core::control::{SagaOutcome, StepControl};
pub use crate::core::handler::{Compensation, Handler};
pub use crate::core::step::{SkipCondition, StepDef};

pub use crate::saga::definition::Saga;

pub use crate::error::{SagaError, SagaResult};

pub use crate::registry::SagaRegistry;
