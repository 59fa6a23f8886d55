// core/src/saga/definition.rs

//! The `Saga<TData, E>` struct and its structural configuration.

use crate::core::handler::{Compensation, Handler};
use crate::core::step::{SkipCondition, StepDef};
use crate::error::SagaError;
use std::collections::HashMap;

/// An ordered list of named steps over a root data type `TData`.
///
/// `E` is the error type step actions and compensations return. It must be
/// constructible from `SagaError` so engine-level failures (a missing action, a bad
/// registry dispatch) surface in the caller's own error type.
pub struct Saga<TData, E>
where
  TData: 'static + Send + Sync,
  E: std::error::Error + From<SagaError> + Send + Sync + 'static,
{
  pub(crate) name: String,
  pub(crate) steps: Vec<StepDef<TData>>,
  pub(crate) actions: HashMap<String, Handler<TData, E>>,
  pub(crate) compensations: HashMap<String, Compensation<TData, E>>,
}

impl<TData, E> Saga<TData, E>
where
  TData: 'static + Send + Sync,
  E: std::error::Error + From<SagaError> + Send + Sync + 'static,
{
  /// Creates a saga from `(step_name, optional, skip_if)` definitions, in run order.
  pub fn new(name: impl Into<String>, step_defs: &[(&str, bool, Option<SkipCondition<TData>>)]) -> Self {
    let steps = step_defs
      .iter()
      .map(|(step_name, optional, skip_if)| StepDef {
        name: (*step_name).to_string(),
        optional: *optional,
        skip_if: skip_if.clone(),
      })
      .collect();

    Self {
      name: name.into(),
      steps,
      actions: HashMap::new(),
      compensations: HashMap::new(),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  pub fn has_compensation(&self, step_name: &str) -> bool {
    self.compensations.contains_key(step_name)
  }

  /// Panics when `step_name` is not part of the definition. Step names are fixed at
  /// setup time, so a miss here is a typo in the registering code.
  pub(crate) fn ensure_step_exists(&self, step_name: &str) {
    if !self.steps.iter().any(|s| s.name == step_name) {
      panic!(
        "{}",
        SagaError::StepNotFound {
          saga: self.name.clone(),
          step_name: step_name.to_string(),
        }
      );
    }
  }

  /// # Panics
  /// If the step does not exist.
  pub fn set_optional(&mut self, step_name: &str, optional: bool) {
    self.ensure_step_exists(step_name);
    if let Some(step) = self.steps.iter_mut().find(|s| s.name == step_name) {
      step.optional = optional;
    }
  }

  /// # Panics
  /// If the step does not exist.
  pub fn set_skip_condition(&mut self, step_name: &str, skip_if: Option<SkipCondition<TData>>) {
    self.ensure_step_exists(step_name);
    if let Some(step) = self.steps.iter_mut().find(|s| s.name == step_name) {
      step.skip_if = skip_if;
    }
  }
}
