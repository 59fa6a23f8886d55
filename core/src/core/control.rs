// core/src/core/control.rs

//! Signals for controlling saga flow and the outcome of a saga run.

/// Signal returned by a step action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepControl {
  /// The step completed; move on to the next one.
  Continue,
  /// Stop the saga here. Completed steps are kept as they are (no compensation).
  Halt,
}

/// Outcome of a saga run that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SagaOutcome {
  /// Every non-skipped step ran to completion.
  Completed,
  /// A step action returned `StepControl::Halt`.
  Halted { step: String },
}

impl SagaOutcome {
  pub fn is_completed(&self) -> bool {
    matches!(self, SagaOutcome::Completed)
  }
}
