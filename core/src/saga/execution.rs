// core/src/saga/execution.rs

//! `Saga::run()`: executes steps in order and compensates on failure.

use crate::core::context_data::ContextData;
use crate::core::control::{SagaOutcome, StepControl};
use crate::error::SagaError;
use crate::saga::definition::Saga;
use tracing::{event, instrument, span, Instrument, Level};

impl<TData, E> Saga<TData, E>
where
  TData: 'static + Send + Sync,
  E: std::error::Error + From<SagaError> + Send + Sync + 'static,
{
  /// Runs the saga against `ctx_data`.
  ///
  /// On a non-optional step failure, the compensations of every completed step run in
  /// reverse order before the step's error is returned.
  #[instrument(
    name = "Saga::run",
    skip_all,
    fields(saga = %self.name, num_steps = self.steps.len()),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<SagaOutcome, E> {
    event!(Level::DEBUG, "Saga execution starting.");
    let mut completed: Vec<&str> = Vec::with_capacity(self.steps.len());

    for (step_index, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();

      if let Some(skip_cond) = &step_def.skip_if {
        if skip_cond(ctx_data.clone()) {
          event!(Level::INFO, %step_name, "Step skipped due to 'skip_if' condition.");
          continue;
        }
      }

      let Some(action) = self.actions.get(step_name) else {
        if step_def.optional {
          event!(Level::DEBUG, %step_name, "Optional step has no action, skipping.");
          continue;
        }
        event!(Level::ERROR, %step_name, "Non-optional step has no action.");
        self.compensate(&completed, &ctx_data).await;
        return Err(E::from(SagaError::HandlerMissing {
          step_name: step_def.name.clone(),
        }));
      };

      let step_span = span!(
        Level::INFO,
        "saga_step",
        step_name = step_name,
        step_index = step_index,
        optional = step_def.optional
      );
      match action(ctx_data.clone()).instrument(step_span).await {
        Ok(StepControl::Continue) => completed.push(step_name),
        Ok(StepControl::Halt) => {
          event!(Level::INFO, %step_name, "Saga halted by step.");
          return Ok(SagaOutcome::Halted {
            step: step_def.name.clone(),
          });
        }
        Err(e) if step_def.optional => {
          event!(Level::WARN, %step_name, error = %e, "Optional step failed; continuing.");
        }
        Err(e) => {
          event!(Level::ERROR, %step_name, error = %e, "Step failed; compensating completed steps.");
          self.compensate(&completed, &ctx_data).await;
          return Err(e);
        }
      }
    }

    event!(Level::DEBUG, "Saga execution completed.");
    Ok(SagaOutcome::Completed)
  }

  async fn compensate(&self, completed: &[&str], ctx_data: &ContextData<TData>) {
    for step_name in completed.iter().rev() {
      let Some(compensation) = self.compensations.get(*step_name) else {
        continue;
      };
      let comp_span = span!(Level::INFO, "saga_compensation", step_name = *step_name);
      match compensation(ctx_data.clone()).instrument(comp_span).await {
        Ok(()) => event!(Level::INFO, step_name = *step_name, "Compensation applied."),
        Err(e) => event!(Level::ERROR, step_name = *step_name, error = %e, "Compensation failed."),
      }
    }
  }
}
