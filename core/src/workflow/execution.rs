// wireflow/src/workflow/execution.rs

//! Contains `Workflow::run()` and `Workflow::execute()`, which drive the stages
//! in order over successive wiring snapshots.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tracing::{event, info_span, instrument, Instrument, Level};

use crate::core::outcome::Outcome;
use crate::core::stage::StageInstance;
use crate::core::ui::UiMessage;
use crate::core::variable::Variable;
use crate::core::variable_set::VariableSet;
use crate::error::Diagnostic;
use crate::workflow::definition::Workflow;
use crate::wiring::Wiring;

/// Where an execution stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
  #[default]
  NotRun,
  /// Index of the stage being run (or that failed).
  Running(usize),
  Succeeded,
  Failed,
}

/// The record of one workflow run.
#[derive(Debug, Clone)]
pub struct Execution {
  state: RunState,
  failed_at: Option<usize>,
  outcome: Outcome<VariableSet>,
  snapshots: Vec<Wiring>,
}

impl Execution {
  pub fn state(&self) -> RunState {
    self.state
  }

  /// Index of the stage the run stopped at, if it stopped inside a stage.
  pub fn failed_at(&self) -> Option<usize> {
    self.failed_at
  }

  pub fn outcome(&self) -> &Outcome<VariableSet> {
    &self.outcome
  }

  pub fn into_outcome(self) -> Outcome<VariableSet> {
    self.outcome
  }

  /// Wiring after inputs were bound, then after each completed stage.
  pub fn snapshots(&self) -> &[Wiring] {
    &self.snapshots
  }
}

impl Workflow {
  /// Runs the workflow and returns its outputs.
  pub async fn run(&self, inputs: &[Variable]) -> Outcome<VariableSet> {
    self.execute(inputs).await.into_outcome()
  }

  /// Runs the workflow and keeps the full execution record.
  ///
  /// Inputs are bound by name, then each stage in order gets its inputs
  /// resolved, runs, and has its outputs bound into a new wiring snapshot.
  /// Diagnostics are merged keep-first into a running status; the first
  /// failure is shown on the UI and ends the run. Warnings never stop it.
  #[instrument(
    name = "Workflow::execute",
    skip_all,
    fields(
      workflow = %self.name,
      num_stages = self.stages.len(),
      num_inputs = inputs.len(),
    )
  )]
  pub async fn execute(&self, inputs: &[Variable]) -> Execution {
    let mut run = RunRecord::default();

    if !self.is_runnable() {
      event!(Level::ERROR, "Workflow is not runnable.");
      let malformed = Outcome::fail([Diagnostic::MalformedWorkflow {
        workflow: self.name.clone(),
        reason: Box::new(self.status.clone()),
      }]);
      return self.fail(run, malformed).await;
    }

    if self.status.is_warn() {
      self.show(UiMessage::Report(self.status.clone())).await;
    }

    let (status, wiring) = self.wiring.bind_inputs(inputs).split();
    run.status = run.status.keep_first(status);
    let Some(mut wiring) = wiring else {
      return self.fail(run, Outcome::okay(())).await;
    };
    run.snapshots.push(wiring.clone());

    for (dex, stage) in self.stages.iter().enumerate() {
      run.state = RunState::Running(dex);
      event!(Level::INFO, stage_index = dex, stage_name = stage.name(), "Running stage.");

      let (status, stage_inputs) = wiring.get_stage_inputs(dex).split();
      run.status = run.status.keep_first(status);
      let Some(stage_inputs) = stage_inputs else {
        event!(Level::ERROR, stage_index = dex, "Couldn't resolve stage inputs.");
        return self.fail(run, Outcome::okay(())).await;
      };

      let span = info_span!("workflow_stage", stage_index = dex, stage_name = stage.name());
      let (status, outputs) = invoke(stage, stage_inputs, self).instrument(span).await.split();
      run.status = run.status.keep_first(status);
      let Some(outputs) = outputs else {
        event!(Level::ERROR, stage_index = dex, stage_name = stage.name(), "Stage failed.");
        return self.fail(run, Outcome::okay(())).await;
      };

      let (status, next) = wiring.bind_stage(dex, &outputs).split();
      run.status = run.status.keep_first(status);
      let Some(next) = next else {
        return self.fail(run, Outcome::okay(())).await;
      };
      wiring = next;
      run.snapshots.push(wiring.clone());
      event!(Level::DEBUG, stage_index = dex, num_outputs = outputs.len(), "Stage outputs bound.");
    }

    let outcome = run.status.keep_last(wiring.get_outputs());
    if outcome.is_fail() {
      run.state = RunState::Failed;
      run.status = Outcome::okay(());
      return self.fail(run, outcome.discard()).await;
    }

    event!(Level::DEBUG, severity = ?outcome.severity(), "Workflow execution completed.");
    Execution {
      state: RunState::Succeeded,
      failed_at: None,
      outcome,
      snapshots: run.snapshots,
    }
  }

  /// Merges `extra` into the run status, reports it, and closes the record.
  async fn fail(&self, run: RunRecord, extra: Outcome<()>) -> Execution {
    let status = run.status.keep_first(extra);
    self.show(UiMessage::Report(status.clone())).await;
    let failed_at = match run.state {
      RunState::Running(dex) => Some(dex),
      _ => None,
    };
    Execution {
      state: RunState::Failed,
      failed_at,
      outcome: status.map(|_| VariableSet::empty()),
      snapshots: run.snapshots,
    }
  }

  async fn show(&self, message: UiMessage) {
    let shown = self.ui.display(message).await;
    if shown.is_fail() {
      event!(Level::WARN, result = %shown, "UI failed to display a message.");
    }
  }
}

#[derive(Debug, Default)]
struct RunRecord {
  state: RunState,
  status: Outcome<()>,
  snapshots: Vec<Wiring>,
}

// Runs one stage, turning a panic into a `StagePanicked` failure.
async fn invoke(stage: &StageInstance, inputs: VariableSet, workflow: &Workflow) -> Outcome<Vec<Variable>> {
  let fut = stage.stage().run(inputs, workflow.ui.as_ref());
  match AssertUnwindSafe(fut).catch_unwind().await {
    Ok(outcome) => outcome,
    Err(payload) => {
      let message = panic_message(payload.as_ref());
      event!(Level::ERROR, stage_name = stage.name(), panic = %message, "Stage panicked.");
      Outcome::fail([Diagnostic::StagePanicked {
        stage: stage.name().to_string(),
        message,
      }])
    }
  }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
  if let Some(msg) = payload.downcast_ref::<&str>() {
    (*msg).to_string()
  } else if let Some(msg) = payload.downcast_ref::<String>() {
    msg.clone()
  } else {
    "non-string panic payload".to_string()
  }
}
