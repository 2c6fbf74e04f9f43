// wireflow/src/workflow/definition.rs

//! Contains `WorkflowBuilder` and the built `Workflow`.
//!
//! A builder collects the workflow's declared inputs, stages and outputs.
//! `build()` wires them and produces an immutable `Workflow` whose `status`
//! holds every wiring diagnostic.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::{event, Level};

use crate::config::WiringConfig;
use crate::core::outcome::Outcome;
use crate::core::stage::StageInstance;
use crate::core::ui::{TracingUi, UiHandle};
use crate::core::value::Value;
use crate::core::variable::{VarRef, Variable};
use crate::wiring::Wiring;

static UNNAMED_WORKFLOWS: AtomicUsize = AtomicUsize::new(0);

/// Fluent, value-style builder: every method consumes and returns the builder.
#[derive(Clone)]
pub struct WorkflowBuilder {
  name: String,
  inputs: Vec<Variable>,
  outputs: Vec<Variable>,
  stages: Vec<StageInstance>,
  ui: Arc<dyn UiHandle>,
  config: WiringConfig,
}

impl WorkflowBuilder {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      inputs: Vec::new(),
      outputs: Vec::new(),
      stages: Vec::new(),
      ui: Arc::new(TracingUi),
      config: WiringConfig::default(),
    }
  }

  /// A builder with a generated name.
  pub fn unnamed() -> Self {
    let n = UNNAMED_WORKFLOWS.fetch_add(1, Ordering::Relaxed);
    Self::new(format!("Unnamed Workflow {n:06}"))
  }

  /// Declares workflow inputs. Later declarations take priority over earlier
  /// ones with the same name.
  pub fn given<I, V>(mut self, inputs: I) -> Self
  where
    I: IntoIterator<Item = V>,
    V: Into<VarRef>,
  {
    let fresh: Vec<Variable> = inputs.into_iter().map(|v| v.into().into_variable()).collect();
    self.inputs = unique_by_name(fresh.into_iter().chain(std::mem::take(&mut self.inputs)));
    self
  }

  /// Declares an input that falls back to `default`.
  pub fn given_default(self, name: impl Into<String>, default: impl Into<Value>) -> Self {
    self.given([Variable::unbound(name).with_default(default)])
  }

  /// Appends stages in execution order.
  pub fn from_stages(mut self, stages: impl IntoIterator<Item = StageInstance>) -> Self {
    self.stages.extend(stages);
    self
  }

  /// Declares workflow outputs. Like `given`, new entries come first and
  /// take priority over earlier ones with the same name.
  pub fn output_to<I, V>(mut self, outputs: I) -> Self
  where
    I: IntoIterator<Item = V>,
    V: Into<VarRef>,
  {
    let fresh: Vec<Variable> = outputs.into_iter().map(|v| v.into().into_variable()).collect();
    self.outputs = unique_by_name(fresh.into_iter().chain(std::mem::take(&mut self.outputs)));
    self
  }

  pub fn with_ui(mut self, ui: Arc<dyn UiHandle>) -> Self {
    self.ui = ui;
    self
  }

  pub fn with_config(mut self, config: WiringConfig) -> Self {
    self.config = config;
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn inputs(&self) -> &[Variable] {
    &self.inputs
  }

  pub fn outputs(&self) -> &[Variable] {
    &self.outputs
  }

  pub fn stages(&self) -> &[StageInstance] {
    &self.stages
  }

  /// Wires the workflow.
  pub fn build(self) -> Workflow {
    let wiring = Wiring::wire_with(&self.inputs, &self.outputs, &self.stages, &self.config);
    for (dex, stage) in self.stages.iter().enumerate() {
      if !stage.depends_on().is_empty() || !stage.provided().is_empty() || stage.is_always_run() {
        event!(
          Level::TRACE,
          stage_index = dex,
          stage_name = stage.name(),
          depends = ?stage.depends_on(),
          provides = ?stage.provided(),
          always_run = stage.is_always_run(),
          "Stage scheduling hints recorded."
        );
      }
    }
    let status = wiring.status().clone();
    event!(
      Level::DEBUG,
      workflow = %self.name,
      severity = ?status.severity(),
      "Workflow built."
    );

    Workflow {
      name: self.name,
      inputs: self.inputs,
      outputs: self.outputs,
      stages: self.stages,
      ui: self.ui,
      wiring,
      status,
    }
  }
}

impl fmt::Debug for WorkflowBuilder {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("WorkflowBuilder")
      .field("name", &self.name)
      .field("inputs", &self.inputs)
      .field("outputs", &self.outputs)
      .field("num_stages", &self.stages.len())
      .field("config", &self.config)
      .finish()
  }
}

// Keeps the first variable for each name.
fn unique_by_name(vars: impl IntoIterator<Item = Variable>) -> Vec<Variable> {
  let mut out: Vec<Variable> = Vec::new();
  for var in vars {
    if !out.iter().any(|seen| seen.name() == var.name()) {
      out.push(var);
    }
  }
  out
}

/// A wired, runnable workflow.
#[derive(Clone)]
pub struct Workflow {
  pub(crate) name: String,
  pub(crate) inputs: Vec<Variable>,
  pub(crate) outputs: Vec<Variable>,
  pub(crate) stages: Vec<StageInstance>,
  pub(crate) ui: Arc<dyn UiHandle>,
  pub(crate) wiring: Wiring,
  pub(crate) status: Outcome<()>,
}

impl Workflow {
  pub fn builder(name: impl Into<String>) -> WorkflowBuilder {
    WorkflowBuilder::new(name)
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// Wiring diagnostics gathered at build time.
  pub fn status(&self) -> &Outcome<()> {
    &self.status
  }

  pub fn is_runnable(&self) -> bool {
    !self.status.is_fail()
  }

  pub fn inputs(&self) -> &[Variable] {
    &self.inputs
  }

  pub fn outputs(&self) -> &[Variable] {
    &self.outputs
  }

  pub fn stages(&self) -> &[StageInstance] {
    &self.stages
  }

  pub fn wiring(&self) -> &Wiring {
    &self.wiring
  }

  pub fn ui(&self) -> &Arc<dyn UiHandle> {
    &self.ui
  }

  /// Same workflow reporting to a different UI.
  pub fn with_ui(&self, ui: Arc<dyn UiHandle>) -> Self {
    Self { ui, ..self.clone() }
  }
}

impl fmt::Debug for Workflow {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Workflow")
      .field("name", &self.name)
      .field("inputs", &self.inputs)
      .field("outputs", &self.outputs)
      .field("stages", &self.stages)
      .field("status", &self.status.severity())
      .finish()
  }
}
