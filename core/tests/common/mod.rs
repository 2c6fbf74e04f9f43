// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use async_trait::async_trait;
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use tracing::Level;
use wireflow::{Diagnostic, Outcome, Stage, UiHandle, VarType, Variable, VariableSet};

// --- Common Stages ---

/// Produces `x = value` (71 unless told otherwise).
#[derive(Debug, Clone)]
pub struct MakeBase {
  pub value: i64,
}

impl Default for MakeBase {
  fn default() -> Self {
    Self { value: 71 }
  }
}

#[async_trait]
impl Stage for MakeBase {
  fn input_vars(&self) -> Vec<Variable> {
    Vec::new()
  }

  fn output_vars(&self) -> Vec<Variable> {
    vec![Variable::unbound("x").with_type(VarType::Int).with_desc("the base")]
  }

  async fn run(&self, _inputs: VariableSet, _ui: &dyn UiHandle) -> Outcome<Vec<Variable>> {
    STAGE_EXEC_COUNTER.fetch_add(1, Ordering::SeqCst);
    tracing::debug!(target: "test_stages", value = self.value, "MakeBase executed");
    Outcome::okay(vec![self.output_vars()[0].bind(self.value)])
  }
}

/// Computes `result = x ^ pow`.
#[derive(Debug, Clone, Default)]
pub struct RaiseToPower;

impl RaiseToPower {
  pub fn x() -> Variable {
    Variable::unbound("x")
      .with_type(VarType::Int)
      .with_desc("the base")
      .with_default(0)
  }

  pub fn pow() -> Variable {
    Variable::unbound("pow")
      .with_type(VarType::Int)
      .with_desc("the exponent")
      .with_default(1)
  }
}

#[async_trait]
impl Stage for RaiseToPower {
  fn input_vars(&self) -> Vec<Variable> {
    vec![Self::x(), Self::pow()]
  }

  fn output_vars(&self) -> Vec<Variable> {
    vec![Variable::unbound("result").with_type(VarType::Int)]
  }

  async fn run(&self, inputs: VariableSet, _ui: &dyn UiHandle) -> Outcome<Vec<Variable>> {
    STAGE_EXEC_COUNTER.fetch_add(1, Ordering::SeqCst);
    let checked = inputs.check_all();
    if checked.is_fail() {
      return checked.map(|_| Vec::new());
    }
    let computed = inputs
      .get_int("x")
      .and_then(|x| inputs.get_int("pow").map(|pow| x.pow(pow as u32)));
    match computed {
      Ok(result) => checked.map(|_| vec![Variable::unbound("result").with_type(VarType::Int).bind(result)]),
      Err(err) => Outcome::fail([err]),
    }
  }
}

/// Emits a fixed value under the local output name `value`.
#[derive(Debug, Clone)]
pub struct Emit {
  pub value: i64,
}

#[async_trait]
impl Stage for Emit {
  fn name(&self) -> &str {
    "Emit"
  }

  fn input_vars(&self) -> Vec<Variable> {
    Vec::new()
  }

  fn output_vars(&self) -> Vec<Variable> {
    vec![Variable::unbound("value")]
  }

  async fn run(&self, _inputs: VariableSet, _ui: &dyn UiHandle) -> Outcome<Vec<Variable>> {
    STAGE_EXEC_COUNTER.fetch_add(1, Ordering::SeqCst);
    Outcome::okay(vec![Variable::bound("value", self.value)])
  }
}

/// Delegates to an inner stage; keeps the default `name`.
#[derive(Debug, Clone, Default)]
pub struct Wrapped<S>(pub S);

#[async_trait]
impl<S: Stage> Stage for Wrapped<S> {
  fn input_vars(&self) -> Vec<Variable> {
    self.0.input_vars()
  }

  fn output_vars(&self) -> Vec<Variable> {
    self.0.output_vars()
  }

  async fn run(&self, inputs: VariableSet, ui: &dyn UiHandle) -> Outcome<Vec<Variable>> {
    self.0.run(inputs, ui).await
  }
}

/// Copies its `value` input to its `value` output. Fails if `value` is missing.
#[derive(Debug, Clone, Default)]
pub struct Echo;

#[async_trait]
impl Stage for Echo {
  fn input_vars(&self) -> Vec<Variable> {
    vec![Variable::unbound("value")]
  }

  fn output_vars(&self) -> Vec<Variable> {
    vec![Variable::unbound("value")]
  }

  async fn run(&self, inputs: VariableSet, _ui: &dyn UiHandle) -> Outcome<Vec<Variable>> {
    STAGE_EXEC_COUNTER.fetch_add(1, Ordering::SeqCst);
    ECHO_EXEC_COUNTER.fetch_add(1, Ordering::SeqCst);
    let checked = inputs.check(["value"]);
    if checked.is_fail() {
      return checked.map(|_| Vec::new());
    }
    let outputs = inputs.get_var("value").cloned().into_iter().collect();
    checked.map(|_| outputs)
  }
}

/// Always fails with a `StageFailure`.
#[derive(Debug, Clone)]
pub struct FailingStage {
  pub message: &'static str,
}

#[async_trait]
impl Stage for FailingStage {
  fn input_vars(&self) -> Vec<Variable> {
    Vec::new()
  }

  fn output_vars(&self) -> Vec<Variable> {
    vec![Variable::unbound("never")]
  }

  async fn run(&self, _inputs: VariableSet, _ui: &dyn UiHandle) -> Outcome<Vec<Variable>> {
    STAGE_EXEC_COUNTER.fetch_add(1, Ordering::SeqCst);
    tracing::warn!(target: "test_stages", "failing with: '{}'", self.message);
    Outcome::fail([Diagnostic::stage_failure("FailingStage", self.message)])
  }
}

/// Panics when run.
#[derive(Debug, Clone, Default)]
pub struct PanickingStage;

#[async_trait]
impl Stage for PanickingStage {
  fn input_vars(&self) -> Vec<Variable> {
    Vec::new()
  }

  fn output_vars(&self) -> Vec<Variable> {
    Vec::new()
  }

  async fn run(&self, _inputs: VariableSet, _ui: &dyn UiHandle) -> Outcome<Vec<Variable>> {
    STAGE_EXEC_COUNTER.fetch_add(1, Ordering::SeqCst);
    panic!("stage blew up");
  }
}

/// Succeeds with a single warning and no outputs.
#[derive(Debug, Clone, Default)]
pub struct WarningStage;

#[async_trait]
impl Stage for WarningStage {
  fn input_vars(&self) -> Vec<Variable> {
    Vec::new()
  }

  fn output_vars(&self) -> Vec<Variable> {
    Vec::new()
  }

  async fn run(&self, _inputs: VariableSet, _ui: &dyn UiHandle) -> Outcome<Vec<Variable>> {
    STAGE_EXEC_COUNTER.fetch_add(1, Ordering::SeqCst);
    Outcome::warn([Diagnostic::UnknownInput { name: "noise".to_string() }], Vec::new())
  }
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Atomic counters for checking execution counts ---
pub static STAGE_EXEC_COUNTER: Lazy<Arc<AtomicUsize>> = Lazy::new(|| Arc::new(AtomicUsize::new(0)));
pub static ECHO_EXEC_COUNTER: Lazy<Arc<AtomicUsize>> = Lazy::new(|| Arc::new(AtomicUsize::new(0)));

pub fn reset_counters() {
  STAGE_EXEC_COUNTER.store(0, Ordering::SeqCst);
  ECHO_EXEC_COUNTER.store(0, Ordering::SeqCst);
}

// --- Diagnostics helpers ---
pub fn kinds(diags: &[wireflow::Traced<Diagnostic>]) -> Vec<&'static str> {
  diags.iter().map(|d| d.value().kind()).collect()
}
