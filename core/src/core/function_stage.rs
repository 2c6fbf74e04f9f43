// wireflow/src/core/function_stage.rs

//! Wraps a plain closure as a `Stage`.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{event, Level};

use crate::core::outcome::Outcome;
use crate::core::stage::Stage;
use crate::core::ui::UiHandle;
use crate::core::value::{Value, VarType};
use crate::core::variable::Variable;
use crate::core::variable_set::VariableSet;
use crate::error::Diagnostic;

pub type StageFn = Arc<dyn Fn(&VariableSet) -> anyhow::Result<Value> + Send + Sync + 'static>;

/// A stage backed by a closure over its inputs.
///
/// Inputs are checked before the closure is called; a missing value fails the
/// stage with `UnboundVariable` without invoking it. The returned value is
/// bound to the single declared output, if there is one. An `Err` becomes a
/// `StageFailure` naming this stage.
#[derive(Clone)]
pub struct FunctionStage {
  name: String,
  inputs: Vec<Variable>,
  output: Option<Variable>,
  func: StageFn,
}

impl FunctionStage {
  pub fn new<F>(name: impl Into<String>, func: F) -> Self
  where
    F: Fn(&VariableSet) -> anyhow::Result<Value> + Send + Sync + 'static,
  {
    Self {
      name: name.into(),
      inputs: Vec::new(),
      output: None,
      func: Arc::new(func),
    }
  }

  pub fn input(mut self, var: Variable) -> Self {
    self.inputs.push(var);
    self
  }

  pub fn inputs(mut self, vars: impl IntoIterator<Item = Variable>) -> Self {
    self.inputs.extend(vars);
    self
  }

  /// Declares a single output named `return` of type `ty`.
  pub fn returns(self, ty: VarType) -> Self {
    self.output(Variable::unbound("return").with_type(ty))
  }

  pub fn output(mut self, var: Variable) -> Self {
    self.output = Some(var);
    self
  }
}

#[async_trait]
impl Stage for FunctionStage {
  fn name(&self) -> &str {
    &self.name
  }

  fn input_vars(&self) -> Vec<Variable> {
    self.inputs.clone()
  }

  fn output_vars(&self) -> Vec<Variable> {
    self.output.iter().cloned().collect()
  }

  async fn run(&self, inputs: VariableSet, _ui: &dyn UiHandle) -> Outcome<Vec<Variable>> {
    let checked = inputs.check(self.inputs.iter().map(Variable::name));
    if checked.is_fail() {
      event!(Level::DEBUG, stage = %self.name, "Inputs missing, not calling function.");
      return checked.map(|_| Vec::new());
    }

    match (self.func)(&inputs) {
      Ok(value) => checked.map(|_| match &self.output {
        Some(out) => vec![out.bind(value)],
        None => Vec::new(),
      }),
      Err(err) => {
        let diag = Diagnostic::from(err).in_stage(&self.name);
        checked.flat_map(|_| Outcome::fail([diag]))
      }
    }
  }
}

impl fmt::Debug for FunctionStage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FunctionStage")
      .field("name", &self.name)
      .field("inputs", &self.inputs)
      .field("output", &self.output)
      .finish()
  }
}
