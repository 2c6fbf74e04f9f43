// wireflow/src/wiring/wired_set.rs

//! The full input or output side of one stage, or of the workflow itself.

use crate::core::stage::StageInstance;
use crate::core::value::Value;
use crate::core::variable::Variable;
use crate::wiring::wired_variable::WiredStageVariable;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WiredVariableSet {
  vars: Vec<WiredStageVariable>,
}

impl WiredVariableSet {
  pub fn new(vars: impl IntoIterator<Item = WiredStageVariable>) -> Self {
    Self {
      vars: vars.into_iter().collect(),
    }
  }

  pub fn from_input(stage: &StageInstance) -> Self {
    Self::new(
      stage
        .input_bindings()
        .into_iter()
        .map(|(local, wire)| WiredStageVariable::new(wire, local)),
    )
  }

  pub fn from_output(stage: &StageInstance) -> Self {
    Self::new(
      stage
        .output_bindings()
        .into_iter()
        .map(|(local, wire)| WiredStageVariable::new(wire, local)),
    )
  }

  /// Workflow-level inputs or outputs: every variable is wired to itself.
  pub fn from_variables<'a>(vars: impl IntoIterator<Item = &'a Variable>) -> Self {
    Self::new(vars.into_iter().cloned().map(WiredStageVariable::self_wired))
  }

  pub fn vars(&self) -> &[WiredStageVariable] {
    &self.vars
  }

  pub fn iter(&self) -> impl Iterator<Item = &WiredStageVariable> {
    self.vars.iter()
  }

  pub fn len(&self) -> usize {
    self.vars.len()
  }

  pub fn is_empty(&self) -> bool {
    self.vars.is_empty()
  }

  pub fn get_by_local(&self, name: &str) -> Option<&WiredStageVariable> {
    self.vars.iter().find(|var| var.local_name() == name)
  }

  pub fn get_by_wire(&self, name: &str) -> Option<&WiredStageVariable> {
    self.vars.iter().find(|var| var.wire_name() == Some(name))
  }

  /// Binds slots whose local name matches a given variable with a value.
  pub fn bind_local(&self, values: &[Variable]) -> Self {
    self.bind_matching(values, WiredStageVariable::local_name)
  }

  /// Binds slots whose wire name matches a given variable with a value.
  pub fn bind_wire(&self, values: &[Variable]) -> Self {
    self.bind_matching(values, |var| var.wire_name().unwrap_or_default())
  }

  fn bind_matching(&self, values: &[Variable], key: impl Fn(&WiredStageVariable) -> &str) -> Self {
    Self::new(self.vars.iter().map(|var| {
      let name = key(var);
      let value: Option<&Value> = values
        .iter()
        .find(|candidate| !name.is_empty() && candidate.name() == name)
        .and_then(Variable::val);
      match value {
        Some(value) => var.bind(value),
        None => var.clone(),
      }
    }))
  }
}
