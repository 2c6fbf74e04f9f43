// wireflow/src/wiring/wired_variable.rs

//! A stage slot seen from both sides: the stage's local variable and the wire
//! variable it is bound to in the workflow.

use std::fmt;

use crate::core::outcome::Outcome;
use crate::core::value::Value;
use crate::core::variable::{assert_types_match, Variable};

#[derive(Debug, Clone, PartialEq)]
pub struct WiredStageVariable {
  wire_var: Option<Variable>,
  local_var: Variable,
}

impl WiredStageVariable {
  /// Pairs a local slot with its wire. A wire without an explicit type takes
  /// the local variable's explicit type.
  pub fn new(wire_var: Option<Variable>, local_var: Variable) -> Self {
    let wire_var = wire_var.map(|wire| match local_var.explicit_type() {
      Some(ty) if !wire.has_explicit_type() => wire.with_type(ty.clone()),
      _ => wire,
    });
    Self { wire_var, local_var }
  }

  /// A slot wired under its own name, as used for workflow inputs and outputs.
  pub fn self_wired(var: Variable) -> Self {
    Self::new(Some(var.clone()), var)
  }

  pub fn wire_var(&self) -> Option<&Variable> {
    self.wire_var.as_ref()
  }

  pub fn local_var(&self) -> &Variable {
    &self.local_var
  }

  pub fn has_wire(&self) -> bool {
    self.wire_var.is_some()
  }

  pub fn wire_name(&self) -> Option<&str> {
    self.wire_var.as_ref().map(Variable::name)
  }

  pub fn local_name(&self) -> &str {
    self.local_var.name()
  }

  pub fn is_bound(&self) -> bool {
    self.wire_var.as_ref().is_some_and(Variable::is_bound) || self.local_var.is_bound()
  }

  pub fn has_default(&self) -> bool {
    self.wire_var.as_ref().is_some_and(Variable::has_default) || self.local_var.has_default()
  }

  /// Effective value: wire bound, wire default, local bound, local default.
  pub fn val(&self) -> Option<&Value> {
    let wire = self.wire_var.as_ref();
    wire
      .and_then(Variable::bound_value)
      .or_else(|| wire.and_then(Variable::default))
      .or_else(|| self.local_var.bound_value())
      .or_else(|| self.local_var.default())
  }

  /// Binds both sides to `value`.
  pub fn bind(&self, value: &Value) -> Self {
    Self {
      wire_var: self.wire_var.as_ref().map(|wire| wire.bind(value.clone())),
      local_var: self.local_var.bind(value.clone()),
    }
  }

  /// Checks the wire's type can flow into the local slot.
  pub fn assert_types_match(&self, fail_on_explicit_mismatch: bool) -> Outcome<()> {
    match &self.wire_var {
      Some(wire) => assert_types_match(&self.local_var, wire, fail_on_explicit_mismatch),
      None => Outcome::okay(()),
    }
  }
}

impl fmt::Display for WiredStageVariable {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.wire_var {
      Some(wire) => write!(f, "{} <-> {}", self.local_var, wire),
      None => write!(f, "{} <-> (unwired)", self.local_var),
    }
  }
}
