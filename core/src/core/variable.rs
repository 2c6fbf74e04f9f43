// wireflow/src/core/variable.rs

//! `Variable`: a named slot that may carry a bound value, a default, a
//! description and a type.
//!
//! The type is resolved whenever a variable is built or changed: an explicit
//! type always wins; otherwise it is inferred from the bound value, the
//! common type of the bound value and the default, or the default alone.
//! Inference that finds no usable common type leaves the variable untyped.
//!
//! Variables are immutable values. `bind` and the `with_*` builders return new
//! variables.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{event, Level};

use crate::core::outcome::Outcome;
use crate::core::value::{common_type, Value, VarType};
use crate::error::Diagnostic;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
  name: String,
  desc: Option<String>,
  default: Option<Value>,
  bound: Option<Value>,
  explicit_type: Option<VarType>,
  var_type: Option<VarType>,
  var_type_inferred: bool,
}

impl Variable {
  /// A variable with no value, default, or type.
  pub fn unbound(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      desc: None,
      default: None,
      bound: None,
      explicit_type: None,
      var_type: None,
      var_type_inferred: false,
    }
  }

  pub fn bound(name: impl Into<String>, value: impl Into<Value>) -> Self {
    Self {
      bound: Some(value.into()),
      ..Self::unbound(name)
    }
    .resolved()
  }

  /// A bound variable whose name is derived from its value. Used when a bare
  /// value is passed where a variable is expected.
  pub fn constant(value: impl Into<Value>) -> Self {
    let value = value.into();
    Self::bound(format!("Constant::{value}"), value)
  }

  pub fn with_type(self, ty: VarType) -> Self {
    Self {
      explicit_type: Some(ty),
      ..self
    }
    .resolved()
  }

  pub fn with_desc(self, desc: impl Into<String>) -> Self {
    Self {
      desc: Some(desc.into()),
      ..self
    }
  }

  pub fn with_default(self, default: impl Into<Value>) -> Self {
    Self {
      default: Some(default.into()),
      ..self
    }
    .resolved()
  }

  pub fn without_default(self) -> Self {
    Self { default: None, ..self }.resolved()
  }

  pub fn renamed(self, name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      ..self
    }
  }

  /// Drops the bound value, keeping name, type, default, and description.
  pub fn unbind(&self) -> Self {
    Self {
      bound: None,
      ..self.clone()
    }
    .resolved()
  }

  /// Returns a bound copy. An explicit type is kept; an inferred one is
  /// re-inferred from the new value.
  pub fn bind(&self, value: impl Into<Value>) -> Self {
    Self {
      bound: Some(value.into()),
      ..self.clone()
    }
    .resolved()
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn desc(&self) -> Option<&str> {
    self.desc.as_deref()
  }

  pub fn default(&self) -> Option<&Value> {
    self.default.as_ref()
  }

  pub fn has_default(&self) -> bool {
    self.default.is_some()
  }

  pub fn is_bound(&self) -> bool {
    self.bound.is_some()
  }

  pub fn bound_value(&self) -> Option<&Value> {
    self.bound.as_ref()
  }

  /// The effective value: the bound value, else the default.
  pub fn val(&self) -> Option<&Value> {
    self.bound.as_ref().or(self.default.as_ref())
  }

  pub fn var_type(&self) -> Option<&VarType> {
    self.var_type.as_ref()
  }

  pub fn explicit_type(&self) -> Option<&VarType> {
    self.explicit_type.as_ref()
  }

  pub fn var_type_inferred(&self) -> bool {
    self.var_type_inferred
  }

  /// True if the variable carries a type the user asked for.
  pub fn has_explicit_type(&self) -> bool {
    self.explicit_type.is_some()
  }

  /// Runs type inference and reports how it went.
  ///
  /// `Okay(Some(_))` for a clean inference, `Warn` with `BroadCommonType` when
  /// the value and default only share a marker type, and `Warn` carrying
  /// `NoCommonType` with `None` when they share nothing.
  pub fn type_inference(&self) -> Outcome<Option<VarType>> {
    match (&self.bound, &self.default) {
      (Some(val), Some(default)) => {
        common_type(&val.var_type(), &default.var_type())
          .map(Some)
          .recover(|errors, mut warnings| {
            warnings.extend(errors);
            Outcome::Warn(warnings, None)
          })
      }
      (Some(val), None) => Outcome::okay(Some(val.var_type())),
      (None, Some(default)) => Outcome::okay(Some(default.var_type())),
      (None, None) => Outcome::okay(None),
    }
  }

  fn resolved(self) -> Self {
    if let Some(ty) = self.explicit_type.clone() {
      return Self {
        var_type: Some(ty),
        var_type_inferred: false,
        ..self
      };
    }
    let inference = self.type_inference();
    if !inference.is_okay() {
      event!(
        Level::DEBUG,
        variable = %self.name,
        result = %inference,
        "Type inference was not clean."
      );
    }
    let var_type = inference.into_value().flatten();
    Self {
      var_type_inferred: var_type.is_some(),
      var_type,
      ..self
    }
  }
}

impl PartialEq for Variable {
  /// Compares name, binding, description, type, and default. Whether the type
  /// was inferred is not part of equality.
  fn eq(&self, other: &Self) -> bool {
    self.name == other.name
      && self.bound == other.bound
      && self.desc == other.desc
      && self.var_type == other.var_type
      && self.default == other.default
  }
}

impl fmt::Display for Variable {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(if self.is_bound() { "Bound" } else { "Unbound" })?;
    if let Some(ty) = &self.var_type {
      write!(f, "[{ty}{}]", if self.var_type_inferred { "?" } else { "" })?;
    }
    write!(f, " {}", self.name)?;
    if let Some(val) = &self.bound {
      write!(f, " = {val}")?;
    }
    if let Some(default) = &self.default {
      write!(f, " (default {default})")?;
    }
    if let Some(desc) = &self.desc {
      write!(f, ": {desc}")?;
    }
    Ok(())
  }
}

/// Checks whether a value typed like `provided` can flow into `expected`.
///
/// Passes when either side has no type or `provided` is a subtype of
/// `expected`. A mismatch on an inferred type only warns; a mismatch between
/// explicit types fails if `fail_on_explicit_mismatch` is set.
pub fn assert_types_match(expected: &Variable, provided: &Variable, fail_on_explicit_mismatch: bool) -> Outcome<()> {
  let (Some(want), Some(got)) = (expected.var_type(), provided.var_type()) else {
    return Outcome::okay(());
  };
  if got.is_subtype_of(want) {
    return Outcome::okay(());
  }

  let note = format!("{} is not a subtype of {}", got, want);
  if expected.var_type_inferred() || provided.var_type_inferred() {
    return Outcome::warn(
      [Diagnostic::InferredTypeMismatch {
        expected: Box::new(expected.clone()),
        found: Box::new(provided.clone()),
        note,
      }],
      (),
    );
  }
  let mismatch = Diagnostic::ExplicitTypeMismatch {
    expected: Box::new(expected.clone()),
    found: Box::new(provided.clone()),
    note,
  };
  if fail_on_explicit_mismatch {
    Outcome::fail([mismatch])
  } else {
    Outcome::warn([mismatch], ())
  }
}

/// Anything accepted where a stage argument or workflow variable is expected.
#[derive(Debug, Clone, PartialEq)]
pub enum VarRef {
  Name(String),
  Var(Variable),
}

impl VarRef {
  /// A name becomes an unbound variable with that name.
  pub fn into_variable(self) -> Variable {
    match self {
      VarRef::Name(name) => Variable::unbound(name),
      VarRef::Var(var) => var,
    }
  }

  pub fn name(&self) -> &str {
    match self {
      VarRef::Name(name) => name,
      VarRef::Var(var) => var.name(),
    }
  }
}

impl From<&str> for VarRef {
  fn from(name: &str) -> Self {
    VarRef::Name(name.to_string())
  }
}

impl From<String> for VarRef {
  fn from(name: String) -> Self {
    VarRef::Name(name)
  }
}

impl From<Variable> for VarRef {
  fn from(var: Variable) -> Self {
    VarRef::Var(var)
  }
}

impl From<&Variable> for VarRef {
  fn from(var: &Variable) -> Self {
    VarRef::Var(var.clone())
  }
}
