// wireflow/src/core/variable_set.rs

//! An ordered, name-keyed collection of variables.

use std::fmt;

use indexmap::IndexMap;

use crate::core::outcome::Outcome;
use crate::core::value::Value;
use crate::core::variable::Variable;
use crate::error::Diagnostic;

/// Variables keyed by name, in insertion order.
///
/// If several variables share a name the first one is kept and the set's
/// `status` carries an `AmbiguousVariable` warning listing all candidates.
#[derive(Debug, Clone, Default)]
pub struct VariableSet {
  vars: IndexMap<String, Variable>,
  status: Outcome<()>,
}

impl VariableSet {
  pub fn new(vars: impl IntoIterator<Item = Variable>) -> Self {
    let mut groups: IndexMap<String, Vec<Variable>> = IndexMap::new();
    for var in vars {
      groups.entry(var.name().to_string()).or_default().push(var);
    }

    let mut warnings = Vec::new();
    let mut kept = IndexMap::with_capacity(groups.len());
    for (name, mut candidates) in groups {
      if candidates.len() > 1 {
        warnings.push(Diagnostic::AmbiguousVariable {
          name: name.clone(),
          candidates: candidates.clone(),
          note: "while constructing a variable set".to_string(),
        });
      }
      let first = candidates.swap_remove(0);
      kept.insert(name, first);
    }

    Self {
      vars: kept,
      status: Outcome::okay(()).with_warnings(warnings),
    }
  }

  pub fn empty() -> Self {
    Self::default()
  }

  /// Warnings raised while building the set.
  pub fn status(&self) -> &Outcome<()> {
    &self.status
  }

  pub fn len(&self) -> usize {
    self.vars.len()
  }

  pub fn is_empty(&self) -> bool {
    self.vars.is_empty()
  }

  pub fn contains(&self, name: &str) -> bool {
    self.vars.contains_key(name)
  }

  pub fn iter(&self) -> impl Iterator<Item = &Variable> {
    self.vars.values()
  }

  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.vars.keys().map(String::as_str)
  }

  pub fn get_var(&self, name: &str) -> Option<&Variable> {
    self.vars.get(name)
  }

  /// The effective value of `name`.
  pub fn get(&self, name: &str) -> Result<&Value, Diagnostic> {
    let var = self.vars.get(name).ok_or_else(|| Diagnostic::NoSuchVariable { name: name.to_string() })?;
    var.val().ok_or_else(|| Diagnostic::UnboundVariable {
      var: Box::new(var.clone()),
      note: String::new(),
    })
  }

  pub fn get_bool(&self, name: &str) -> Result<bool, Diagnostic> {
    self.get(name)?.as_bool()
  }

  pub fn get_int(&self, name: &str) -> Result<i64, Diagnostic> {
    self.get(name)?.as_int()
  }

  pub fn get_float(&self, name: &str) -> Result<f64, Diagnostic> {
    self.get(name)?.as_float()
  }

  pub fn get_str(&self, name: &str) -> Result<&str, Diagnostic> {
    self.get(name)?.as_str()
  }

  fn check_one(&self, name: &str) -> Outcome<()> {
    match self.get(name) {
      Ok(_) => Outcome::okay(()),
      Err(err) => Outcome::fail([err]),
    }
  }

  /// Checks that each named variable exists and has a value.
  pub fn check<I, S>(&self, names: I) -> Outcome<()>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    Outcome::all(names.into_iter().map(|name| self.check_one(name.as_ref())))
  }

  pub fn check_all(&self) -> Outcome<()> {
    Outcome::all(self.vars.keys().map(|name| self.check_one(name)))
  }

  pub fn into_vars(self) -> Vec<Variable> {
    self.vars.into_values().collect()
  }
}

impl PartialEq for VariableSet {
  /// Two sets are equal if they map the same names to equal variables.
  fn eq(&self, other: &Self) -> bool {
    self.vars == other.vars
  }
}

impl FromIterator<Variable> for VariableSet {
  fn from_iter<I: IntoIterator<Item = Variable>>(iter: I) -> Self {
    VariableSet::new(iter)
  }
}

impl<'a> IntoIterator for &'a VariableSet {
  type Item = &'a Variable;
  type IntoIter = indexmap::map::Values<'a, String, Variable>;

  fn into_iter(self) -> Self::IntoIter {
    self.vars.values()
  }
}

impl fmt::Display for VariableSet {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("VariableSet(")?;
    for (i, var) in self.vars.values().enumerate() {
      if i > 0 {
        f.write_str(", ")?;
      }
      write!(f, "{var}")?;
    }
    f.write_str(")")
  }
}
