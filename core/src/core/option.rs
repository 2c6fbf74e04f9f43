// wireflow/src/core/option.rs

//! Small extensions over `std::option::Option` used by variables and wiring.

use crate::core::value::Value;
use crate::error::Diagnostic;

pub trait OptionExt<T> {
  fn has_value(&self) -> bool;

  /// Unwraps into a `Result`, producing `Diagnostic::EmptyValue` when empty.
  fn value(&self) -> Result<&T, Diagnostic>;
}

impl<T> OptionExt<T> for Option<T> {
  fn has_value(&self) -> bool {
    self.is_some()
  }

  fn value(&self) -> Result<&T, Diagnostic> {
    self.as_ref().ok_or(Diagnostic::EmptyValue)
  }
}

/// Normalizes "maybe a value" arguments.
///
/// An `Option` is passed through, a bare `Value` becomes `Some` unless it is
/// `Value::Unit`, which reads as "nothing".
pub trait IntoOption<T> {
  fn into_option(self) -> Option<T>;
}

impl<T> IntoOption<T> for Option<T> {
  fn into_option(self) -> Option<T> {
    self
  }
}

impl IntoOption<Value> for Value {
  fn into_option(self) -> Option<Value> {
    match self {
      Value::Unit => None,
      other => Some(other),
    }
  }
}
