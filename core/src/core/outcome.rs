// wireflow/src/core/outcome.rs

//! The three-state `Outcome` type and its merge algebra.
//!
//! An `Outcome` is either `Okay(value)`, `Warn(warnings, value)` or
//! `Fail(errors, warnings)`. Diagnostics are accumulated, never raised, so a
//! workflow can keep collecting warnings across every stage and only stop on
//! a real failure.
//!
//! Merging two outcomes follows one rule: if both are `Okay` the values are
//! combined, if neither is `Fail` the warnings are concatenated and the values
//! combined, and otherwise all errors and all warnings are concatenated in
//! order. `keep_first`, `keep_last` and the `FromIterator` impl (which appends)
//! are the three combiners used throughout the crate.

use std::fmt;
use std::panic::Location;

use crate::core::traced::Traced;
use crate::error::Diagnostic;

/// Ordering of the three `Outcome` states. `Okay < Warn < Fail`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
  Okay,
  Warn,
  Fail,
}

#[derive(Debug, Clone, PartialEq)]
#[must_use = "an Outcome may carry warnings or errors that should be inspected"]
pub enum Outcome<T, E = Diagnostic> {
  Okay(T),
  Warn(Vec<Traced<E>>, T),
  Fail(Vec<Traced<E>>, Vec<Traced<E>>),
}

use Outcome::{Fail, Okay, Warn};

fn trace_all<E>(items: impl IntoIterator<Item = E>, location: &'static Location<'static>) -> Vec<Traced<E>> {
  items.into_iter().map(|item| Traced::at(item, location)).collect()
}

// Constructors pin the diagnostic type so `Outcome::okay(1)` infers without
// annotations. Generic code builds the variants directly.
impl<T> Outcome<T> {
  pub fn okay(val: T) -> Self {
    Okay(val)
  }

  /// Builds a `Warn`, tracing every warning at the caller's location.
  #[track_caller]
  pub fn warn(warnings: impl IntoIterator<Item = Diagnostic>, val: T) -> Self {
    Warn(trace_all(warnings, Location::caller()), val)
  }

  #[track_caller]
  pub fn fail(errors: impl IntoIterator<Item = Diagnostic>) -> Self {
    Fail(trace_all(errors, Location::caller()), Vec::new())
  }

  #[track_caller]
  pub fn fail_with(errors: impl IntoIterator<Item = Diagnostic>, warnings: impl IntoIterator<Item = Diagnostic>) -> Self {
    let location = Location::caller();
    Fail(trace_all(errors, location), trace_all(warnings, location))
  }
}

impl<T, E> Outcome<T, E> {
  pub fn severity(&self) -> Severity {
    match self {
      Okay(_) => Severity::Okay,
      Warn(..) => Severity::Warn,
      Fail(..) => Severity::Fail,
    }
  }

  pub fn is_okay(&self) -> bool {
    matches!(self, Okay(_))
  }

  pub fn is_warn(&self) -> bool {
    matches!(self, Warn(..))
  }

  pub fn is_fail(&self) -> bool {
    matches!(self, Fail(..))
  }

  /// The carried value; `None` for `Fail`.
  pub fn value(&self) -> Option<&T> {
    match self {
      Okay(val) | Warn(_, val) => Some(val),
      Fail(..) => None,
    }
  }

  pub fn into_value(self) -> Option<T> {
    match self {
      Okay(val) | Warn(_, val) => Some(val),
      Fail(..) => None,
    }
  }

  pub fn warnings(&self) -> &[Traced<E>] {
    match self {
      Okay(_) => &[],
      Warn(warnings, _) | Fail(_, warnings) => warnings,
    }
  }

  pub fn errors(&self) -> &[Traced<E>] {
    match self {
      Fail(errors, _) => errors,
      _ => &[],
    }
  }

  /// Iterates the untraced warning values.
  pub fn warning_values(&self) -> impl Iterator<Item = &E> {
    self.warnings().iter().map(Traced::value)
  }

  pub fn error_values(&self) -> impl Iterator<Item = &E> {
    self.errors().iter().map(Traced::value)
  }

  /// Splits into `(value, errors, warnings)`.
  pub fn into_parts(self) -> (Option<T>, Vec<Traced<E>>, Vec<Traced<E>>) {
    match self {
      Okay(val) => (Some(val), Vec::new(), Vec::new()),
      Warn(warnings, val) => (Some(val), Vec::new(), warnings),
      Fail(errors, warnings) => (None, errors, warnings),
    }
  }

  /// Separates the status from the value. The status keeps every diagnostic;
  /// the value is `None` exactly when the outcome failed.
  pub fn split(self) -> (Outcome<(), E>, Option<T>) {
    match self {
      Okay(val) => (Okay(()), Some(val)),
      Warn(warnings, val) => (Warn(warnings, ()), Some(val)),
      Fail(errors, warnings) => (Fail(errors, warnings), None),
    }
  }

  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U, E> {
    match self {
      Okay(val) => Okay(f(val)),
      Warn(warnings, val) => Warn(warnings, f(val)),
      Fail(errors, warnings) => Fail(errors, warnings),
    }
  }

  /// Chains a fallible step. Warnings from `self` are kept ahead of the
  /// diagnostics produced by `f`; a `Fail` short-circuits.
  pub fn flat_map<U>(self, f: impl FnOnce(T) -> Outcome<U, E>) -> Outcome<U, E> {
    match self {
      Okay(val) => f(val),
      Warn(warnings, val) => prepend_warnings(warnings, f(val)),
      Fail(errors, warnings) => Fail(errors, warnings),
    }
  }

  /// Gives a failed outcome a chance to produce a replacement. `Okay` and
  /// `Warn` pass through untouched.
  pub fn recover(self, f: impl FnOnce(Vec<Traced<E>>, Vec<Traced<E>>) -> Outcome<T, E>) -> Outcome<T, E> {
    match self {
      Fail(errors, warnings) => f(errors, warnings),
      other => other,
    }
  }

  /// Appends a warning, turning `Okay` into `Warn`.
  #[track_caller]
  pub fn with_warning(self, warning: E) -> Self {
    self.with_warnings([warning])
  }

  /// Appends every given warning. An empty iterator leaves the outcome as is.
  #[track_caller]
  pub fn with_warnings(self, warnings: impl IntoIterator<Item = E>) -> Self {
    let extra = trace_all(warnings, Location::caller());
    if extra.is_empty() {
      return self;
    }
    match self {
      Okay(val) => Warn(extra, val),
      Warn(mut existing, val) => {
        existing.extend(extra);
        Warn(existing, val)
      }
      Fail(errors, mut existing) => {
        existing.extend(extra);
        Fail(errors, existing)
      }
    }
  }

  /// Drops the value, keeping only the status.
  pub fn discard(self) -> Outcome<(), E> {
    self.map(|_| ())
  }

  /// The base merge. `combine` is only called when neither side failed.
  pub fn merge<U, V>(self, other: Outcome<U, E>, combine: impl FnOnce(T, U) -> V) -> Outcome<V, E> {
    match (self, other) {
      (Okay(a), Okay(b)) => Okay(combine(a, b)),
      (Okay(a), Warn(warnings, b)) | (Warn(warnings, a), Okay(b)) => Warn(warnings, combine(a, b)),
      (Warn(mut warnings, a), Warn(more, b)) => {
        warnings.extend(more);
        Warn(warnings, combine(a, b))
      }
      (left, right) => {
        let (_, mut errors, mut warnings) = left.into_parts();
        let (_, more_errors, more_warnings) = right.into_parts();
        errors.extend(more_errors);
        warnings.extend(more_warnings);
        Fail(errors, warnings)
      }
    }
  }

  /// Merges, keeping this outcome's value.
  pub fn keep_first<U>(self, other: Outcome<U, E>) -> Outcome<T, E> {
    self.merge(other, |first, _| first)
  }

  /// Merges, keeping the other outcome's value.
  pub fn keep_last<U>(self, other: Outcome<U, E>) -> Outcome<U, E> {
    self.merge(other, |_, last| last)
  }

  /// Folds `outcomes` into one, starting from `Okay(empty)`. An empty input
  /// yields `Okay(empty)`.
  pub fn merge_all<I, F>(outcomes: I, empty: T, mut combine: F) -> Outcome<T, E>
  where
    I: IntoIterator<Item = Outcome<T, E>>,
    F: FnMut(T, T) -> T,
  {
    outcomes
      .into_iter()
      .fold(Okay(empty), |acc, next| acc.merge(next, &mut combine))
  }
}

impl<E> Outcome<(), E> {
  /// Merges a batch of statuses.
  pub fn all<I>(outcomes: I) -> Outcome<(), E>
  where
    I: IntoIterator<Item = Outcome<(), E>>,
  {
    Outcome::merge_all(outcomes, (), |_, _| ())
  }
}

impl<E> Default for Outcome<(), E> {
  fn default() -> Self {
    Okay(())
  }
}

fn prepend_warnings<U, E>(mut earlier: Vec<Traced<E>>, next: Outcome<U, E>) -> Outcome<U, E> {
  match next {
    Okay(val) => Warn(earlier, val),
    Warn(warnings, val) => {
      earlier.extend(warnings);
      Warn(earlier, val)
    }
    Fail(errors, warnings) => {
      earlier.extend(warnings);
      Fail(errors, earlier)
    }
  }
}

/// Append-merge: collects values in order while accumulating diagnostics.
impl<T, E> FromIterator<Outcome<T, E>> for Outcome<Vec<T>, E> {
  fn from_iter<I: IntoIterator<Item = Outcome<T, E>>>(iter: I) -> Self {
    iter.into_iter().fold(Okay(Vec::new()), |acc, next| {
      acc.merge(next, |mut values, val| {
        values.push(val);
        values
      })
    })
  }
}

impl<T, E> From<Result<T, E>> for Outcome<T, E> {
  #[track_caller]
  fn from(res: Result<T, E>) -> Self {
    match res {
      Ok(val) => Okay(val),
      Err(err) => Fail(vec![Traced::at(err, Location::caller())], Vec::new()),
    }
  }
}

impl<T: fmt::Debug, E: fmt::Display> fmt::Display for Outcome<T, E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Okay(val) => write!(f, "Okay({val:?})"),
      Warn(warnings, val) => {
        write!(f, "Warn({val:?}) with the following warnings:")?;
        for warning in warnings {
          write!(f, "\n    > {}", warning.value())?;
        }
        Ok(())
      }
      Fail(errors, warnings) => {
        write!(f, "Fail with the following errors:")?;
        for error in errors {
          write!(f, "\n    > {}", error.value())?;
        }
        if !warnings.is_empty() {
          write!(f, "\nand the following warnings:")?;
          for warning in warnings {
            write!(f, "\n    > {}", warning.value())?;
          }
        }
        Ok(())
      }
    }
  }
}
