// wireflow/src/core/traced.rs

//! Defines `Traced<T>`, which pairs a diagnostic with the place it was created.
//!
//! Diagnostics in wireflow are returned, never thrown, so the usual unwinding
//! machinery never records where they came from. `Traced` captures the caller
//! location eagerly and a `std::backtrace::Backtrace` (which honours
//! `RUST_BACKTRACE` / `RUST_LIB_BACKTRACE`, so it is free when disabled).

use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// A value plus the stack context it was created in.
///
/// Equality only looks at the wrapped value: two diagnostics built at
/// different call sites with the same contents are equal.
#[derive(Clone)]
pub struct Traced<T> {
  val: T,
  location: &'static Location<'static>,
  backtrace: Arc<Backtrace>,
}

impl<T> Traced<T> {
  /// Wraps `val`, recording the caller's location and a backtrace.
  #[track_caller]
  pub fn new(val: T) -> Self {
    Self::at(val, Location::caller())
  }

  /// Wraps `val` with an explicit location. Used by `Outcome` constructors so
  /// that a whole batch of diagnostics shares the caller of the constructor.
  pub(crate) fn at(val: T, location: &'static Location<'static>) -> Self {
    Self {
      val,
      location,
      backtrace: Arc::new(Backtrace::capture()),
    }
  }

  pub fn value(&self) -> &T {
    &self.val
  }

  pub fn into_value(self) -> T {
    self.val
  }

  /// Source location of the code that created this diagnostic.
  pub fn location(&self) -> &'static Location<'static> {
    self.location
  }

  pub fn backtrace(&self) -> &Backtrace {
    &self.backtrace
  }

  /// Transforms the wrapped value while keeping the original trace.
  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Traced<U> {
    Traced {
      val: f(self.val),
      location: self.location,
      backtrace: self.backtrace,
    }
  }
}

impl<T> From<T> for Traced<T> {
  #[track_caller]
  fn from(val: T) -> Self {
    Traced::new(val)
  }
}

impl<T: PartialEq> PartialEq for Traced<T> {
  fn eq(&self, other: &Self) -> bool {
    self.val == other.val
  }
}

impl<T: fmt::Debug> fmt::Debug for Traced<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Traced")
      .field("val", &self.val)
      .field("location", &format_args!("{}", self.location))
      .finish()
  }
}

impl<T: fmt::Display> fmt::Display for Traced<T> {
  /// Renders the value as if it had been raised: the message, where it was
  /// created, and the captured backtrace when one is available.
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} (at {})", self.val, self.location)?;
    if self.backtrace.status() == BacktraceStatus::Captured {
      write!(f, "\n{}", self.backtrace)?;
    }
    Ok(())
  }
}
