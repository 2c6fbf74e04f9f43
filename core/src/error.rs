// wireflow/src/error.rs
use std::fmt;

use anyhow::Error as AnyhowError;
use thiserror::Error;

use crate::core::outcome::Outcome;
use crate::core::value::{Value, VarType};
use crate::core::variable::Variable;

/// Every warning and error wireflow can report.
///
/// Diagnostics are carried inside `Outcome`s rather than returned through
/// `Result::Err`, so the same enum serves as both warning and error payload.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Diagnostic {
  #[error("can't get the value of `{}`: it is unbound and has no default{}", .var.name(), with_note(.note))]
  UnboundVariable { var: Box<Variable>, note: String },

  #[error("multiple variables named `{name}` ({} candidates); keeping the first{}", .candidates.len(), with_note(.note))]
  AmbiguousVariable {
    name: String,
    candidates: Vec<Variable>,
    note: String,
  },

  #[error("inferred type mismatch: `{}` expects {} but `{}` provides {}{}",
    .expected.name(), type_label(.expected), .found.name(), type_label(.found), with_note(.note))]
  InferredTypeMismatch {
    expected: Box<Variable>,
    found: Box<Variable>,
    note: String,
  },

  #[error("explicit type mismatch: `{}` expects {} but `{}` provides {}{}",
    .expected.name(), type_label(.expected), .found.name(), type_label(.found), with_note(.note))]
  ExplicitTypeMismatch {
    expected: Box<Variable>,
    found: Box<Variable>,
    note: String,
  },

  #[error("couldn't resolve wiring path {path}{}", with_note(.note))]
  Lookup { path: String, note: String },

  #[error("no common type for {}", list(.types))]
  NoCommonType { types: Vec<VarType> },

  #[error("common type of {} is the overly broad `{common}`", list(.types))]
  BroadCommonType { types: Vec<VarType>, common: VarType },

  #[error("no variable named `{name}`")]
  NoSuchVariable { name: String },

  #[error("can't take the value of an empty option")]
  EmptyValue,

  #[error("value {value} is not of type {expected}")]
  TypeCheck { value: Value, expected: VarType },

  #[error("{slot} isn't wired to anything; it will be left unbound")]
  UnwiredVariable { slot: String },

  #[error("{slot} has {} producers for wire `{wire}`; using {}", .candidates.len(), .candidates.first().map(String::as_str).unwrap_or("none"))]
  AmbiguousWiring {
    slot: String,
    wire: String,
    candidates: Vec<String>,
  },

  #[error("`{name}` isn't an input of this workflow; ignoring it")]
  UnknownInput { name: String },

  #[error("stage{} failed: {message}", stage_label(.stage))]
  StageFailure { stage: Option<String>, message: String },

  #[error("stage `{stage}` panicked: {message}")]
  StagePanicked { stage: String, message: String },

  #[error("workflow `{workflow}` is malformed and can't be run\n{reason}")]
  MalformedWorkflow {
    workflow: String,
    reason: Box<Outcome<()>>,
  },
}

impl Diagnostic {
  /// Short variant name, used as a structured field in logs.
  pub fn kind(&self) -> &'static str {
    match self {
      Diagnostic::UnboundVariable { .. } => "UnboundVariable",
      Diagnostic::AmbiguousVariable { .. } => "AmbiguousVariable",
      Diagnostic::InferredTypeMismatch { .. } => "InferredTypeMismatch",
      Diagnostic::ExplicitTypeMismatch { .. } => "ExplicitTypeMismatch",
      Diagnostic::Lookup { .. } => "Lookup",
      Diagnostic::NoCommonType { .. } => "NoCommonType",
      Diagnostic::BroadCommonType { .. } => "BroadCommonType",
      Diagnostic::NoSuchVariable { .. } => "NoSuchVariable",
      Diagnostic::EmptyValue => "EmptyValue",
      Diagnostic::TypeCheck { .. } => "TypeCheck",
      Diagnostic::UnwiredVariable { .. } => "UnwiredVariable",
      Diagnostic::AmbiguousWiring { .. } => "AmbiguousWiring",
      Diagnostic::UnknownInput { .. } => "UnknownInput",
      Diagnostic::StageFailure { .. } => "StageFailure",
      Diagnostic::StagePanicked { .. } => "StagePanicked",
      Diagnostic::MalformedWorkflow { .. } => "MalformedWorkflow",
    }
  }

  /// Wraps an error from user stage code, attributing it to `stage`.
  pub fn stage_failure(stage: impl Into<String>, err: impl fmt::Display) -> Self {
    Diagnostic::StageFailure {
      stage: Some(stage.into()),
      message: err.to_string(),
    }
  }

  /// Fills in the stage name of a `StageFailure` that doesn't have one yet.
  pub fn in_stage(self, name: &str) -> Self {
    match self {
      Diagnostic::StageFailure { stage: None, message } => Diagnostic::StageFailure {
        stage: Some(name.to_string()),
        message,
      },
      other => other,
    }
  }
}

// Stage code usually fails with anyhow; this is the conversion wireflow offers.
impl From<AnyhowError> for Diagnostic {
  fn from(err: AnyhowError) -> Self {
    // A diagnostic that went through `anyhow` comes back out unchanged.
    if let Some(diag) = err.downcast_ref::<Diagnostic>() {
      return diag.clone();
    }
    Diagnostic::StageFailure {
      stage: None,
      message: format!("{err:#}"),
    }
  }
}

/// Problems reading `WiringConfig` from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("invalid value `{value}` for {var}: expected a boolean (true/false, 1/0, yes/no, on/off)")]
  InvalidBool { var: String, value: String },

  #[error("couldn't read {var}: {source}")]
  Env {
    var: String,
    #[source]
    source: std::env::VarError,
  },
}

pub type ConfigResult<T, E = ConfigError> = std::result::Result<T, E>;

fn with_note(note: &str) -> String {
  if note.is_empty() {
    String::new()
  } else {
    format!(" ({note})")
  }
}

fn stage_label(stage: &Option<String>) -> String {
  match stage {
    Some(name) => format!(" `{name}`"),
    None => String::new(),
  }
}

fn type_label(var: &Variable) -> String {
  match (var.var_type(), var.var_type_inferred()) {
    (Some(ty), true) => format!("{ty} (inferred)"),
    (Some(ty), false) => ty.to_string(),
    (None, _) => "no type".to_string(),
  }
}

fn list(types: &[VarType]) -> String {
  types.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}
