// wireflow/src/core/stage.rs

//! Defines the `Stage` trait and `StageInstance`, a stage plus its wiring
//! arguments.
//!
//! A stage declares its input and output shape as variables. It is placed in
//! a workflow through a `StageInstance`, which binds each declared slot to a
//! *wire variable*: positionally, by keyword, or implicitly under the slot's
//! own name. The wire names are what the wiring matches between stages.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::outcome::Outcome;
use crate::core::ui::UiHandle;
use crate::core::variable::{VarRef, Variable};
use crate::core::variable_set::VariableSet;

/// A unit of work with a declared input and output shape.
///
/// `run` receives its inputs already resolved and re-bound onto the declared
/// input variables. It must report problems through the returned `Outcome`
/// rather than panicking, though a panic is caught and reported as
/// `Diagnostic::StagePanicked` by the workflow.
#[async_trait]
pub trait Stage: Send + Sync + 'static {
  /// Display name, used in logs and diagnostics. Defaults to the type name.
  fn name(&self) -> &str {
    let full = std::any::type_name::<Self>();
    let path = full.split('<').next().unwrap_or(full);
    path.rsplit("::").next().unwrap_or(path)
  }

  fn input_vars(&self) -> Vec<Variable>;

  fn output_vars(&self) -> Vec<Variable>;

  async fn run(&self, inputs: VariableSet, ui: &dyn UiHandle) -> Outcome<Vec<Variable>>;
}

/// A declared slot and the wire variable it is bound to, if any.
pub type SlotBinding = (Variable, Option<Variable>);

/// A stage placed in a workflow with its input and output bindings.
///
/// Every builder method returns a new instance; the original is unchanged.
#[derive(Clone)]
pub struct StageInstance {
  stage: Arc<dyn Stage>,
  args: Vec<VarRef>,
  kwargs: Vec<(String, VarRef)>,
  out_args: Vec<VarRef>,
  out_kwargs: Vec<(String, VarRef)>,
  depends: Vec<String>,
  provides: Vec<String>,
  implicit: bool,
  always_run: bool,
}

impl StageInstance {
  pub fn new(stage: impl Stage) -> Self {
    Self::from_arc(Arc::new(stage))
  }

  pub fn from_arc(stage: Arc<dyn Stage>) -> Self {
    Self {
      stage,
      args: Vec::new(),
      kwargs: Vec::new(),
      out_args: Vec::new(),
      out_kwargs: Vec::new(),
      depends: Vec::new(),
      provides: Vec::new(),
      implicit: false,
      always_run: false,
    }
  }

  /// Positional input bindings, replacing any previous ones.
  pub fn args<I, V>(&self, args: I) -> Self
  where
    I: IntoIterator<Item = V>,
    V: Into<VarRef>,
  {
    Self {
      args: args.into_iter().map(Into::into).collect(),
      ..self.clone()
    }
  }

  /// Binds the input slot called `slot` to `wire`. A later binding for the
  /// same slot replaces an earlier one.
  pub fn kwarg(&self, slot: impl Into<String>, wire: impl Into<VarRef>) -> Self {
    let mut next = self.clone();
    rebind(&mut next.kwargs, slot.into(), wire.into());
    next
  }

  /// Positional output bindings, replacing any previous ones.
  pub fn to<I, V>(&self, outputs: I) -> Self
  where
    I: IntoIterator<Item = V>,
    V: Into<VarRef>,
  {
    Self {
      out_args: outputs.into_iter().map(Into::into).collect(),
      ..self.clone()
    }
  }

  /// Binds the output slot called `slot` to `wire`, replacing any earlier
  /// binding for that slot.
  pub fn to_kw(&self, slot: impl Into<String>, wire: impl Into<VarRef>) -> Self {
    let mut next = self.clone();
    rebind(&mut next.out_kwargs, slot.into(), wire.into());
    next
  }

  /// Wires every slot under its own declared name.
  pub fn implicit(&self) -> Self {
    Self {
      implicit: true,
      ..self.clone()
    }
  }

  pub fn always_run(&self) -> Self {
    Self {
      always_run: true,
      ..self.clone()
    }
  }

  pub fn depends<I, S>(&self, tags: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let mut next = self.clone();
    next.depends.extend(tags.into_iter().map(Into::into));
    next
  }

  pub fn provides<I, S>(&self, tags: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let mut next = self.clone();
    next.provides.extend(tags.into_iter().map(Into::into));
    next
  }

  pub fn stage(&self) -> &Arc<dyn Stage> {
    &self.stage
  }

  pub fn name(&self) -> &str {
    self.stage.name()
  }

  pub fn is_implicit(&self) -> bool {
    self.implicit
  }

  pub fn is_always_run(&self) -> bool {
    self.always_run
  }

  pub fn depends_on(&self) -> &[String] {
    &self.depends
  }

  pub fn provided(&self) -> &[String] {
    &self.provides
  }

  /// Each declared input paired with its wire variable.
  pub fn input_bindings(&self) -> Vec<SlotBinding> {
    bind_slots(self.stage.input_vars(), &self.args, &self.kwargs, self.implicit)
  }

  /// Each declared output paired with its wire variable.
  pub fn output_bindings(&self) -> Vec<SlotBinding> {
    bind_slots(self.stage.output_vars(), &self.out_args, &self.out_kwargs, self.implicit)
  }
}

// Positional binding first, then keyword binding by slot name.
fn bind_slots(
  locals: Vec<Variable>,
  args: &[VarRef],
  kwargs: &[(String, VarRef)],
  implicit: bool,
) -> Vec<SlotBinding> {
  locals
    .into_iter()
    .enumerate()
    .map(|(dex, local)| {
      let wire = args
        .get(dex)
        .or_else(|| kwargs.iter().find(|(slot, _)| slot == local.name()).map(|(_, wire)| wire))
        .map(|wire| wire.clone().into_variable())
        .or_else(|| implicit.then(|| local.clone()));
      (local, wire)
    })
    .collect()
}

fn rebind(bindings: &mut Vec<(String, VarRef)>, slot: String, wire: VarRef) {
  bindings.retain(|(existing, _)| *existing != slot);
  bindings.push((slot, wire));
}

impl fmt::Debug for StageInstance {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("StageInstance")
      .field("stage", &self.name())
      .field("args", &self.args)
      .field("kwargs", &self.kwargs)
      .field("out_args", &self.out_args)
      .field("out_kwargs", &self.out_kwargs)
      .field("implicit", &self.implicit)
      .field("always_run", &self.always_run)
      .finish()
  }
}

/// Convenience constructors for any `Stage`.
pub trait StageExt: Stage + Sized {
  fn instance(self) -> StageInstance {
    StageInstance::new(self)
  }

  fn with_args<I, V>(self, args: I) -> StageInstance
  where
    I: IntoIterator<Item = V>,
    V: Into<VarRef>,
  {
    StageInstance::new(self).args(args)
  }
}

impl<S: Stage> StageExt for S {}
