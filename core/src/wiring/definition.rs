// wireflow/src/wiring/definition.rs

//! Builds the wiring of a workflow: for every stage input and every workflow
//! output, decide where its value will come from.
//!
//! A slot resolves, in order, to:
//!  1. `Bound` if its wire or local variable already carries a value,
//!  2. `Link` to the most recent upstream producer of its wire name (earlier
//!     stage outputs, searched backwards, then the workflow inputs),
//!  3. `Default` if either side has a default,
//!  4. `Unbound` otherwise (with an `UnwiredVariable` warning).
//!
//! A stage can only link to producers strictly before it, so there are no
//! cycles. Workflow outputs may link to any stage.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{event, instrument, Level};

use crate::config::WiringConfig;
use crate::core::outcome::Outcome;
use crate::core::stage::StageInstance;
use crate::core::variable::{assert_types_match, Variable};
use crate::error::Diagnostic;
use crate::wiring::wired_set::WiredVariableSet;
use crate::wiring::wired_variable::WiredStageVariable;

/// Where a linked value comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WirePath {
  GlobalInput(String),
  StageOutput { index: usize, name: String },
}

impl WirePath {
  pub fn wire_name(&self) -> &str {
    match self {
      WirePath::GlobalInput(name) | WirePath::StageOutput { name, .. } => name,
    }
  }
}

impl fmt::Display for WirePath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      WirePath::GlobalInput(name) => write!(f, "/inputs/{name}"),
      WirePath::StageOutput { index, name } => write!(f, "/stages/{index}/outputs/{name}"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireBinding {
  /// The slot already has a value.
  Bound,
  /// Take the value from the producer at this path.
  Link(WirePath),
  /// Use the slot's default.
  Default,
  /// Nothing to take a value from.
  Unbound,
}

/// One resolved slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Wire {
  var: WiredStageVariable,
  binding: WireBinding,
}

impl Wire {
  pub fn var(&self) -> &WiredStageVariable {
    &self.var
  }

  pub fn binding(&self) -> &WireBinding {
    &self.binding
  }
}

// Immutable after `Wiring::wire`; shared by every snapshot.
#[derive(Debug, PartialEq)]
pub(crate) struct WiringPlan {
  pub(crate) stage_names: Vec<String>,
  pub(crate) inputs: WiredVariableSet,
  pub(crate) outputs: WiredVariableSet,
  pub(crate) stage_inputs: Vec<WiredVariableSet>,
  pub(crate) stage_outputs: Vec<WiredVariableSet>,
  pub(crate) stage_wires: Vec<Vec<Wire>>,
  pub(crate) output_wires: Vec<Wire>,
  pub(crate) status: Outcome<()>,
  pub(crate) config: WiringConfig,
}

/// The wiring of a workflow plus the values bound so far.
///
/// Binding inputs or stage outputs never mutates a `Wiring`; it returns a new
/// snapshot that shares the plan with its predecessor.
#[derive(Debug, Clone, PartialEq)]
pub struct Wiring {
  pub(crate) plan: Arc<WiringPlan>,
  pub(crate) bound_inputs: Option<Arc<WiredVariableSet>>,
  pub(crate) bound_stages: Vec<Option<Arc<WiredVariableSet>>>,
}

impl Wiring {
  pub fn wire(inputs: &[Variable], outputs: &[Variable], stages: &[StageInstance]) -> Wiring {
    Self::wire_with(inputs, outputs, stages, &WiringConfig::default())
  }

  #[instrument(
    name = "Wiring::wire",
    skip_all,
    fields(
      num_inputs = inputs.len(),
      num_outputs = outputs.len(),
      num_stages = stages.len(),
    )
  )]
  pub fn wire_with(inputs: &[Variable], outputs: &[Variable], stages: &[StageInstance], config: &WiringConfig) -> Wiring {
    let builder = PlanBuilder {
      inputs: WiredVariableSet::from_variables(inputs),
      stage_outputs: stages.iter().map(WiredVariableSet::from_output).collect(),
      config: *config,
    };
    let stage_inputs: Vec<WiredVariableSet> = stages.iter().map(WiredVariableSet::from_input).collect();
    let outputs = WiredVariableSet::from_variables(outputs);

    let mut statuses = Vec::new();
    let stage_wires: Vec<Vec<Wire>> = stage_inputs
      .iter()
      .enumerate()
      .map(|(dex, slots)| {
        slots
          .iter()
          .map(|slot| {
            let label = format!("input `{}` of stage {} ({})", slot.local_name(), dex, stages[dex].name());
            let (wire, status) = builder.make_wire(dex, slot, &label);
            statuses.push(status);
            wire
          })
          .collect()
      })
      .collect();

    let output_wires: Vec<Wire> = outputs
      .iter()
      .map(|slot| {
        let label = format!("workflow output `{}`", slot.local_name());
        let (wire, status) = builder.make_wire(stages.len(), slot, &label);
        statuses.push(status);
        wire
      })
      .collect();

    let status = Outcome::all(statuses);
    event!(Level::DEBUG, severity = ?status.severity(), "Wiring built.");

    let PlanBuilder {
      inputs, stage_outputs, ..
    } = builder;
    Wiring {
      plan: Arc::new(WiringPlan {
        stage_names: stages.iter().map(|stage| stage.name().to_string()).collect(),
        inputs,
        outputs,
        stage_inputs,
        stage_outputs,
        stage_wires,
        output_wires,
        status,
        config: *config,
      }),
      bound_inputs: None,
      bound_stages: vec![None; stages.len()],
    }
  }

  /// Accumulated build-time diagnostics.
  pub fn status(&self) -> &Outcome<()> {
    &self.plan.status
  }

  pub fn config(&self) -> &WiringConfig {
    &self.plan.config
  }

  pub fn num_stages(&self) -> usize {
    self.plan.stage_names.len()
  }

  pub fn wires_for_stage(&self, index: usize) -> Option<&[Wire]> {
    self.plan.stage_wires.get(index).map(Vec::as_slice)
  }

  pub fn output_wires(&self) -> &[Wire] {
    &self.plan.output_wires
  }

  pub fn stage_inputs(&self, index: usize) -> Option<&WiredVariableSet> {
    self.plan.stage_inputs.get(index)
  }

  pub fn stage_outputs(&self, index: usize) -> Option<&WiredVariableSet> {
    self.plan.stage_outputs.get(index)
  }

  /// Stage outputs bound so far, `None` for stages that haven't run.
  pub fn bound_stage_outputs(&self, index: usize) -> Option<&WiredVariableSet> {
    self.bound_stages.get(index).and_then(Option::as_deref)
  }

  pub fn bound_inputs(&self) -> Option<&WiredVariableSet> {
    self.bound_inputs.as_deref()
  }
}

struct PlanBuilder {
  inputs: WiredVariableSet,
  stage_outputs: Vec<WiredVariableSet>,
  config: WiringConfig,
}

impl PlanBuilder {
  /// Producers of `wire_name` visible from stage `limit`, most recent first.
  fn producers(&self, limit: usize, wire_name: &str) -> Vec<(WirePath, &WiredStageVariable)> {
    let from_stages = self.stage_outputs[..limit]
      .iter()
      .enumerate()
      .rev()
      .filter_map(|(index, outputs)| {
        outputs.get_by_wire(wire_name).map(|var| {
          (
            WirePath::StageOutput {
              index,
              name: wire_name.to_string(),
            },
            var,
          )
        })
      });
    let from_inputs = self
      .inputs
      .get_by_wire(wire_name)
      .map(|var| (WirePath::GlobalInput(wire_name.to_string()), var));
    from_stages.chain(from_inputs).collect()
  }

  fn make_wire(&self, limit: usize, slot: &WiredStageVariable, label: &str) -> (Wire, Outcome<()>) {
    let mut status = if self.config.check_types {
      slot.assert_types_match(self.config.fail_on_explicit_mismatch)
    } else {
      Outcome::okay(())
    };

    let binding = if slot.is_bound() {
      WireBinding::Bound
    } else if let Some((path, producer)) = self.linked_producer(limit, slot, label, &mut status) {
      if self.config.check_types {
        let offered = producer.wire_var().unwrap_or_else(|| producer.local_var());
        status = status.keep_first(assert_types_match(
          slot.local_var(),
          offered,
          self.config.fail_on_explicit_mismatch,
        ));
      }
      WireBinding::Link(path)
    } else if slot.has_default() {
      WireBinding::Default
    } else {
      status = status.with_warning(Diagnostic::UnwiredVariable { slot: label.to_string() });
      WireBinding::Unbound
    };

    event!(Level::TRACE, slot = label, ?binding, "Slot wired.");
    (
      Wire {
        var: slot.clone(),
        binding,
      },
      status,
    )
  }

  fn linked_producer(
    &self,
    limit: usize,
    slot: &WiredStageVariable,
    label: &str,
    status: &mut Outcome<()>,
  ) -> Option<(WirePath, &WiredStageVariable)> {
    let wire_name = slot.wire_name()?;
    let mut producers = self.producers(limit, wire_name);
    if producers.is_empty() {
      return None;
    }
    if producers.len() > 1 && self.config.warn_on_shadowing {
      let candidates: Vec<String> = producers.iter().map(|(path, _)| path.to_string()).collect();
      event!(Level::WARN, slot = label, wire = wire_name, ?candidates, "Wire has several producers; using the most recent.");
      *status = std::mem::take(status).with_warning(Diagnostic::AmbiguousWiring {
        slot: label.to_string(),
        wire: wire_name.to_string(),
        candidates,
      });
    }
    Some(producers.swap_remove(0))
  }
}
