// wireflow/src/wiring/resolution.rs

//! Runtime side of `Wiring`: binding values and resolving a stage's inputs.

use std::sync::Arc;

use tracing::{event, instrument, Level};

use crate::core::outcome::Outcome;
use crate::core::value::Value;
use crate::core::variable::Variable;
use crate::core::variable_set::VariableSet;
use crate::error::Diagnostic;
use crate::wiring::definition::{Wire, WireBinding, WirePath, Wiring};
use crate::wiring::wired_variable::WiredStageVariable;

impl Wiring {
  /// Binds workflow input values by name. Values that match no declared
  /// input are ignored with an `UnknownInput` warning.
  #[instrument(name = "Wiring::bind_inputs", skip_all, fields(num_values = values.len()))]
  pub fn bind_inputs(&self, values: &[Variable]) -> Outcome<Wiring> {
    let unknown: Vec<Diagnostic> = values
      .iter()
      .filter(|value| self.plan.inputs.get_by_wire(value.name()).is_none())
      .map(|value| Diagnostic::UnknownInput {
        name: value.name().to_string(),
      })
      .collect();

    let next = Wiring {
      bound_inputs: Some(Arc::new(self.plan.inputs.bind_wire(values))),
      ..self.clone()
    };
    Outcome::okay(next).with_warnings(unknown)
  }

  /// Records the outputs stage `index` produced, matched by local name.
  #[instrument(name = "Wiring::bind_stage", skip(self, outputs), fields(num_outputs = outputs.len()))]
  pub fn bind_stage(&self, index: usize, outputs: &[Variable]) -> Outcome<Wiring> {
    let Some(declared) = self.plan.stage_outputs.get(index) else {
      event!(Level::ERROR, "No stage at this index.");
      return Outcome::fail([no_such_stage(index)]);
    };

    let mut bound_stages = self.bound_stages.clone();
    bound_stages[index] = Some(Arc::new(declared.bind_local(outputs)));
    Outcome::okay(Wiring {
      bound_stages,
      ..self.clone()
    })
  }

  /// Resolves the inputs of stage `index` and re-binds them onto the stage's
  /// declared input variables.
  ///
  /// A slot that resolves to no value is passed through unbound with an
  /// `UnwiredVariable` warning; the stage is expected to fail on it if it
  /// needs it. Linking to a stage that hasn't run yet is a `Lookup` failure.
  pub fn get_stage_inputs(&self, index: usize) -> Outcome<VariableSet> {
    let Some(wires) = self.plan.stage_wires.get(index) else {
      return Outcome::fail([no_such_stage(index)]);
    };
    let stage = &self.plan.stage_names[index];
    self.resolve_slots(wires, |local| format!("input `{local}` of stage {index} ({stage})"))
  }

  /// Resolves the workflow outputs.
  pub fn get_outputs(&self) -> Outcome<VariableSet> {
    self.resolve_slots(&self.plan.output_wires, |local| format!("workflow output `{local}`"))
  }

  fn resolve_slots(&self, wires: &[Wire], label: impl Fn(&str) -> String) -> Outcome<VariableSet> {
    let resolved: Outcome<Vec<Option<Value>>> = wires.iter().map(|wire| self.resolve(wire)).collect();
    resolved.flat_map(|values| {
      let mut unwired = Vec::new();
      let vars: Vec<Variable> = wires
        .iter()
        .zip(values)
        .map(|(wire, value)| match value {
          Some(value) => wire.var().bind(&value).local_var().clone(),
          None => {
            unwired.push(Diagnostic::UnwiredVariable {
              slot: label(wire.var().local_name()),
            });
            wire.var().local_var().clone()
          }
        })
        .collect();
      Outcome::okay(VariableSet::new(vars)).with_warnings(unwired)
    })
  }

  fn resolve(&self, wire: &Wire) -> Outcome<Option<Value>> {
    match wire.binding() {
      WireBinding::Bound | WireBinding::Default | WireBinding::Unbound => Outcome::okay(wire.var().val().cloned()),
      WireBinding::Link(path) => self
        .lookup(path)
        .map(|producer| producer.val().or_else(|| wire.var().val()).cloned()),
    }
  }

  fn lookup(&self, path: &WirePath) -> Outcome<&WiredStageVariable> {
    let (found, note) = match path {
      WirePath::GlobalInput(name) => (
        self.bound_inputs.as_deref().and_then(|inputs| inputs.get_by_wire(name)),
        "workflow inputs haven't been bound",
      ),
      WirePath::StageOutput { index, name } => (
        self
          .bound_stages
          .get(*index)
          .and_then(Option::as_deref)
          .and_then(|outputs| outputs.get_by_wire(name)),
        "producing stage hasn't run",
      ),
    };
    match found {
      Some(var) => Outcome::okay(var),
      None => Outcome::fail([Diagnostic::Lookup {
        path: path.to_string(),
        note: note.to_string(),
      }]),
    }
  }
}

fn no_such_stage(index: usize) -> Diagnostic {
  Diagnostic::Lookup {
    path: format!("/stages/{index}"),
    note: "no such stage".to_string(),
  }
}
