// src/lib.rs

//! Wireflow: an async workflow engine that wires stages together by name.
//!
//! Wireflow lets you describe a process as an ordered list of stages, each
//! with declared inputs and outputs, and connects them automatically:
//!  - Stage inputs are matched to upstream outputs (or workflow inputs) by wire name.
//!  - Later producers shadow earlier ones; stages never read from the future.
//!  - Types are inferred or declared, and checked while wiring.
//!  - Problems are accumulated as warnings and errors in an `Outcome`, not raised.
//!  - A failing, or panicking, stage stops the run and is reported through a `UiHandle`.
//!  - Every run keeps immutable wiring snapshots for later inspection.

pub mod config;
pub mod core;
pub mod error;
pub mod wiring;
pub mod workflow;

// --- Re-exports for the Public API ---

// Outcome algebra and diagnostics
pub use crate::core::outcome::{Outcome, Severity};
pub use crate::core::traced::Traced;
pub use crate::error::{ConfigError, ConfigResult, Diagnostic};

// Data model
pub use crate::core::option::{IntoOption, OptionExt};
pub use crate::core::value::{common_type, ClassType, Value, VarType};
pub use crate::core::variable::{assert_types_match, VarRef, Variable};
pub use crate::core::variable_set::VariableSet;

// Stages and the UI boundary
pub use crate::core::function_stage::FunctionStage;
pub use crate::core::stage::{Stage, StageExt, StageInstance};
pub use crate::core::ui::{NullUi, RecordingUi, TracingUi, UiHandle, UiMessage, UiResponse};

// Wiring and workflows
pub use crate::config::WiringConfig;
pub use crate::wiring::{WireBinding, WirePath, WiredStageVariable, WiredVariableSet, Wiring};
pub use crate::workflow::{Execution, RunState, Workflow, WorkflowBuilder};

/*
    Core Workflow:
    1. Implement `Stage` for each unit of work (or wrap a closure in `FunctionStage`),
       declaring its input and output variables.
    2. Place each stage with `StageInstance::new(stage)`, binding its slots to wire
       names with `.args([...])`, `.kwarg(..)`, `.to([...])` or `.implicit()`.
    3. Build the workflow:
       `WorkflowBuilder::new("name").given(["a"]).from_stages([...]).output_to(["b"]).build()`.
    4. Inspect `workflow.status()` for wiring warnings; a `Fail` status means the
       workflow won't run.
    5. Run it with `workflow.run(&[Variable::bound("a", 1)]).await` and match on the
       returned `Outcome<VariableSet>`.
*/
