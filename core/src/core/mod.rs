pub mod function_stage;
pub mod option;
pub mod outcome;
pub mod stage;
pub mod traced;
pub mod ui;
pub mod value;
pub mod variable;
pub mod variable_set;

// Re-export key types for easier access from the wiring and workflow modules
pub use function_stage::FunctionStage;
pub use option::{IntoOption, OptionExt};
pub use outcome::{Outcome, Severity};
pub use stage::{Stage, StageExt, StageInstance};
pub use traced::Traced;
pub use ui::{NullUi, RecordingUi, TracingUi, UiHandle, UiMessage, UiResponse};
pub use value::{common_type, ClassType, Value, VarType};
pub use variable::{assert_types_match, VarRef, Variable};
pub use variable_set::VariableSet;
