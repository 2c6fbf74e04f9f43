pub mod definition;
pub mod execution;

pub use definition::{Workflow, WorkflowBuilder};
pub use execution::{Execution, RunState};
