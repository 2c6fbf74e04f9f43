// wireflow/src/wiring/mod.rs

//! Connects stage inputs to upstream stage outputs and workflow inputs by
//! wire name, and resolves those connections while a workflow runs.

pub mod definition;
pub mod resolution;
pub mod wired_set;
pub mod wired_variable;

pub use definition::{Wire, WireBinding, WirePath, Wiring};
pub use wired_set::WiredVariableSet;
pub use wired_variable::WiredStageVariable;
