// wireflow/examples/basic_workflow.rs

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use wireflow::{
  FunctionStage, Outcome, RecordingUi, Stage, StageExt, UiHandle, UiMessage, Value, VarType, Variable, VariableSet,
  WorkflowBuilder,
};

// 1. A stage written against the `Stage` trait.
struct RaiseToPower;

#[async_trait]
impl Stage for RaiseToPower {
  fn input_vars(&self) -> Vec<Variable> {
    vec![
      Variable::unbound("x").with_type(VarType::Int).with_default(0),
      Variable::unbound("pow").with_type(VarType::Int).with_default(1),
    ]
  }

  fn output_vars(&self) -> Vec<Variable> {
    vec![Variable::unbound("result").with_type(VarType::Int)]
  }

  async fn run(&self, inputs: VariableSet, _ui: &dyn UiHandle) -> Outcome<Vec<Variable>> {
    let (x, pow) = match (inputs.get_int("x"), inputs.get_int("pow")) {
      (Ok(x), Ok(pow)) => (x, pow),
      (Err(e), _) | (_, Err(e)) => return Outcome::fail([e]),
    };
    Outcome::okay(vec![Variable::bound("result", x.pow(pow as u32))])
  }
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Basic Workflow Example ---");

  // 2. A stage built from a closure.
  let make_base = FunctionStage::new("make_base", |_: &VariableSet| Ok(Value::Int(71))).returns(VarType::Int);

  // 3. Wire the stages by name: `x_wire` flows from the first stage into the
  //    second, `to_pow` comes from the workflow's own inputs.
  let ui = Arc::new(RecordingUi::new());
  let workflow = WorkflowBuilder::new("power")
    .given(["to_pow"])
    .from_stages([
      make_base.instance().to(["x_wire"]),
      RaiseToPower.with_args(["x_wire", "to_pow"]).to(["res_wire"]),
    ])
    .output_to(["res_wire"])
    .with_ui(ui.clone())
    .build();

  info!(status = %workflow.status(), "Workflow built.");

  // 4. Run it.
  let result = workflow.run(&[Variable::bound("to_pow", 2)]).await;
  match result.value().map(|outs| outs.get_int("res_wire")) {
    Some(Ok(res)) => info!(res, "Workflow finished."),
    _ => info!(%result, "Workflow didn't produce a result."),
  }

  // 5. Problems are collected, not thrown.
  let halve = FunctionStage::new("halve", |inputs: &VariableSet| Ok(Value::Int(inputs.get_int("value")? / 2)))
    .input(Variable::unbound("value").with_type(VarType::Int))
    .returns(VarType::Int);
  let broken = WorkflowBuilder::new("broken")
    .from_stages([halve.with_args(["nobody_produces_this"]).to(["half"])])
    .output_to(["half"])
    .with_ui(ui.clone())
    .build();
  info!(status = %broken.status(), "Second workflow built with an unwired input.");
  let result = broken.run(&[]).await;
  info!(%result, "Second workflow ran.");

  for message in ui.messages() {
    if let UiMessage::Report(report) = message {
      info!(%report, "UI saw a report.");
    }
  }
}
