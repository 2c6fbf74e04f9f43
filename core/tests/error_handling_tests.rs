// tests/error_handling_tests.rs
mod common;
use common::*;
use serial_test::serial;
use wireflow::{
  ConfigError, Diagnostic, NullUi, Outcome, RecordingUi, TracingUi, UiHandle, UiMessage, UiResponse, Variable, WiringConfig,
};

#[test]
fn test_diagnostic_messages_name_the_culprit() {
  setup_tracing();
  let unbound = Diagnostic::UnboundVariable {
    var: Box::new(Variable::unbound("x")),
    note: "while running stage 2".to_string(),
  };
  assert_eq!(
    unbound.to_string(),
    "can't get the value of `x`: it is unbound and has no default (while running stage 2)"
  );
  assert_eq!(unbound.kind(), "UnboundVariable");

  let failure = Diagnostic::stage_failure("load", "disk on fire");
  assert_eq!(failure.to_string(), "stage `load` failed: disk on fire");
}

#[test]
fn test_anyhow_errors_become_stage_failures() {
  let err = anyhow::anyhow!("inner problem").context("outer context");
  let diag = Diagnostic::from(err);
  match &diag {
    Diagnostic::StageFailure { stage: None, message } => {
      assert!(message.contains("outer context"));
      assert!(message.contains("inner problem"));
    }
    other => panic!("expected StageFailure, got {other:?}"),
  }
  assert_eq!(
    diag.in_stage("loader"),
    Diagnostic::StageFailure {
      stage: Some("loader".to_string()),
      message: "outer context: inner problem".to_string(),
    }
  );
}

#[test]
fn test_diagnostics_survive_a_trip_through_anyhow() {
  let original = Diagnostic::NoSuchVariable { name: "y".to_string() };
  let wrapped = anyhow::Error::new(original.clone());
  assert_eq!(Diagnostic::from(wrapped), original);
}

#[test]
fn test_malformed_workflow_message_includes_reasons() {
  let reason = Outcome::<()>::fail([Diagnostic::NoSuchVariable { name: "y".to_string() }]);
  let diag = Diagnostic::MalformedWorkflow {
    workflow: "wf".to_string(),
    reason: Box::new(reason),
  };
  let rendered = diag.to_string();
  assert!(rendered.starts_with("workflow `wf` is malformed"));
  assert!(rendered.contains("no variable named `y`"));
}

#[tokio::test]
async fn test_headless_uis_answer_with_defaults() {
  let notice = NullUi.display(UiMessage::Notice("hello".to_string())).await;
  assert_eq!(notice, Outcome::okay(UiResponse::Acknowledged));

  let warned = Outcome::warn([Diagnostic::UnknownInput { name: "z".to_string() }], ());
  let confirm = UiMessage::ContinueConfirm {
    result: warned,
    can_override_warnings: true,
    can_override_errors: false,
  };
  assert_eq!(TracingUi.display(confirm).await, Outcome::okay(UiResponse::Confirmed(true)));

  let refuse = UiMessage::ContinueConfirm {
    result: Outcome::fail([Diagnostic::EmptyValue]),
    can_override_warnings: true,
    can_override_errors: false,
  };
  assert_eq!(refuse.default_response(), UiResponse::Confirmed(false));
}

#[tokio::test]
async fn test_every_shipped_ui_answers_every_message() {
  let messages = [
    UiMessage::Notice("n".to_string()),
    UiMessage::Report(Outcome::fail([Diagnostic::EmptyValue])),
    UiMessage::ContinueConfirm {
      result: Outcome::okay(()),
      can_override_warnings: false,
      can_override_errors: false,
    },
  ];
  let recording = RecordingUi::new();
  let uis: [&dyn UiHandle; 3] = [&NullUi, &TracingUi, &recording];
  for ui in uis {
    for message in messages.clone() {
      let expected = message.default_response();
      let answer = ui.display(message).await;
      assert!(answer.is_okay());
      assert_eq!(answer.into_value(), Some(expected));
    }
  }
  assert_eq!(recording.len(), messages.len());
}

// --- Configuration ---

fn clear_env() {
  for var in [
    wireflow::config::ENV_CHECK_TYPES,
    wireflow::config::ENV_FAIL_ON_EXPLICIT_MISMATCH,
    wireflow::config::ENV_WARN_ON_SHADOWING,
  ] {
    std::env::remove_var(var);
  }
}

#[test]
#[serial]
fn test_config_from_env_defaults() {
  clear_env();
  let config = WiringConfig::from_env().expect("config");
  assert_eq!(config, WiringConfig::default());
  assert!(config.check_types && config.fail_on_explicit_mismatch && config.warn_on_shadowing);
}

#[test]
#[serial]
fn test_config_from_env_overrides() {
  clear_env();
  std::env::set_var(wireflow::config::ENV_CHECK_TYPES, "off");
  std::env::set_var(wireflow::config::ENV_WARN_ON_SHADOWING, " No ");
  let config = WiringConfig::from_env().expect("config");
  clear_env();
  assert!(!config.check_types);
  assert!(config.fail_on_explicit_mismatch);
  assert!(!config.warn_on_shadowing);
}

#[test]
#[serial]
fn test_config_from_env_rejects_garbage() {
  clear_env();
  std::env::set_var(wireflow::config::ENV_FAIL_ON_EXPLICIT_MISMATCH, "maybe");
  let result = WiringConfig::from_env();
  clear_env();
  match result {
    Err(ConfigError::InvalidBool { var, value }) => {
      assert_eq!(var, "WIREFLOW_FAIL_ON_EXPLICIT_MISMATCH");
      assert_eq!(value, "maybe");
    }
    other => panic!("expected InvalidBool, got {other:?}"),
  }
}

#[test]
fn test_config_deserializes_with_missing_fields() {
  let config: WiringConfig = serde_json::from_str(r#"{ "check_types": false }"#).expect("config");
  assert!(!config.check_types);
  assert!(config.fail_on_explicit_mismatch);
}
