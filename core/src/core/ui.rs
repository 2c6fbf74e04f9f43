// wireflow/src/core/ui.rs

//! The user-interaction boundary.
//!
//! The engine never talks to a terminal directly. It sends `UiMessage`s to a
//! `UiHandle`, which is free to render them however it likes and answers with
//! an `Outcome<UiResponse>`. Three handles ship with the crate:
//!  - `NullUi` swallows everything (headless runs).
//!  - `TracingUi` turns messages into `tracing` events. It is the default.
//!  - `RecordingUi` keeps every message in memory for later inspection.

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{event, Level};

use crate::core::outcome::{Outcome, Severity};

#[derive(Debug, Clone, PartialEq)]
pub enum UiMessage {
  /// Free-form text for the user.
  Notice(String),
  /// A status to report, typically a stage failure or a warning summary.
  Report(Outcome<()>),
  /// Ask whether to carry on given `result`.
  ContinueConfirm {
    result: Outcome<()>,
    can_override_warnings: bool,
    can_override_errors: bool,
  },
}

impl UiMessage {
  /// The answer a handle gives when nobody is there to ask. `ContinueConfirm`
  /// continues on `Okay`, and on `Warn`/`Fail` only if overriding is allowed.
  pub fn default_response(&self) -> UiResponse {
    match self {
      UiMessage::Notice(_) | UiMessage::Report(_) => UiResponse::Acknowledged,
      UiMessage::ContinueConfirm {
        result,
        can_override_warnings,
        can_override_errors,
      } => UiResponse::Confirmed(match result.severity() {
        Severity::Okay => true,
        Severity::Warn => *can_override_warnings,
        Severity::Fail => *can_override_errors,
      }),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiResponse {
  Acknowledged,
  Confirmed(bool),
}

#[async_trait]
pub trait UiHandle: Send + Sync {
  async fn display(&self, message: UiMessage) -> Outcome<UiResponse>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullUi;

#[async_trait]
impl UiHandle for NullUi {
  async fn display(&self, message: UiMessage) -> Outcome<UiResponse> {
    Outcome::okay(message.default_response())
  }
}

/// Emits each message as a `tracing` event at a level matching its severity.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingUi;

#[async_trait]
impl UiHandle for TracingUi {
  async fn display(&self, message: UiMessage) -> Outcome<UiResponse> {
    match &message {
      UiMessage::Notice(text) => event!(Level::INFO, notice = %text, "Workflow notice."),
      UiMessage::Report(result) | UiMessage::ContinueConfirm { result, .. } => match result.severity() {
        Severity::Okay => event!(Level::INFO, %result, "Workflow report."),
        Severity::Warn => event!(Level::WARN, %result, "Workflow report with warnings."),
        Severity::Fail => event!(Level::ERROR, %result, "Workflow report with errors."),
      },
    }
    Outcome::okay(message.default_response())
  }
}

/// Keeps a copy of every message it is shown.
#[derive(Debug, Default)]
pub struct RecordingUi {
  messages: Mutex<Vec<UiMessage>>,
}

impl RecordingUi {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn messages(&self) -> Vec<UiMessage> {
    self.messages.lock().clone()
  }

  pub fn len(&self) -> usize {
    self.messages.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.messages.lock().is_empty()
  }

  pub fn clear(&self) {
    self.messages.lock().clear();
  }
}

#[async_trait]
impl UiHandle for RecordingUi {
  async fn display(&self, message: UiMessage) -> Outcome<UiResponse> {
    let response = message.default_response();
    self.messages.lock().push(message);
    Outcome::okay(response)
  }
}
