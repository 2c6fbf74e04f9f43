// wireflow/src/config.rs

//! Wiring behaviour switches.
//!
//! `WiringConfig` can be built in code, deserialized with serde, or read from
//! the environment with `WiringConfig::from_env()`:
//!
//! | variable                             | field                       |
//! |--------------------------------------|-----------------------------|
//! | `WIREFLOW_CHECK_TYPES`               | `check_types`               |
//! | `WIREFLOW_FAIL_ON_EXPLICIT_MISMATCH` | `fail_on_explicit_mismatch` |
//! | `WIREFLOW_WARN_ON_SHADOWING`         | `warn_on_shadowing`         |
//!
//! Unset variables keep their defaults (all `true`).

use std::env::{self, VarError};

use serde::{Deserialize, Serialize};
use tracing::{event, Level};

use crate::error::{ConfigError, ConfigResult};

pub const ENV_CHECK_TYPES: &str = "WIREFLOW_CHECK_TYPES";
pub const ENV_FAIL_ON_EXPLICIT_MISMATCH: &str = "WIREFLOW_FAIL_ON_EXPLICIT_MISMATCH";
pub const ENV_WARN_ON_SHADOWING: &str = "WIREFLOW_WARN_ON_SHADOWING";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WiringConfig {
  /// Compare producer and consumer types while wiring.
  pub check_types: bool,
  /// Treat a mismatch between two explicit types as a failure rather than a
  /// warning.
  pub fail_on_explicit_mismatch: bool,
  /// Warn when more than one upstream producer offers the same wire name.
  pub warn_on_shadowing: bool,
}

impl Default for WiringConfig {
  fn default() -> Self {
    Self {
      check_types: true,
      fail_on_explicit_mismatch: true,
      warn_on_shadowing: true,
    }
  }
}

impl WiringConfig {
  pub fn from_env() -> ConfigResult<Self> {
    let defaults = Self::default();
    let config = Self {
      check_types: env_flag(ENV_CHECK_TYPES, defaults.check_types)?,
      fail_on_explicit_mismatch: env_flag(ENV_FAIL_ON_EXPLICIT_MISMATCH, defaults.fail_on_explicit_mismatch)?,
      warn_on_shadowing: env_flag(ENV_WARN_ON_SHADOWING, defaults.warn_on_shadowing)?,
    };
    event!(Level::DEBUG, ?config, "Loaded wiring config from environment.");
    Ok(config)
  }
}

fn env_flag(var: &str, default: bool) -> ConfigResult<bool> {
  match env::var(var) {
    Ok(raw) => parse_flag(var, &raw),
    Err(VarError::NotPresent) => Ok(default),
    Err(source) => Err(ConfigError::Env {
      var: var.to_string(),
      source,
    }),
  }
}

fn parse_flag(var: &str, raw: &str) -> ConfigResult<bool> {
  match raw.trim().to_ascii_lowercase().as_str() {
    "1" | "true" | "yes" | "on" => Ok(true),
    "0" | "false" | "no" | "off" => Ok(false),
    _ => Err(ConfigError::InvalidBool {
      var: var.to_string(),
      value: raw.to_string(),
    }),
  }
}
