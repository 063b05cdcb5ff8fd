use std::fmt;

use serde::{Deserialize, Serialize};

/// Split or join behaviour of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlType {
  And,
  Xor,
  Or,
}

impl ControlType {
  pub fn as_str(&self) -> &'static str {
    match self {
      ControlType::And => "and",
      ControlType::Xor => "xor",
      ControlType::Or => "or",
    }
  }
}

impl fmt::Display for ControlType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Whether a trigger signal is used up by the task it enables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMode {
  #[default]
  Transient,
  Persistent,
}

impl TriggerMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      TriggerMode::Transient => "transient",
      TriggerMode::Persistent => "persistent",
    }
  }
}

impl fmt::Display for TriggerMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
