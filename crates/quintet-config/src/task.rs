use serde::{Deserialize, Serialize};

use crate::enums::{ControlType, TriggerMode};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDef {
  pub task_id: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub split: Option<ControlType>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub join: Option<ControlType>,
  /// Explicit pattern name; overrides the split/join markers.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub pattern: Option<String>,
  /// Signals that enable this task.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub triggered_by: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub trigger_mode: Option<TriggerMode>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub instances: Option<InstancesDef>,
  /// Fixed quorum for partial joins.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub quorum: Option<u32>,
  /// Case data key holding the quorum for dynamic partial joins.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub quorum_key: Option<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub cancels_regions: Vec<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub cancels_instances_of: Vec<String>,
}

impl TaskDef {
  pub fn new(task_id: impl Into<String>) -> Self {
    Self {
      task_id: task_id.into(),
      ..Default::default()
    }
  }
}

/// Multi-instance settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstancesDef {
  /// Design-time instance count.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub count: Option<u32>,
  /// Case data key holding the runtime instance count.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub count_key: Option<String>,
}
