use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::flow::{FlowDef, RegionDef};
use crate::task::TaskDef;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDef {
  pub workflow_id: String,
  pub name: String,
  pub tasks: Vec<TaskDef>,
  #[serde(default)]
  pub flows: Vec<FlowDef>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub regions: Vec<RegionDef>,
  /// External signal nodes that trigger tasks.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub signals: Vec<String>,
  /// Tasks that receive a token when the case starts.
  #[serde(default)]
  pub start: Vec<String>,
}

impl WorkflowDef {
  pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.display().to_string(),
      source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Json {
      path: path.display().to_string(),
      source,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::enums::{ControlType, TriggerMode};
  use serde_json::json;

  #[test]
  fn test_deserialize_minimal_workflow() {
    let def: WorkflowDef = serde_json::from_value(json!({
      "workflow_id": "wf-1",
      "name": "order",
      "tasks": [{ "task_id": "A" }, { "task_id": "B" }],
      "flows": [{ "from": "A", "to": "B" }],
      "start": ["A"]
    }))
    .unwrap();

    assert_eq!(def.tasks[1], TaskDef::new("B"));
    assert_eq!(def.flows[0], FlowDef::new("A", "B"));
    assert!(def.regions.is_empty());
  }

  #[test]
  fn test_deserialize_full_task() {
    let task: TaskDef = serde_json::from_value(json!({
      "task_id": "D",
      "join": "and",
      "split": "xor",
      "triggered_by": ["S"],
      "trigger_mode": "persistent",
      "instances": { "count_key": "items" },
      "quorum": 2,
      "cancels_regions": ["R1"]
    }))
    .unwrap();

    assert_eq!(task.join, Some(ControlType::And));
    assert_eq!(task.split, Some(ControlType::Xor));
    assert_eq!(task.trigger_mode, Some(TriggerMode::Persistent));
    assert_eq!(task.instances.and_then(|i| i.count_key).as_deref(), Some("items"));
    assert_eq!(task.quorum, Some(2));
  }

  #[test]
  fn test_flow_serialization_skips_defaults() {
    let flow = FlowDef::new("A", "B").with_predicate("x > 1");
    assert_eq!(
      serde_json::to_value(&flow).unwrap(),
      json!({ "from": "A", "to": "B", "predicate": "x > 1", "ordering": 0 })
    );

    let fallback = FlowDef::new("A", "C").with_ordering(2).as_default();
    let back: FlowDef = serde_json::from_value(serde_json::to_value(&fallback).unwrap()).unwrap();
    assert_eq!(back, fallback);
  }

  #[test]
  fn test_from_json_file_missing() {
    let err = WorkflowDef::from_json_file(Path::new("/nonexistent/wf.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
  }
}
