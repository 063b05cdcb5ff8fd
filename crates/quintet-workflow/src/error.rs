use quintet_config::ControlType;
use quintet_predicate::PredicateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
  #[error("duplicate node id: {node_id}")]
  DuplicateNodeId { node_id: String },

  #[error("flow references unknown task: from={from}, to={to}")]
  InvalidFlow { from: String, to: String },

  #[error("duplicate flow: from={from}, to={to}")]
  DuplicateFlow { from: String, to: String },

  #[error("task '{task_id}' references unknown {kind} '{target}'")]
  UnknownReference {
    task_id: String,
    kind: &'static str,
    target: String,
  },

  #[error("task '{task_id}' combines a '{join}' join with a '{split}' split")]
  ConflictingRouting {
    task_id: String,
    join: ControlType,
    split: ControlType,
  },

  #[error("region '{region_id}' lists unknown member '{node_id}'")]
  UnknownRegionMember { region_id: String, node_id: String },

  #[error("start node '{node_id}' is not a task")]
  InvalidStart { node_id: String },

  #[error("invalid predicate on flow {from} -> {to}: {source}")]
  InvalidPredicate {
    from: String,
    to: String,
    #[source]
    source: PredicateError,
  },

  #[error("no entry points found (every task has an incoming flow or trigger)")]
  NoEntryPoints,
}
