use quintet_graph::GraphError;
use thiserror::Error;

/// Errors that can occur while resolving a task to a verb.
#[derive(Debug, Error)]
pub enum ResolveError {
  /// The task does not exist in the case graph.
  #[error("unknown task: {task}")]
  UnknownTask { task: String },

  /// No pattern mapping matches the task's structure.
  #[error("no pattern mapping for task '{task}' ({signature})")]
  NoMapping { task: String, signature: String },

  /// More than one pattern mapping matches.
  #[error("ambiguous pattern mapping for task '{task}' ({signature}): {candidates:?}")]
  Ambiguous {
    task: String,
    signature: String,
    candidates: Vec<String>,
  },

  /// The mapping lacks a parameter its verb needs.
  #[error("pattern '{pattern}' is incomplete: {reason}")]
  IncompleteMapping { pattern: String, reason: String },

  /// The task's topology cannot be executed by its verb.
  #[error("malformed topology at task '{task}': {reason}")]
  MalformedTopology { task: String, reason: String },

  /// A design-time parameter is missing from the task.
  #[error("task '{task}' needs '{parameter}' for pattern '{pattern}'")]
  MissingParameter {
    task: String,
    pattern: String,
    parameter: &'static str,
  },

  /// A runtime parameter is missing from the case data.
  #[error("task '{task}' needs case data '{key}'")]
  MissingData { task: String, key: String },

  #[error("case data '{key}' for task '{task}' is invalid: {reason}")]
  InvalidData {
    task: String,
    key: String,
    reason: String,
  },

  #[error(transparent)]
  Graph(#[from] GraphError),
}
