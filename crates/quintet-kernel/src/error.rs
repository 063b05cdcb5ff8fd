use quintet_graph::GraphError;
use quintet_predicate::PredicateError;
use thiserror::Error;

/// Errors a verb can raise for an otherwise well-formed firing.
#[derive(Debug, Error)]
pub enum VerbError {
  #[error("predicate on flow '{flow}' failed: {source}")]
  Predicate {
    flow: String,
    #[source]
    source: PredicateError,
  },

  #[error("no flow selected from task '{task}': no predicate held and there is no default flow")]
  NoFlowSelected { task: String },

  #[error(transparent)]
  Graph(#[from] GraphError),
}
