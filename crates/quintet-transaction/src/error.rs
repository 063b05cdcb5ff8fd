use quintet_driver::ResolveError;
use quintet_graph::GraphError;
use quintet_kernel::VerbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransactionError {
  #[error("chain integrity violated in lineage '{lineage}': expected prev_hash {expected}, found {found}")]
  ChainIntegrity {
    lineage: String,
    expected: String,
    found: String,
  },

  #[error("transaction '{tx_id}' was already committed in lineage '{lineage}'")]
  DuplicateTransaction { lineage: String, tx_id: String },

  #[error("receipt for transaction '{tx_id}' in lineage '{lineage}' does not match its merkle root")]
  TamperedReceipt { lineage: String, tx_id: String },

  #[error("failed to encode operation parameters: {0}")]
  Encode(#[from] serde_json::Error),

  #[error("stimulus references unknown node '{node}'")]
  UnknownNode { node: String },

  #[error(transparent)]
  Resolve(#[from] ResolveError),

  #[error(transparent)]
  Verb(#[from] VerbError),

  #[error(transparent)]
  Graph(#[from] GraphError),
}
