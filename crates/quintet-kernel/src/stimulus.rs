use serde::Serialize;

use quintet_graph::{NodeId, Triple, vocab};

use crate::context::TransactionContext;
use crate::delta::QuadDelta;

/// Input from the environment that is recorded in the lineage like a verb.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "stimulus", rename_all = "snake_case")]
pub enum Stimulus {
  /// Start a case by placing tokens on its entry tasks.
  Start { nodes: Vec<NodeId> },
  /// An external signal fired: it becomes live and completed.
  Signal { node: NodeId },
}

impl Stimulus {
  pub fn name(&self) -> &'static str {
    match self {
      Stimulus::Start { .. } => "start",
      Stimulus::Signal { .. } => "signal",
    }
  }

  pub fn delta(&self, ctx: &TransactionContext) -> QuadDelta {
    match self {
      Stimulus::Start { nodes } => QuadDelta::new(nodes.iter().map(Triple::token), []),
      Stimulus::Signal { node } => QuadDelta::new(
        [
          Triple::token(node),
          Triple::marker(node, vocab::COMPLETED_AT, &ctx.tx_id),
        ],
        [],
      ),
    }
  }
}
