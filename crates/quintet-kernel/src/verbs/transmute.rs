use quintet_graph::{Graph, NodeId};

use crate::context::TransactionContext;
use crate::delta::QuadDelta;
use crate::error::VerbError;
use crate::topology::successors;

use super::advance;

/// Move the task's token along its outgoing flows.
///
/// A task with no outgoing flow yields an empty delta: the token stays where
/// it is and the branch has simply run out of work.
pub fn transmute(
  graph: &Graph,
  task: &NodeId,
  ctx: &TransactionContext,
) -> Result<QuadDelta, VerbError> {
  let targets = successors(graph, task)?;
  if targets.is_empty() {
    return Ok(QuadDelta::empty());
  }
  Ok(advance(task, targets, ctx))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::verbs::fixtures::{CaseGraph, ctx, node};
  use quintet_graph::{Triple, vocab};

  #[test]
  fn test_moves_token_to_successor() {
    let graph = CaseGraph::new().flow("A", "B").token("A").build();
    let delta = transmute(&graph, &node("A"), &ctx("tx-1")).unwrap();

    assert_eq!(delta.removals(), &[Triple::token("A")]);
    assert_eq!(
      delta.additions(),
      &[
        Triple::token("B"),
        Triple::marker("A", vocab::COMPLETED_AT, "tx-1"),
      ]
    );
  }

  #[test]
  fn test_no_successor_is_empty_delta() {
    let graph = CaseGraph::new().flow("A", "B").token("B").build();
    let delta = transmute(&graph, &node("B"), &ctx("tx-1")).unwrap();
    assert!(delta.is_empty());
  }

  #[test]
  fn test_self_loop_keeps_token() {
    let graph = CaseGraph::new().flow("A", "A").token("A").build();
    let delta = transmute(&graph, &node("A"), &ctx("tx-1")).unwrap();
    assert!(delta.removals().is_empty());
    assert!(delta.additions().contains(&Triple::token("A")));
  }

  #[test]
  fn test_instance_follows_parent_flows() {
    let graph = CaseGraph::new()
      .flow("A", "B")
      .triple(Triple::new("A[0]", vocab::INSTANCE_OF, quintet_graph::Term::node("A")))
      .token("A[0]")
      .build();
    let delta = transmute(&graph, &node("A[0]"), &ctx("tx-2")).unwrap();
    assert_eq!(delta.removals(), &[Triple::token("A[0]")]);
    assert_eq!(delta.additions()[0], Triple::token("B"));
  }
}
