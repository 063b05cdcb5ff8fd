use std::collections::BTreeSet;

use quintet_graph::{Graph, NodeId, Triple, vocab};
use quintet_ontology::CancellationScope;

use crate::context::TransactionContext;
use crate::delta::QuadDelta;
use crate::error::VerbError;
use crate::topology::{instances_of, parent_of, successors};

/// Cancel every token in the selected scope.
///
/// Each selected node that holds a token loses it and is marked `voidedAt`.
/// Nodes without a token are left alone. For `region` and `instances` scopes
/// the firing task is not part of what it cancels: it completes normally and
/// passes control to its successors.
pub fn void(
  graph: &Graph,
  task: &NodeId,
  ctx: &TransactionContext,
  scope: CancellationScope,
) -> Result<QuadDelta, VerbError> {
  let selected = select(graph, task, scope);

  let mut additions = Vec::new();
  let mut removals = Vec::new();
  for node in selected.iter().filter(|n| graph.has_token(n.as_str())) {
    removals.push(Triple::token(*node));
    additions.push(Triple::marker(*node, vocab::VOIDED_AT, &ctx.tx_id));
  }

  let cancels_others = matches!(scope, CancellationScope::Region | CancellationScope::Instances);
  if cancels_others && !selected.contains(&task) {
    for target in successors(graph, task)? {
      additions.push(Triple::token(target));
    }
    additions.push(Triple::marker(task, vocab::COMPLETED_AT, &ctx.tx_id));
    if graph.has_token(task.as_str()) {
      removals.push(Triple::token(task));
    }
  }

  Ok(QuadDelta::new(additions, removals))
}

fn select<'g>(graph: &'g Graph, task: &'g NodeId, scope: CancellationScope) -> BTreeSet<&'g NodeId> {
  match scope {
    CancellationScope::SelfTask | CancellationScope::Task => BTreeSet::from([task]),
    CancellationScope::Region => {
      let mut nodes = BTreeSet::new();
      for region in graph.object_nodes(task.as_str(), vocab::CANCELS_REGION) {
        for member in graph.object_nodes(region.as_str(), vocab::HAS_MEMBER) {
          nodes.insert(member);
          nodes.extend(instances_of(graph, member.as_str()));
        }
      }
      nodes
    }
    CancellationScope::Instances => {
      // Siblings when fired from an instance, otherwise the declared targets,
      // otherwise the task's own instances.
      let parents: Vec<&NodeId> = match parent_of(graph, task.as_str()) {
        Some(parent) => vec![parent],
        None => {
          let targets: Vec<&NodeId> = graph
            .object_nodes(task.as_str(), vocab::CANCELS_INSTANCES_OF)
            .collect();
          if targets.is_empty() { vec![task] } else { targets }
        }
      };
      parents
        .into_iter()
        .flat_map(|parent| instances_of(graph, parent.as_str()))
        .collect()
    }
    CancellationScope::Case => graph.token_holders().into_iter().collect(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::verbs::fixtures::{CaseGraph, apply, ctx, node};
  use quintet_graph::Term;

  #[test]
  fn test_cancel_self() {
    let graph = CaseGraph::new().token("A").token("B").build();
    let delta = void(&graph, &node("A"), &ctx("tx-1"), CancellationScope::SelfTask).unwrap();
    assert_eq!(delta.removals(), &[Triple::token("A")]);
    assert_eq!(
      delta.additions(),
      &[Triple::marker("A", vocab::VOIDED_AT, "tx-1")]
    );
  }

  #[test]
  fn test_cancel_case_clears_every_token() {
    let mut graph = CaseGraph::new()
      .token("A")
      .token("B")
      .token("C[0]")
      .completed("Z", "tx-0")
      .build();
    let delta = void(&graph, &node("A"), &ctx("tx-1"), CancellationScope::Case).unwrap();
    apply(&mut graph, &delta);

    assert!(graph.token_holders().is_empty());
    for n in ["A", "B", "C[0]"] {
      assert!(graph.is_voided(n), "{} should be voided", n);
    }
    assert!(!graph.is_voided("Z"));
  }

  #[test]
  fn test_cancel_region_members_and_continue() {
    let graph = CaseGraph::new()
      .flow("X", "Next")
      .triple(Triple::new("X", vocab::CANCELS_REGION, Term::node("R")))
      .triple(Triple::new("R", vocab::HAS_MEMBER, Term::node("M1")))
      .triple(Triple::new("R", vocab::HAS_MEMBER, Term::node("M2")))
      .triple(Triple::new("M2[0]", vocab::INSTANCE_OF, Term::node("M2")))
      .token("X")
      .token("M1")
      .token("M2[0]")
      .token("Outside")
      .build();
    let delta = void(&graph, &node("X"), &ctx("tx-1"), CancellationScope::Region).unwrap();

    assert!(delta.removals().contains(&Triple::token("M1")));
    assert!(delta.removals().contains(&Triple::token("M2[0]")));
    assert!(delta.removals().contains(&Triple::token("X")));
    assert!(!delta.removals().contains(&Triple::token("Outside")));
    // M2 holds no token, so it is not marked.
    assert!(
      !delta
        .additions()
        .contains(&Triple::marker("M2", vocab::VOIDED_AT, "tx-1"))
    );
    assert!(delta.additions().contains(&Triple::token("Next")));
    assert!(
      delta
        .additions()
        .contains(&Triple::marker("X", vocab::COMPLETED_AT, "tx-1"))
    );
  }

  #[test]
  fn test_cancel_sibling_instances() {
    let graph = CaseGraph::new()
      .triple(Triple::new("W[0]", vocab::INSTANCE_OF, Term::node("W")))
      .triple(Triple::new("W[1]", vocab::INSTANCE_OF, Term::node("W")))
      .triple(Triple::new("Stop", vocab::CANCELS_INSTANCES_OF, Term::node("W")))
      .token("W[0]")
      .token("W[1]")
      .token("Stop")
      .build();
    let delta = void(&graph, &node("Stop"), &ctx("tx-1"), CancellationScope::Instances).unwrap();

    assert!(delta.removals().contains(&Triple::token("W[0]")));
    assert!(delta.removals().contains(&Triple::token("W[1]")));
    assert!(
      delta
        .additions()
        .contains(&Triple::marker("Stop", vocab::COMPLETED_AT, "tx-1"))
    );
  }
}
