//! Read-only views of the control-flow structure stored in the graph.

use std::collections::BTreeSet;

use quintet_graph::{Graph, GraphError, NodeId, Term, vocab};

/// One outgoing flow of a task with its routing properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingFlow<'g> {
  pub flow: &'g NodeId,
  pub target: &'g NodeId,
  pub ordering: i64,
  pub predicate: Option<&'g str>,
  pub is_default: bool,
}

/// The task a node was spawned from, if it is an instance.
pub fn parent_of<'g>(graph: &'g Graph, node: &str) -> Option<&'g NodeId> {
  graph.object_nodes(node, vocab::INSTANCE_OF).next()
}

/// The declared task behind a node, following `instanceOf` through nested
/// (recursive) instances.
pub fn root_task<'g>(graph: &'g Graph, node: &'g NodeId) -> &'g NodeId {
  let mut current = node;
  let mut seen = BTreeSet::new();
  while let Some(parent) = parent_of(graph, current.as_str()) {
    if !seen.insert(parent) {
      break;
    }
    current = parent;
  }
  current
}

/// Instances spawned from `task`, ordered by node id.
pub fn instances_of<'g>(graph: &'g Graph, task: &str) -> Vec<&'g NodeId> {
  let parent = Term::node(task);
  graph
    .subjects(vocab::INSTANCE_OF, &parent)
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect()
}

/// Flows leaving `node` (or its declared task, for instances), sorted by
/// `ordering` and then flow id.
pub fn outgoing_flows<'g>(graph: &'g Graph, node: &'g NodeId) -> Result<Vec<OutgoingFlow<'g>>, GraphError> {
  let source = root_task(graph, node);
  let mut flows = Vec::new();

  for flow in graph.object_nodes(source.as_str(), vocab::FLOWS_INTO) {
    let Some(target) = graph.object_nodes(flow.as_str(), vocab::NEXT_ELEMENT).next() else {
      continue;
    };
    flows.push(OutgoingFlow {
      flow,
      target,
      ordering: graph.integer(flow.as_str(), vocab::ORDERING)?.unwrap_or(0),
      predicate: graph.string(flow.as_str(), vocab::PREDICATE)?,
      is_default: graph.boolean(flow.as_str(), vocab::IS_DEFAULT_FLOW)?.unwrap_or(false),
    });
  }

  flows.sort_by(|a, b| a.ordering.cmp(&b.ordering).then_with(|| a.flow.cmp(b.flow)));
  Ok(flows)
}

/// Targets of every outgoing flow, in flow order and without repeats.
pub fn successors<'g>(graph: &'g Graph, node: &'g NodeId) -> Result<Vec<&'g NodeId>, GraphError> {
  let mut seen = BTreeSet::new();
  Ok(
    outgoing_flows(graph, node)?
      .into_iter()
      .map(|f| f.target)
      .filter(|t| seen.insert(*t))
      .collect(),
  )
}

/// Nodes whose completion a join at `task` waits for: the source of every
/// incoming flow, replaced by its spawned instances when it has any.
pub fn incoming_sources<'g>(graph: &'g Graph, task: &str) -> Vec<&'g NodeId> {
  let task_term = Term::node(task);
  let mut sources = BTreeSet::new();

  for flow in graph.subjects(vocab::NEXT_ELEMENT, &task_term) {
    for source in graph.subjects(vocab::FLOWS_INTO, &Term::Node(flow.clone())) {
      let spawned = instances_of(graph, source.as_str());
      if spawned.is_empty() {
        sources.insert(source);
      } else {
        sources.extend(spawned);
      }
    }
  }

  sources.into_iter().collect()
}

/// Transaction ids in which `node` completed.
pub fn completions<'g>(graph: &'g Graph, node: &str) -> Vec<&'g str> {
  graph
    .objects(node, vocab::COMPLETED_AT)
    .filter_map(|t| t.as_literal().and_then(|l| l.as_str()))
    .collect()
}

/// Completions of `source` that the join at `task` has not consumed yet.
pub fn fresh_completions<'g>(graph: &'g Graph, task: &str, source: &str) -> Vec<&'g str> {
  let consumed: BTreeSet<&str> = completions_consumed(graph, task);
  completions(graph, source)
    .into_iter()
    .filter(|tx| !consumed.contains(tx))
    .collect()
}

fn completions_consumed<'g>(graph: &'g Graph, task: &str) -> BTreeSet<&'g str> {
  graph
    .objects(task, vocab::CONSUMED)
    .filter_map(|t| t.as_literal().and_then(|l| l.as_str()))
    .collect()
}
