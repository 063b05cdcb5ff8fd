use quintet_graph::{Graph, NodeId, Term, Triple, vocab};
use quintet_ontology::{Cardinality, InstanceBinding};

use crate::context::TransactionContext;
use crate::delta::QuadDelta;
use crate::error::VerbError;
use crate::topology::{instances_of, successors};

use super::advance;

/// Activate every successor at once, or spawn instances of the task.
///
/// With `Topology` cardinality all outgoing flows receive a token regardless
/// of predicates. Any other cardinality spawns `instances` nodes bound to the
/// task; each gets a token, an `instanceOf` link and its index, and the task
/// itself completes.
pub fn copy(
  graph: &Graph,
  task: &NodeId,
  ctx: &TransactionContext,
  cardinality: Cardinality,
  binding: Option<InstanceBinding>,
  instances: u32,
) -> Result<QuadDelta, VerbError> {
  if cardinality == Cardinality::Topology {
    let targets = successors(graph, task)?;
    if targets.is_empty() {
      return Ok(QuadDelta::empty());
    }
    return Ok(advance(task, targets, ctx));
  }

  // Nothing to spawn: behave like a completed task.
  if instances == 0 {
    let targets = successors(graph, task)?;
    return Ok(advance(task, targets, ctx));
  }

  // Incremental and recursive spawning continue after what already exists;
  // a fixed count reuses the same instance nodes on every firing.
  let existing = instances_of(graph, task.as_str()).len() as i64;
  let first = match (cardinality, binding) {
    (Cardinality::Incremental, _) | (_, Some(InstanceBinding::Recursive)) => existing,
    _ => 0,
  };

  let mut additions = Vec::new();
  for index in first..first + i64::from(instances) {
    let instance = instance_id(task, binding, index);
    additions.push(Triple::new(&instance, vocab::INSTANCE_OF, Term::node(task)));
    additions.push(Triple::new(&instance, vocab::INSTANCE_INDEX, Term::integer(index)));
    additions.push(Triple::new(&instance, vocab::NODE_KIND, Term::string("instance")));
    additions.push(Triple::token(&instance));
  }
  additions.push(Triple::marker(task, vocab::COMPLETED_AT, &ctx.tx_id));

  Ok(QuadDelta::new(additions, [Triple::token(task)]))
}

fn instance_id(task: &NodeId, binding: Option<InstanceBinding>, index: i64) -> NodeId {
  match binding {
    Some(InstanceBinding::Recursive) => NodeId::new(format!("{}#r{}", task, index)),
    _ => NodeId::new(format!("{}[{}]", task, index)),
  }
}
