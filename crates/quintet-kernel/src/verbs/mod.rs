//! The five verbs.
//!
//! Every verb borrows the graph immutably and returns a [`QuadDelta`]. An
//! empty delta is a normal outcome: a task with nowhere to go, or a join that
//! is still waiting.

mod copy;
mod filter;
mod join;
mod transmute;
mod void;

pub use copy::copy;
pub use filter::filter;
pub use join::await_join;
pub use transmute::transmute;
pub use void::void;

use tracing::trace;

use quintet_graph::{Graph, NodeId, Triple, vocab};

use crate::config::{Verb, VerbConfig};
use crate::context::TransactionContext;
use crate::delta::QuadDelta;
use crate::error::VerbError;

/// Run the verb a task resolved to.
pub fn execute(
  graph: &Graph,
  task: &NodeId,
  ctx: &TransactionContext,
  config: &VerbConfig,
) -> Result<QuadDelta, VerbError> {
  trace!(task = %task, pattern = %config.pattern, verb = %config.kind(), "verb_execute");

  match &config.verb {
    Verb::Transmute => transmute(graph, task, ctx),
    Verb::Copy {
      cardinality,
      instance_binding,
      instances,
      ..
    } => copy(graph, task, ctx, *cardinality, *instance_binding, *instances),
    Verb::Filter { selection_mode } => filter(graph, task, ctx, *selection_mode),
    Verb::Await {
      threshold,
      reset_on_fire,
      trigger,
    } => await_join(graph, task, ctx, *threshold, *reset_on_fire, trigger.as_ref()),
    Verb::Void { cancellation_scope } => void(graph, task, ctx, *cancellation_scope),
  }
}

/// Retire the task's token, mark it completed and put a token on each target.
fn advance<'a>(
  task: &NodeId,
  targets: impl IntoIterator<Item = &'a NodeId>,
  ctx: &TransactionContext,
) -> QuadDelta {
  let mut additions: Vec<Triple> = targets.into_iter().map(Triple::token).collect();
  additions.push(Triple::marker(task, vocab::COMPLETED_AT, &ctx.tx_id));
  QuadDelta::new(additions, [Triple::token(task)])
}
