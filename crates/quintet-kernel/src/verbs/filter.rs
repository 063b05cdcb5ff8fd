use quintet_graph::{Graph, NodeId};
use quintet_ontology::SelectionMode;
use quintet_predicate::Expr;

use crate::context::TransactionContext;
use crate::delta::QuadDelta;
use crate::error::VerbError;
use crate::topology::{OutgoingFlow, outgoing_flows};

use super::advance;

/// Route the task's token along the flows whose predicates hold.
///
/// Flows are tried in ascending `ordering`. `OneOrMore` takes every flow whose
/// predicate is true; every other mode takes only the first. When no
/// predicate holds the default flow is taken. The remaining modes differ from
/// `ExactlyOne` only in when the task may fire, which is decided before the
/// verb runs.
pub fn filter(
  graph: &Graph,
  task: &NodeId,
  ctx: &TransactionContext,
  mode: SelectionMode,
) -> Result<QuadDelta, VerbError> {
  let flows = outgoing_flows(graph, task)?;
  if flows.is_empty() {
    return Ok(QuadDelta::empty());
  }

  let selected = select(&flows, ctx, mode)?;
  if selected.is_empty() {
    return Err(VerbError::NoFlowSelected {
      task: task.to_string(),
    });
  }

  Ok(advance(task, selected, ctx))
}

fn select<'g>(
  flows: &[OutgoingFlow<'g>],
  ctx: &TransactionContext,
  mode: SelectionMode,
) -> Result<Vec<&'g NodeId>, VerbError> {
  let mut selected = Vec::new();

  for flow in flows {
    let Some(text) = flow.predicate else {
      continue;
    };
    let predicate_error = |source| VerbError::Predicate {
      flow: flow.flow.to_string(),
      source,
    };
    let expr = Expr::parse(text).map_err(predicate_error)?;
    if expr.evaluate(&ctx.data).map_err(predicate_error)? {
      selected.push(flow.target);
      if mode != SelectionMode::OneOrMore {
        break;
      }
    }
  }

  if selected.is_empty() {
    if let Some(default) = flows.iter().find(|f| f.is_default) {
      selected.push(default.target);
    }
  }
  Ok(selected)
}
