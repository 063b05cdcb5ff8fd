use std::collections::BTreeSet;

use tracing::debug;

use quintet_graph::{Graph, NodeId, Term, Triple, vocab};

use crate::config::{Threshold, Trigger};
use crate::context::TransactionContext;
use crate::delta::QuadDelta;
use crate::error::VerbError;
use crate::topology::{fresh_completions, incoming_sources, root_task, successors};

/// Fire a join once enough of its sources have completed.
///
/// Only completions the join has not consumed yet are counted. Each firing
/// records `(task consumed tx)` for the completions it used, so a join inside
/// a loop re-arms and a resetting discriminator can fire again on the next
/// completion. Partial joins without `reset_on_fire` fire at most once.
///
/// Under [`Threshold::Active`] every source that was ever tokenized in the
/// case (holding a token, completed, or voided) must have a fresh completion.
///
/// An unmet threshold yields an empty delta: the join is waiting, not failed,
/// and calling again has no effect until more sources complete.
pub fn await_join(
  graph: &Graph,
  task: &NodeId,
  ctx: &TransactionContext,
  threshold: Threshold,
  reset_on_fire: bool,
  trigger: Option<&Trigger>,
) -> Result<QuadDelta, VerbError> {
  match trigger {
    Some(trigger) => await_trigger(graph, task, ctx, threshold, trigger),
    None => await_flows(graph, task, ctx, threshold, reset_on_fire),
  }
}

fn await_flows(
  graph: &Graph,
  task: &NodeId,
  ctx: &TransactionContext,
  threshold: Threshold,
  reset_on_fire: bool,
) -> Result<QuadDelta, VerbError> {
  if matches!(threshold, Threshold::AtLeast(_)) && !reset_on_fire && graph.is_completed(task.as_str()) {
    debug!(task = %task, "join_blocked");
    return Ok(QuadDelta::empty());
  }

  let sources = incoming_sources(graph, task.as_str());
  let mut used = Vec::new();
  let mut completed = 0;
  let mut active = 0;
  for source in &sources {
    let fresh = fresh_completions(graph, task.as_str(), source.as_str());
    if !fresh.is_empty() {
      completed += 1;
      active += 1;
      used.extend(fresh);
    } else if ever_tokenized(graph, source) {
      active += 1;
    }
  }

  if !threshold_met(threshold, sources.len(), completed, active) {
    debug!(
      task = %task,
      threshold = %threshold,
      sources = sources.len(),
      completed,
      "join_waiting"
    );
    return Ok(QuadDelta::empty());
  }

  fire(graph, task, ctx, used, Vec::new())
}

fn await_trigger(
  graph: &Graph,
  task: &NodeId,
  ctx: &TransactionContext,
  threshold: Threshold,
  trigger: &Trigger,
) -> Result<QuadDelta, VerbError> {
  // A task that is also reached by control flow must hold its token.
  if !incoming_sources(graph, task.as_str()).is_empty() && !graph.has_token(task.as_str()) {
    debug!(task = %task, "trigger_not_enabled");
    return Ok(QuadDelta::empty());
  }

  let signals: BTreeSet<&NodeId> = graph
    .object_nodes(root_task(graph, task).as_str(), vocab::TRIGGERED_BY)
    .collect();

  let mut used = Vec::new();
  let mut spent = Vec::new();
  let mut satisfied = 0;
  for signal in &signals {
    if trigger.is_persistent() {
      // Never consumed: a completed persistent signal satisfies every check.
      if graph.is_completed(signal.as_str()) {
        satisfied += 1;
      }
      continue;
    }

    let fresh = fresh_completions(graph, task.as_str(), signal.as_str());
    if fresh.is_empty() || !signal_holds(graph, signal, trigger) {
      continue;
    }
    satisfied += 1;
    used.extend(fresh);
    if graph.has_token(signal.as_str()) {
      spent.push(Triple::token(*signal));
    }
  }

  if !threshold_met(threshold, signals.len(), satisfied, satisfied) {
    debug!(task = %task, signals = signals.len(), satisfied, "trigger_waiting");
    return Ok(QuadDelta::empty());
  }

  fire(graph, task, ctx, used, spent)
}

fn threshold_met(threshold: Threshold, total: usize, completed: usize, active: usize) -> bool {
  match threshold {
    Threshold::All => total > 0 && completed == total,
    Threshold::Active => completed > 0 && completed == active,
    Threshold::AtLeast(n) => completed >= n as usize,
  }
}

fn ever_tokenized(graph: &Graph, node: &NodeId) -> bool {
  graph.has_token(node.as_str())
    || graph.is_completed(node.as_str())
    || graph.is_voided(node.as_str())
}

fn signal_holds(graph: &Graph, signal: &NodeId, trigger: &Trigger) -> bool {
  if trigger.property == vocab::COMPLETED_AT {
    return true;
  }
  match &trigger.value {
    Some(value) => graph.contains(&Triple::new(
      signal,
      trigger.property.as_str(),
      Term::Literal(value.clone()),
    )),
    None => graph.objects(signal.as_str(), &trigger.property).next().is_some(),
  }
}

fn fire(
  graph: &Graph,
  task: &NodeId,
  ctx: &TransactionContext,
  consumed: Vec<&str>,
  mut removals: Vec<Triple>,
) -> Result<QuadDelta, VerbError> {
  let targets = successors(graph, task)?;

  let mut additions: Vec<Triple> = targets.into_iter().map(Triple::token).collect();
  additions.push(Triple::marker(task, vocab::COMPLETED_AT, &ctx.tx_id));
  additions.extend(
    consumed
      .into_iter()
      .map(|tx| Triple::marker(task, vocab::CONSUMED, tx)),
  );

  if graph.has_token(task.as_str()) {
    removals.insert(0, Triple::token(task));
  }

  Ok(QuadDelta::new(additions, removals))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::verbs::fixtures::{CaseGraph, apply, ctx, node};
  use quintet_graph::Literal;

  fn and_join() -> CaseGraph {
    CaseGraph::new().flow("B", "D").flow("C", "D").flow("D", "E")
  }

  #[test]
  fn test_all_waits_for_every_source() {
    let graph = and_join().completed("B", "tx-b").token("D").build();
    let delta = await_join(&graph, &node("D"), &ctx("tx-d"), Threshold::All, false, None).unwrap();
    assert!(delta.is_empty());
  }

  #[test]
  fn test_all_fires_and_consumes() {
    let graph = and_join()
      .completed("B", "tx-b")
      .completed("C", "tx-c")
      .token("D")
      .build();
    let delta = await_join(&graph, &node("D"), &ctx("tx-d"), Threshold::All, false, None).unwrap();

    assert_eq!(delta.removals(), &[Triple::token("D")]);
    assert!(delta.additions().contains(&Triple::token("E")));
    assert!(
      delta
        .additions()
        .contains(&Triple::marker("D", vocab::CONSUMED, "tx-b"))
    );
    assert!(
      delta
        .additions()
        .contains(&Triple::marker("D", vocab::CONSUMED, "tx-c"))
    );
  }

  #[test]
  fn test_polling_unmet_join_is_side_effect_free() {
    let graph = and_join().completed("B", "tx-b").token("D").build();
    let before: Vec<Triple> = graph.iter().cloned().collect();
    for i in 0..5 {
      let delta = await_join(
        &graph,
        &node("D"),
        &ctx(&format!("tx-{}", i)),
        Threshold::All,
        false,
        None,
      )
      .unwrap();
      assert!(delta.is_empty());
    }
    let after: Vec<Triple> = graph.iter().cloned().collect();
    assert_eq!(before, after);
  }

  #[test]
  fn test_active_ignores_branches_never_taken() {
    let graph = and_join().completed("B", "tx-b").token("D").build();
    let delta = await_join(&graph, &node("D"), &ctx("tx-d"), Threshold::Active, false, None).unwrap();
    assert!(delta.additions().contains(&Triple::token("E")));
  }

  #[test]
  fn test_active_waits_for_live_branch() {
    let graph = and_join()
      .completed("B", "tx-b")
      .token("C")
      .token("D")
      .build();
    let delta = await_join(&graph, &node("D"), &ctx("tx-d"), Threshold::Active, false, None).unwrap();
    assert!(delta.is_empty());
  }

  #[test]
  fn test_active_waits_on_voided_branch() {
    let graph = and_join()
      .completed("B", "tx-b")
      .triple(Triple::marker("C", vocab::VOIDED_AT, "tx-v"))
      .token("D")
      .build();
    let delta = await_join(&graph, &node("D"), &ctx("tx-d"), Threshold::Active, false, None).unwrap();
    assert!(delta.is_empty());
  }

  #[test]
  fn test_active_waits_on_consumed_branch_in_loop() {
    // C completed in an earlier iteration that D already consumed.
    let graph = and_join()
      .completed("B", "tx-b2")
      .completed("C", "tx-c1")
      .triple(Triple::marker("D", vocab::CONSUMED, "tx-c1"))
      .token("D")
      .build();
    let waiting = await_join(&graph, &node("D"), &ctx("tx-d"), Threshold::Active, false, None).unwrap();
    assert!(waiting.is_empty());

    let mut graph = graph;
    graph.insert(Triple::marker("C", vocab::COMPLETED_AT, "tx-c2"));
    let fired = await_join(&graph, &node("D"), &ctx("tx-d"), Threshold::Active, false, None).unwrap();
    assert!(fired.additions().contains(&Triple::token("E")));
    assert!(
      fired
        .additions()
        .contains(&Triple::marker("D", vocab::CONSUMED, "tx-c2"))
    );
  }

  #[test]
  fn test_discriminator_reset_rearms() {
    let mut graph = CaseGraph::new()
      .flow("A", "D")
      .flow("B", "D")
      .flow("C", "D")
      .flow("D", "E")
      .completed("A", "tx-a")
      .token("D")
      .build();

    let first = await_join(&graph, &node("D"), &ctx("tx-1"), Threshold::AtLeast(1), true, None).unwrap();
    assert!(!first.is_empty());
    apply(&mut graph, &first);

    // Nothing new completed: waiting again.
    let idle = await_join(&graph, &node("D"), &ctx("tx-2"), Threshold::AtLeast(1), true, None).unwrap();
    assert!(idle.is_empty());

    graph.insert(Triple::marker("B", vocab::COMPLETED_AT, "tx-b"));
    graph.insert(Triple::token("D"));
    let second = await_join(&graph, &node("D"), &ctx("tx-3"), Threshold::AtLeast(1), true, None).unwrap();
    assert!(
      second
        .additions()
        .contains(&Triple::marker("D", vocab::CONSUMED, "tx-b"))
    );
  }

  #[test]
  fn test_blocking_partial_join_fires_once() {
    let mut graph = CaseGraph::new()
      .flow("A", "D")
      .flow("B", "D")
      .flow("C", "D")
      .completed("A", "tx-a")
      .completed("B", "tx-b")
      .token("D")
      .build();

    let first = await_join(&graph, &node("D"), &ctx("tx-1"), Threshold::AtLeast(2), false, None).unwrap();
    assert!(!first.is_empty());
    apply(&mut graph, &first);

    graph.insert(Triple::marker("C", vocab::COMPLETED_AT, "tx-c"));
    graph.insert(Triple::token("D"));
    let again = await_join(&graph, &node("D"), &ctx("tx-2"), Threshold::AtLeast(1), false, None).unwrap();
    assert!(again.is_empty());
  }

  #[test]
  fn test_quorum_threshold() {
    let graph = CaseGraph::new()
      .flow("A", "D")
      .flow("B", "D")
      .flow("C", "D")
      .completed("A", "tx-a")
      .token("D")
      .build();
    let waiting = await_join(&graph, &node("D"), &ctx("tx-1"), Threshold::AtLeast(2), false, None).unwrap();
    assert!(waiting.is_empty());
  }

  fn triggered(signal_state: CaseGraph) -> Graph {
    signal_state
      .triple(Triple::new("T", vocab::TRIGGERED_BY, Term::node("S")))
      .flow("T", "Next")
      .build()
  }

  #[test]
  fn test_transient_trigger_needs_live_signal() {
    let transient = Trigger::new(vocab::HAS_TOKEN, Some(Literal::Bool(true)));

    // Completed but no longer live.
    let graph = triggered(CaseGraph::new().completed("S", "tx-s"));
    let delta = await_join(&graph, &node("T"), &ctx("tx-1"), Threshold::AtLeast(1), false, Some(&transient)).unwrap();
    assert!(delta.is_empty());

    let graph = triggered(CaseGraph::new().completed("S", "tx-s").token("S"));
    let delta = await_join(&graph, &node("T"), &ctx("tx-1"), Threshold::AtLeast(1), false, Some(&transient)).unwrap();
    assert!(delta.removals().contains(&Triple::token("S")));
    assert!(delta.additions().contains(&Triple::token("Next")));
    assert!(
      delta
        .additions()
        .contains(&Triple::marker("T", vocab::CONSUMED, "tx-s"))
    );
  }

  #[test]
  fn test_persistent_trigger_is_never_consumed() {
    let persistent = Trigger::new(vocab::COMPLETED_AT, None);
    let mut graph = triggered(CaseGraph::new().completed("S", "tx-s"));

    for tx in ["tx-1", "tx-2"] {
      let delta = await_join(&graph, &node("T"), &ctx(tx), Threshold::AtLeast(1), false, Some(&persistent)).unwrap();
      assert!(delta.additions().contains(&Triple::token("Next")));
      assert!(
        !delta
          .additions()
          .iter()
          .any(|t| t.predicate.as_str() == vocab::CONSUMED)
      );
      apply(&mut graph, &delta);
    }
  }

  #[test]
  fn test_trigger_on_flow_task_requires_token() {
    let persistent = Trigger::new(vocab::COMPLETED_AT, None);
    let graph = triggered(CaseGraph::new().flow("A", "T").completed("S", "tx-s"));
    let delta = await_join(&graph, &node("T"), &ctx("tx-1"), Threshold::AtLeast(1), false, Some(&persistent)).unwrap();
    assert!(delta.is_empty());
  }
}
