use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use quintet_driver::Resolver;
use quintet_graph::{Graph, GraphError, NodeId, vocab};
use quintet_kernel::{GENESIS_HASH, QuadDelta, Stimulus, TransactionContext};

use crate::error::TransactionError;
use crate::lineage::Lineage;
use crate::receipt::{Operation, Receipt};
use crate::sink::{NoopSink, ReceiptSink};

/// A computed but uncommitted firing.
#[derive(Debug, Clone)]
pub struct PreparedTransaction {
  ctx: TransactionContext,
  task: Option<NodeId>,
  operation: Operation,
  delta: QuadDelta,
}

impl PreparedTransaction {
  pub fn context(&self) -> &TransactionContext {
    &self.ctx
  }

  pub fn task(&self) -> Option<&NodeId> {
    self.task.as_ref()
  }

  pub fn operation(&self) -> &Operation {
    &self.operation
  }

  pub fn delta(&self) -> &QuadDelta {
    &self.delta
  }
}

/// Result of committing a prepared transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum FireOutcome {
  Committed(Receipt),
  /// The verb produced an empty delta. Nothing was written.
  Unchanged,
}

impl FireOutcome {
  pub fn receipt(&self) -> Option<&Receipt> {
    match self {
      FireOutcome::Committed(receipt) => Some(receipt),
      FireOutcome::Unchanged => None,
    }
  }

  pub fn is_committed(&self) -> bool {
    matches!(self, FireOutcome::Committed(_))
  }
}

/// Owner of the case graph and its lineages.
pub struct TransactionManager<R: Resolver> {
  graph: Graph,
  resolver: R,
  lineages: HashMap<String, Lineage>,
  sink: Arc<dyn ReceiptSink>,
}

impl<R: Resolver> TransactionManager<R> {
  pub fn new(graph: Graph, resolver: R) -> Self {
    Self {
      graph,
      resolver,
      lineages: HashMap::new(),
      sink: Arc::new(NoopSink),
    }
  }

  pub fn with_sink(mut self, sink: Arc<dyn ReceiptSink>) -> Self {
    self.sink = sink;
    self
  }

  /// Read-only view of the current graph.
  pub fn graph(&self) -> &Graph {
    &self.graph
  }

  pub fn resolver(&self) -> &R {
    &self.resolver
  }

  pub fn lineage(&self, id: &str) -> Option<&Lineage> {
    self.lineages.get(id)
  }

  /// Current head of a lineage; [`GENESIS_HASH`] before its first commit.
  pub fn head(&self, lineage: &str) -> &str {
    self
      .lineages
      .get(lineage)
      .map(Lineage::head)
      .unwrap_or(GENESIS_HASH)
  }

  /// A fresh context chained onto the lineage's current head.
  pub fn context(&self, lineage: &str) -> TransactionContext {
    TransactionContext::new(lineage, self.head(lineage))
  }

  /// Resolve `task` and compute its delta without touching the graph.
  pub fn prepare(
    &self,
    task: &NodeId,
    ctx: TransactionContext,
  ) -> Result<PreparedTransaction, TransactionError> {
    self.check_chain(&ctx)?;

    let config = self.resolver.resolve(&self.graph, task, &ctx)?;
    let delta = quintet_kernel::execute(&self.graph, task, &ctx, &config)?;

    Ok(PreparedTransaction {
      ctx,
      task: Some(task.clone()),
      operation: Operation::Verb(config),
      delta,
    })
  }

  /// Compute the delta of an environment stimulus.
  pub fn prepare_stimulus(
    &self,
    stimulus: Stimulus,
    ctx: TransactionContext,
  ) -> Result<PreparedTransaction, TransactionError> {
    self.check_chain(&ctx)?;

    let nodes: Vec<&NodeId> = match &stimulus {
      Stimulus::Start { nodes } => nodes.iter().collect(),
      Stimulus::Signal { node } => vec![node],
    };
    if let Some(node) = nodes.into_iter().find(|n| !self.graph.has_subject(n.as_str())) {
      return Err(TransactionError::UnknownNode {
        node: node.to_string(),
      });
    }

    let delta = stimulus.delta(&ctx);
    Ok(PreparedTransaction {
      ctx,
      task: None,
      operation: Operation::Stimulus(stimulus),
      delta,
    })
  }

  /// Apply a prepared transaction and seal its receipt.
  ///
  /// The chain is checked again, since another transaction of the same
  /// lineage may have committed since `prepare`.
  pub fn commit(&mut self, prepared: PreparedTransaction) -> Result<FireOutcome, TransactionError> {
    self.check_chain(&prepared.ctx)?;

    let PreparedTransaction {
      ctx,
      task,
      operation,
      delta,
    } = prepared;

    if delta.is_empty() {
      debug!(
        lineage = %ctx.lineage,
        tx_id = %ctx.tx_id,
        operation = %operation.name(),
        "transaction_unchanged"
      );
      return Ok(FireOutcome::Unchanged);
    }

    // Sealed before the graph is touched, so an encoding failure leaves the
    // case unchanged.
    let receipt = Receipt::seal(
      ctx.lineage.clone(),
      ctx.prev_hash,
      ctx.tx_id,
      ctx.actor,
      task,
      operation,
      delta,
    )?;
    self.apply(&receipt.delta)?;

    info!(
      lineage = %receipt.lineage,
      tx_id = %receipt.tx_id,
      verb = %receipt.verb_executed,
      additions = receipt.delta.additions().len(),
      removals = receipt.delta.removals().len(),
      merkle_root = %receipt.merkle_root,
      "transaction_committed"
    );

    self
      .lineages
      .entry(ctx.lineage.clone())
      .or_insert_with(|| Lineage::new(ctx.lineage))
      .push(receipt.clone());
    self.sink.record(receipt.clone());

    Ok(FireOutcome::Committed(receipt))
  }

  /// Resolve, compute and commit in one step.
  #[instrument(
    name = "transaction_fire",
    skip(self, task, ctx),
    fields(lineage = %ctx.lineage, tx_id = %ctx.tx_id, task = %task)
  )]
  pub fn fire(
    &mut self,
    task: &NodeId,
    ctx: TransactionContext,
  ) -> Result<FireOutcome, TransactionError> {
    let prepared = self.prepare(task, ctx);
    let outcome = prepared.and_then(|prepared| self.commit(prepared));
    if let Err(e) = &outcome {
      if !matches!(e, TransactionError::ChainIntegrity { .. }) {
        warn!(error = %e, "transaction_failed");
      }
    }
    outcome
  }

  /// Record an environment stimulus in the lineage.
  pub fn inject(
    &mut self,
    stimulus: Stimulus,
    ctx: TransactionContext,
  ) -> Result<FireOutcome, TransactionError> {
    let prepared = self.prepare_stimulus(stimulus, ctx)?;
    self.commit(prepared)
  }

  fn check_chain(&self, ctx: &TransactionContext) -> Result<(), TransactionError> {
    let lineage = self.lineages.get(&ctx.lineage);
    let head = lineage.map(Lineage::head).unwrap_or(GENESIS_HASH);

    if ctx.prev_hash != head {
      error!(
        lineage = %ctx.lineage,
        tx_id = %ctx.tx_id,
        expected = %head,
        found = %ctx.prev_hash,
        "chain_integrity_violation"
      );
      return Err(TransactionError::ChainIntegrity {
        lineage: ctx.lineage.clone(),
        expected: head.to_string(),
        found: ctx.prev_hash.clone(),
      });
    }

    if lineage.is_some_and(|l| l.contains_tx(&ctx.tx_id)) {
      warn!(lineage = %ctx.lineage, tx_id = %ctx.tx_id, "duplicate_transaction");
      return Err(TransactionError::DuplicateTransaction {
        lineage: ctx.lineage.clone(),
        tx_id: ctx.tx_id.clone(),
      });
    }
    Ok(())
  }

  /// Removals, then additions. Markers are checked up front so a bad delta
  /// leaves the graph untouched.
  fn apply(&mut self, delta: &QuadDelta) -> Result<(), TransactionError> {
    if let Some(marker) = delta
      .removals()
      .iter()
      .find(|t| vocab::is_append_only(t.predicate.as_str()))
    {
      return Err(GraphError::AppendOnly {
        triple: marker.clone(),
      }
      .into());
    }

    for triple in delta.removals() {
      self.graph.remove(triple)?;
    }
    for triple in delta.additions() {
      self.graph.insert(triple.clone());
    }
    Ok(())
  }
}
