use std::fmt;

use tracing::debug;

use quintet_graph::{Graph, NodeId, vocab};
use quintet_kernel::topology::{outgoing_flows, root_task};
use quintet_kernel::{Threshold, TransactionContext, Trigger, Verb, VerbConfig};
use quintet_ontology::{Cardinality, PatternMapping, PatternOntology, ThresholdSpec, VerbKind};

use crate::error::ResolveError;

const DEFAULT_INSTANCE_COUNT_KEY: &str = "instance_count";
const DEFAULT_QUORUM_KEY: &str = "quorum";

/// Resolver maps a task in a case graph onto the verb it runs.
pub trait Resolver: Send + Sync {
  /// Resolve `task` for one firing. Data-dependent parameters are read from
  /// `ctx.data`.
  fn resolve(
    &self,
    graph: &Graph,
    task: &NodeId,
    ctx: &TransactionContext,
  ) -> Result<VerbConfig, ResolveError>;
}

/// What a task is looked up by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signature {
  /// Explicit `pattern` annotation.
  Pattern(String),
  /// Structural key derived from split/join markers or a trigger relation.
  Key(String),
}

impl fmt::Display for Signature {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Signature::Pattern(name) => write!(f, "pattern '{}'", name),
      Signature::Key(key) => write!(f, "structural key '{}'", key),
    }
  }
}

/// Resolver backed by the pattern ontology.
#[derive(Debug, Clone)]
pub struct SemanticDriver {
  ontology: PatternOntology,
}

impl SemanticDriver {
  pub fn new(ontology: PatternOntology) -> Self {
    Self { ontology }
  }

  pub fn ontology(&self) -> &PatternOntology {
    &self.ontology
  }

  /// Derive the lookup signature from a task's markers.
  ///
  /// In order: explicit pattern, trigger relation, AND/OR join, split, XOR
  /// join, and finally plain sequence. An AND/OR join combined with an
  /// XOR/OR split is malformed: the join would fire every outgoing flow and
  /// ignore the split's predicates.
  pub fn signature(graph: &Graph, task: &NodeId) -> Result<Signature, ResolveError> {
    let task = task.as_str();
    let join = graph.string(task, vocab::HAS_JOIN)?;
    let split = graph.string(task, vocab::HAS_SPLIT)?;

    if let (Some(join @ ("and" | "or")), Some(split @ ("xor" | "or"))) = (join, split) {
      return Err(ResolveError::MalformedTopology {
        task: task.to_string(),
        reason: format!("'{}' join cannot be combined with a '{}' split", join, split),
      });
    }

    if let Some(pattern) = graph.string(task, vocab::PATTERN)? {
      return Ok(Signature::Pattern(pattern.to_string()));
    }

    if graph.object_nodes(task, vocab::TRIGGERED_BY).next().is_some() {
      let mode = graph.string(task, vocab::TRIGGER_MODE)?.unwrap_or("transient");
      return Ok(Signature::Key(format!("trigger:{}", mode)));
    }

    let key = match (join, split) {
      (Some(join @ ("and" | "or")), _) => format!("join:{}", join),
      (_, Some(split)) => format!("split:{}", split),
      (Some(join), None) => format!("join:{}", join),
      (None, None) => "none".to_string(),
    };
    Ok(Signature::Key(key))
  }

  fn lookup(&self, task: &NodeId, signature: &Signature) -> Result<&PatternMapping, ResolveError> {
    let found = match signature {
      Signature::Pattern(name) => self.ontology.find_by_name(name),
      Signature::Key(key) => self.ontology.find_by_structural_key(key),
    };

    match found.as_slice() {
      [mapping] => Ok(*mapping),
      [] => Err(ResolveError::NoMapping {
        task: task.to_string(),
        signature: signature.to_string(),
      }),
      many => Err(ResolveError::Ambiguous {
        task: task.to_string(),
        signature: signature.to_string(),
        candidates: many.iter().map(|m| m.name.clone()).collect(),
      }),
    }
  }

  fn instantiate(
    &self,
    graph: &Graph,
    task: &NodeId,
    declared: &NodeId,
    mapping: &PatternMapping,
    ctx: &TransactionContext,
  ) -> Result<Verb, ResolveError> {
    let incomplete = |reason: &str| ResolveError::IncompleteMapping {
      pattern: mapping.name.clone(),
      reason: reason.to_string(),
    };
    let params = &mapping.params;

    let verb = match mapping.verb {
      VerbKind::Transmute => Verb::Transmute,
      // A spawned instance is one unit of the parent's work: it completes
      // into the parent's flows instead of spawning again.
      VerbKind::Copy if task != declared => Verb::Transmute,
      VerbKind::Copy => {
        let cardinality = params
          .cardinality
          .ok_or_else(|| incomplete("missing cardinality"))?;
        let instances = match cardinality {
          Cardinality::Topology => 0,
          Cardinality::One => 1,
          Cardinality::Static => {
            let count = graph
              .integer(declared.as_str(), vocab::INSTANCE_COUNT)?
              .ok_or_else(|| self.missing(declared, mapping, vocab::INSTANCE_COUNT))?;
            u32::try_from(count).map_err(|_| ResolveError::MalformedTopology {
              task: declared.to_string(),
              reason: format!("instance count {} is out of range", count),
            })?
          }
          Cardinality::Dynamic | Cardinality::Incremental => {
            let key = graph
              .string(declared.as_str(), vocab::INSTANCE_COUNT_KEY)?
              .unwrap_or(DEFAULT_INSTANCE_COUNT_KEY);
            data_count(task, key, ctx)?
          }
        };
        Verb::Copy {
          cardinality,
          instance_binding: params.instance_binding,
          instances,
          completion_strategy: params.completion_strategy,
        }
      }
      VerbKind::Filter => {
        let selection_mode = params
          .selection_mode
          .ok_or_else(|| incomplete("missing selectionMode"))?;
        Self::check_choice_flows(graph, task)?;
        Verb::Filter { selection_mode }
      }
      VerbKind::Await => {
        let spec = params.threshold.ok_or_else(|| incomplete("missing threshold"))?;
        let threshold = match spec {
          ThresholdSpec::All => Threshold::All,
          ThresholdSpec::Active => Threshold::Active,
          ThresholdSpec::AtLeast(n) => Threshold::AtLeast(n),
          ThresholdSpec::Static => {
            let quorum = graph
              .integer(declared.as_str(), vocab::QUORUM)?
              .ok_or_else(|| self.missing(declared, mapping, vocab::QUORUM))?;
            let quorum = u32::try_from(quorum).map_err(|_| ResolveError::MalformedTopology {
              task: declared.to_string(),
              reason: format!("quorum {} is out of range", quorum),
            })?;
            Threshold::AtLeast(quorum)
          }
          ThresholdSpec::Dynamic => {
            let key = graph
              .string(declared.as_str(), vocab::QUORUM_KEY)?
              .unwrap_or(DEFAULT_QUORUM_KEY);
            Threshold::AtLeast(data_count(task, key, ctx)?)
          }
        };
        Verb::Await {
          threshold,
          reset_on_fire: params.reset_on_fire.unwrap_or(false),
          trigger: params
            .trigger_property
            .as_ref()
            .map(|property| Trigger::new(property.clone(), params.trigger_value.clone())),
        }
      }
      VerbKind::Void => Verb::Void {
        cancellation_scope: params
          .cancellation_scope
          .ok_or_else(|| incomplete("missing cancellationScope"))?,
      },
    };
    Ok(verb)
  }

  fn missing(&self, task: &NodeId, mapping: &PatternMapping, parameter: &'static str) -> ResolveError {
    ResolveError::MissingParameter {
      task: task.to_string(),
      pattern: mapping.name.clone(),
      parameter,
    }
  }

  /// Every flow out of a choice needs a predicate or the default flag.
  fn check_choice_flows(graph: &Graph, task: &NodeId) -> Result<(), ResolveError> {
    for flow in outgoing_flows(graph, task)? {
      if flow.predicate.is_none() && !flow.is_default {
        return Err(ResolveError::MalformedTopology {
          task: task.to_string(),
          reason: format!("flow '{}' has neither a predicate nor the default flag", flow.flow),
        });
      }
    }
    Ok(())
  }
}

impl Resolver for SemanticDriver {
  fn resolve(
    &self,
    graph: &Graph,
    task: &NodeId,
    ctx: &TransactionContext,
  ) -> Result<VerbConfig, ResolveError> {
    if !graph.has_subject(task.as_str()) {
      return Err(ResolveError::UnknownTask {
        task: task.to_string(),
      });
    }

    // Spawned instances behave like the task they were spawned from.
    let declared = root_task(graph, task);
    let signature = Self::signature(graph, declared)?;
    let mapping = self.lookup(task, &signature)?;
    let verb = self.instantiate(graph, task, declared, mapping, ctx)?;

    debug!(
      task = %task,
      signature = %signature,
      pattern = %mapping.name,
      verb = %verb.kind(),
      "task_resolved"
    );

    Ok(VerbConfig::new(mapping.name.clone(), verb))
  }
}

/// Read a non-negative count from the case data.
fn data_count(task: &NodeId, key: &str, ctx: &TransactionContext) -> Result<u32, ResolveError> {
  let value = ctx.data.get(key).ok_or_else(|| ResolveError::MissingData {
    task: task.to_string(),
    key: key.to_string(),
  })?;
  let invalid = |reason: String| ResolveError::InvalidData {
    task: task.to_string(),
    key: key.to_string(),
    reason,
  };

  match value {
    serde_json::Value::Number(n) => n
      .as_u64()
      .and_then(|n| u32::try_from(n).ok())
      .ok_or_else(|| invalid(format!("{} is not a non-negative count", n))),
    serde_json::Value::Array(items) => {
      u32::try_from(items.len()).map_err(|_| invalid("too many items".to_string()))
    }
    other => Err(invalid(format!("expected a number or array, found {}", other))),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use quintet_config::{ControlType, FlowDef, InstancesDef, TaskDef, TriggerMode, WorkflowDef};
  use quintet_graph::{Term, Triple};
  use quintet_kernel::GENESIS_HASH;
  use quintet_ontology::{CancellationScope, InstanceBinding, SelectionMode};
  use quintet_workflow::Topology;
  use serde_json::json;

  fn driver() -> SemanticDriver {
    SemanticDriver::new(PatternOntology::builtin().unwrap())
  }

  fn ctx() -> TransactionContext {
    TransactionContext::new("case", GENESIS_HASH)
  }

  fn compile(tasks: Vec<TaskDef>, flows: Vec<FlowDef>, signals: Vec<&str>) -> Graph {
    let def = WorkflowDef {
      workflow_id: "wf".to_string(),
      name: "wf".to_string(),
      tasks,
      flows,
      regions: Vec::new(),
      signals: signals.into_iter().map(String::from).collect(),
      start: Vec::new(),
    };
    Topology::compile(&def).unwrap().into_graph()
  }

  fn task(id: &str, f: impl FnOnce(&mut TaskDef)) -> TaskDef {
    let mut t = TaskDef::new(id);
    f(&mut t);
    t
  }

  fn resolve(graph: &Graph, id: &str, ctx: &TransactionContext) -> Result<VerbConfig, ResolveError> {
    driver().resolve(graph, &NodeId::from(id), ctx)
  }

  #[test]
  fn test_structural_resolution() {
    let graph = compile(
      vec![
        task("A", |t| t.split = Some(ControlType::And)),
        TaskDef::new("B"),
        TaskDef::new("C"),
        task("D", |t| t.join = Some(ControlType::And)),
      ],
      vec![
        FlowDef::new("A", "B"),
        FlowDef::new("A", "C"),
        FlowDef::new("B", "D"),
        FlowDef::new("C", "D"),
      ],
      Vec::new(),
    );

    let a = resolve(&graph, "A", &ctx()).unwrap();
    assert_eq!(a.pattern, "ParallelSplit");
    assert!(matches!(a.verb, Verb::Copy { cardinality: Cardinality::Topology, .. }));

    let b = resolve(&graph, "B", &ctx()).unwrap();
    assert_eq!(b.pattern, "Sequence");
    assert_eq!(b.verb, Verb::Transmute);

    let d = resolve(&graph, "D", &ctx()).unwrap();
    assert_eq!(d.pattern, "Synchronization");
    assert_eq!(
      d.verb,
      Verb::Await {
        threshold: Threshold::All,
        reset_on_fire: false,
        trigger: None
      }
    );
  }

  #[test]
  fn test_join_before_split_and_xor_join_last() {
    let graph = compile(
      vec![
        task("AndJoinAndSplit", |t| {
          t.join = Some(ControlType::And);
          t.split = Some(ControlType::And);
        }),
        task("XorJoinAndSplit", |t| {
          t.join = Some(ControlType::Xor);
          t.split = Some(ControlType::And);
        }),
        task("XorJoin", |t| t.join = Some(ControlType::Xor)),
      ],
      Vec::new(),
      Vec::new(),
    );

    let sig = |id: &str| SemanticDriver::signature(&graph, &NodeId::from(id)).unwrap();
    assert_eq!(sig("AndJoinAndSplit"), Signature::Key("join:and".to_string()));
    assert_eq!(sig("XorJoinAndSplit"), Signature::Key("split:and".to_string()));
    assert_eq!(sig("XorJoin"), Signature::Key("join:xor".to_string()));
  }

  #[test]
  fn test_join_with_choice_split_is_malformed() {
    let mut graph = compile(
      vec![
        TaskDef::new("B"),
        TaskDef::new("C"),
        task("D", |t| t.join = Some(ControlType::And)),
        TaskDef::new("X"),
        TaskDef::new("Y"),
      ],
      vec![
        FlowDef::new("B", "D"),
        FlowDef::new("C", "D"),
        FlowDef::new("D", "X").with_predicate("go"),
        FlowDef::new("D", "Y").with_predicate("not go"),
      ],
      Vec::new(),
    );
    // Compilation rejects the combination, so add the split afterwards.
    graph.insert(Triple::new("D", vocab::HAS_SPLIT, Term::string("xor")));
    graph.insert(Triple::marker("B", vocab::COMPLETED_AT, "tx-b"));
    graph.insert(Triple::marker("C", vocab::COMPLETED_AT, "tx-c"));
    graph.insert(Triple::token("D"));

    let ctx = ctx().with_value("go", json!(true));
    let err = resolve(&graph, "D", &ctx).unwrap_err();
    assert!(matches!(err, ResolveError::MalformedTopology { ref task, .. } if task == "D"));

    graph.remove(&Triple::new("D", vocab::HAS_JOIN, Term::string("and"))).unwrap();
    graph.insert(Triple::new("D", vocab::HAS_JOIN, Term::string("or")));
    graph.remove(&Triple::new("D", vocab::HAS_SPLIT, Term::string("xor"))).unwrap();
    graph.insert(Triple::new("D", vocab::HAS_SPLIT, Term::string("or")));
    assert!(matches!(
      SemanticDriver::signature(&graph, &NodeId::from("D")),
      Err(ResolveError::MalformedTopology { .. })
    ));
  }

  #[test]
  fn test_explicit_pattern_wins() {
    let graph = compile(
      vec![task("D", |t| {
        t.join = Some(ControlType::And);
        t.pattern = Some("StructuredDiscriminator".to_string());
      })],
      Vec::new(),
      Vec::new(),
    );
    let d = resolve(&graph, "D", &ctx()).unwrap();
    assert_eq!(
      d.verb,
      Verb::Await {
        threshold: Threshold::AtLeast(1),
        reset_on_fire: true,
        trigger: None
      }
    );
  }

  #[test]
  fn test_trigger_modes() {
    let graph = compile(
      vec![
        TaskDef::new("Begin"),
        task("T1", |t| t.triggered_by = vec!["S".to_string()]),
        task("T2", |t| {
          t.triggered_by = vec!["S".to_string()];
          t.trigger_mode = Some(TriggerMode::Persistent);
        }),
      ],
      Vec::new(),
      vec!["S"],
    );

    let t1 = resolve(&graph, "T1", &ctx()).unwrap();
    assert_eq!(t1.pattern, "TransientTrigger");
    let t2 = resolve(&graph, "T2", &ctx()).unwrap();
    assert_eq!(t2.pattern, "PersistentTrigger");
    assert!(matches!(
      t2.verb,
      Verb::Await { trigger: Some(ref trigger), .. } if trigger.is_persistent()
    ));
  }

  #[test]
  fn test_unknown_task_and_pattern() {
    let graph = compile(
      vec![task("A", |t| t.pattern = Some("Teleport".to_string()))],
      Vec::new(),
      Vec::new(),
    );
    assert!(matches!(
      resolve(&graph, "Ghost", &ctx()),
      Err(ResolveError::UnknownTask { .. })
    ));
    assert!(matches!(
      resolve(&graph, "A", &ctx()),
      Err(ResolveError::NoMapping { .. })
    ));
  }

  #[test]
  fn test_choice_requires_predicate_or_default() {
    let graph = compile(
      vec![
        task("A", |t| t.split = Some(ControlType::Xor)),
        TaskDef::new("B"),
        TaskDef::new("C"),
      ],
      vec![
        FlowDef::new("A", "B").with_predicate("ok"),
        FlowDef::new("A", "C"),
      ],
      Vec::new(),
    );
    let err = resolve(&graph, "A", &ctx()).unwrap_err();
    assert!(matches!(err, ResolveError::MalformedTopology { .. }));

    let graph = compile(
      vec![
        task("A", |t| t.split = Some(ControlType::Xor)),
        TaskDef::new("B"),
        TaskDef::new("C"),
      ],
      vec![
        FlowDef::new("A", "B").with_predicate("ok"),
        FlowDef::new("A", "C").as_default(),
      ],
      Vec::new(),
    );
    let a = resolve(&graph, "A", &ctx()).unwrap();
    assert_eq!(
      a.verb,
      Verb::Filter {
        selection_mode: SelectionMode::ExactlyOne
      }
    );
  }

  #[test]
  fn test_multi_instance_counts() {
    let graph = compile(
      vec![
        task("Static", |t| {
          t.pattern = Some("MIWithDesignTimeKnowledge".to_string());
          t.instances = Some(InstancesDef {
            count: Some(3),
            count_key: None,
          });
        }),
        task("Dynamic", |t| {
          t.pattern = Some("MIWithRuntimeKnowledge".to_string());
          t.instances = Some(InstancesDef {
            count: None,
            count_key: Some("reviewers".to_string()),
          });
        }),
        task("Missing", |t| t.pattern = Some("MIWithDesignTimeKnowledge".to_string())),
      ],
      Vec::new(),
      Vec::new(),
    );

    let s = resolve(&graph, "Static", &ctx()).unwrap();
    assert!(matches!(
      s.verb,
      Verb::Copy { instances: 3, instance_binding: Some(InstanceBinding::Index), .. }
    ));

    let data_ctx = ctx().with_value("reviewers", json!(["ann", "bo"]));
    let d = resolve(&graph, "Dynamic", &data_ctx).unwrap();
    assert!(matches!(d.verb, Verb::Copy { instances: 2, .. }));

    let err = resolve(&graph, "Dynamic", &ctx()).unwrap_err();
    assert!(matches!(err, ResolveError::MissingData { key, .. } if key == "reviewers"));

    let err = resolve(&graph, "Missing", &ctx()).unwrap_err();
    assert!(matches!(
      err,
      ResolveError::MissingParameter { parameter: "instanceCount", .. }
    ));

    let bad = ctx().with_value("reviewers", json!(-1));
    assert!(matches!(
      resolve(&graph, "Dynamic", &bad),
      Err(ResolveError::InvalidData { .. })
    ));
  }

  #[test]
  fn test_quorums() {
    let graph = compile(
      vec![
        task("Static", |t| {
          t.pattern = Some("StructuredPartialJoin".to_string());
          t.quorum = Some(2);
        }),
        task("Dynamic", |t| t.pattern = Some("DynamicPartialJoinMI".to_string())),
      ],
      Vec::new(),
      Vec::new(),
    );

    let s = resolve(&graph, "Static", &ctx()).unwrap();
    assert!(matches!(s.verb, Verb::Await { threshold: Threshold::AtLeast(2), .. }));

    let d = resolve(&graph, "Dynamic", &ctx().with_value("quorum", json!(4))).unwrap();
    assert!(matches!(d.verb, Verb::Await { threshold: Threshold::AtLeast(4), .. }));
  }

  #[test]
  fn test_instance_resolves_under_parent_pattern() {
    let mut graph = compile(
      vec![task("W", |t| {
        t.pattern = Some("MIWithDesignTimeKnowledge".to_string());
        t.instances = Some(InstancesDef {
          count: Some(2),
          count_key: None,
        });
      })],
      Vec::new(),
      Vec::new(),
    );
    graph.insert(Triple::new("W[0]", vocab::INSTANCE_OF, Term::node("W")));

    let inst = resolve(&graph, "W[0]", &ctx()).unwrap();
    assert_eq!(inst.pattern, "MIWithDesignTimeKnowledge");
    assert_eq!(inst.verb, Verb::Transmute);
  }

  #[test]
  fn test_cancellation_pattern() {
    let graph = compile(
      vec![task("Stop", |t| t.pattern = Some("CancelCase".to_string()))],
      Vec::new(),
      Vec::new(),
    );
    let stop = resolve(&graph, "Stop", &ctx()).unwrap();
    assert_eq!(
      stop.verb,
      Verb::Void {
        cancellation_scope: CancellationScope::Case
      }
    );
  }
}
