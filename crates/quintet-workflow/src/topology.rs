use std::collections::HashSet;

use tracing::debug;

use quintet_config::{ControlType, FlowDef, TaskDef, WorkflowDef};
use quintet_graph::{Graph, NodeId, Term, Triple, vocab};
use quintet_predicate::Expr;

use crate::error::WorkflowError;

/// Node id of the reified flow between two tasks.
pub fn flow_id(from: &str, to: &str) -> NodeId {
  NodeId::new(format!("{}->{}", from, to))
}

/// A validated workflow compiled into structural triples.
#[derive(Debug, Clone)]
pub struct Topology {
  pub workflow_id: String,
  pub name: String,
  graph: Graph,
  start: Vec<NodeId>,
}

impl Topology {
  /// Validate a definition and compile it.
  pub fn compile(def: &WorkflowDef) -> Result<Self, WorkflowError> {
    let task_ids = Self::validate_node_ids(def)?;
    let signal_ids: HashSet<&str> = def.signals.iter().map(String::as_str).collect();
    let region_ids: HashSet<&str> = def.regions.iter().map(|r| r.region_id.as_str()).collect();

    Self::validate_flows(&task_ids, &def.flows)?;
    for task in &def.tasks {
      Self::validate_task_references(task, &task_ids, &signal_ids, &region_ids)?;
      Self::validate_routing(task)?;
    }
    for region in &def.regions {
      for member in &region.members {
        if !task_ids.contains(member.as_str()) {
          return Err(WorkflowError::UnknownRegionMember {
            region_id: region.region_id.clone(),
            node_id: member.clone(),
          });
        }
      }
    }

    let start = Self::entry_points(def, &task_ids)?;

    let mut graph = Graph::new();
    for signal in &def.signals {
      graph.insert(kind(signal, "signal"));
    }
    for task in &def.tasks {
      compile_task(&mut graph, task);
    }
    for flow in &def.flows {
      compile_flow(&mut graph, flow)?;
    }
    for region in &def.regions {
      graph.insert(kind(&region.region_id, "region"));
      for member in &region.members {
        graph.insert(Triple::new(
          region.region_id.as_str(),
          vocab::HAS_MEMBER,
          Term::node(member),
        ));
      }
    }

    debug!(
      workflow_id = %def.workflow_id,
      tasks = def.tasks.len(),
      flows = def.flows.len(),
      triples = graph.len(),
      "topology_compiled"
    );

    Ok(Self {
      workflow_id: def.workflow_id.clone(),
      name: def.name.clone(),
      graph,
      start,
    })
  }

  /// Structural triples of the workflow.
  pub fn graph(&self) -> &Graph {
    &self.graph
  }

  pub fn into_graph(self) -> Graph {
    self.graph
  }

  /// Tasks that receive a token when a case starts.
  pub fn start(&self) -> &[NodeId] {
    &self.start
  }

  /// Tasks, signals and regions share one namespace.
  fn validate_node_ids(def: &WorkflowDef) -> Result<HashSet<&str>, WorkflowError> {
    let mut seen = HashSet::new();
    let all = def
      .tasks
      .iter()
      .map(|t| t.task_id.as_str())
      .chain(def.signals.iter().map(String::as_str))
      .chain(def.regions.iter().map(|r| r.region_id.as_str()));
    for id in all {
      if !seen.insert(id) {
        return Err(WorkflowError::DuplicateNodeId {
          node_id: id.to_string(),
        });
      }
    }

    Ok(def.tasks.iter().map(|t| t.task_id.as_str()).collect())
  }

  fn validate_flows(task_ids: &HashSet<&str>, flows: &[FlowDef]) -> Result<(), WorkflowError> {
    let mut seen = HashSet::new();
    for flow in flows {
      if !task_ids.contains(flow.from.as_str()) || !task_ids.contains(flow.to.as_str()) {
        return Err(WorkflowError::InvalidFlow {
          from: flow.from.clone(),
          to: flow.to.clone(),
        });
      }
      if !seen.insert((flow.from.as_str(), flow.to.as_str())) {
        return Err(WorkflowError::DuplicateFlow {
          from: flow.from.clone(),
          to: flow.to.clone(),
        });
      }
    }
    Ok(())
  }

  fn validate_task_references(
    task: &TaskDef,
    task_ids: &HashSet<&str>,
    signal_ids: &HashSet<&str>,
    region_ids: &HashSet<&str>,
  ) -> Result<(), WorkflowError> {
    let unknown = |kind: &'static str, target: &String| WorkflowError::UnknownReference {
      task_id: task.task_id.clone(),
      kind,
      target: target.clone(),
    };

    for signal in &task.triggered_by {
      if !signal_ids.contains(signal.as_str()) {
        return Err(unknown("signal", signal));
      }
    }
    for region in &task.cancels_regions {
      if !region_ids.contains(region.as_str()) {
        return Err(unknown("region", region));
      }
    }
    for target in &task.cancels_instances_of {
      if !task_ids.contains(target.as_str()) {
        return Err(unknown("task", target));
      }
    }
    Ok(())
  }

  /// A synchronizing join fires every outgoing flow, so it cannot also carry
  /// a split that selects flows by predicate.
  fn validate_routing(task: &TaskDef) -> Result<(), WorkflowError> {
    match (task.join, task.split) {
      (
        Some(join @ (ControlType::And | ControlType::Or)),
        Some(split @ (ControlType::Xor | ControlType::Or)),
      ) => Err(WorkflowError::ConflictingRouting {
        task_id: task.task_id.clone(),
        join,
        split,
      }),
      _ => Ok(()),
    }
  }

  /// Explicit `start` list, or every task with neither an incoming flow nor
  /// a trigger.
  fn entry_points(def: &WorkflowDef, task_ids: &HashSet<&str>) -> Result<Vec<NodeId>, WorkflowError> {
    if !def.start.is_empty() {
      for id in &def.start {
        if !task_ids.contains(id.as_str()) {
          return Err(WorkflowError::InvalidStart {
            node_id: id.clone(),
          });
        }
      }
      return Ok(def.start.iter().map(NodeId::from).collect());
    }

    let targets: HashSet<&str> = def.flows.iter().map(|f| f.to.as_str()).collect();
    let entry: Vec<NodeId> = def
      .tasks
      .iter()
      .filter(|t| !targets.contains(t.task_id.as_str()) && t.triggered_by.is_empty())
      .map(|t| NodeId::from(&t.task_id))
      .collect();

    if entry.is_empty() {
      return Err(WorkflowError::NoEntryPoints);
    }
    Ok(entry)
  }
}

fn kind(node: &str, kind: &str) -> Triple {
  Triple::new(node, vocab::NODE_KIND, Term::string(kind))
}

fn compile_task(graph: &mut Graph, task: &TaskDef) {
  let id = task.task_id.as_str();
  graph.insert(kind(id, "task"));

  if let Some(split) = task.split {
    graph.insert(Triple::new(id, vocab::HAS_SPLIT, Term::string(split.as_str())));
  }
  if let Some(join) = task.join {
    graph.insert(Triple::new(id, vocab::HAS_JOIN, Term::string(join.as_str())));
  }
  if let Some(pattern) = &task.pattern {
    graph.insert(Triple::new(id, vocab::PATTERN, Term::string(pattern)));
  }
  for signal in &task.triggered_by {
    graph.insert(Triple::new(id, vocab::TRIGGERED_BY, Term::node(signal)));
  }
  if let Some(mode) = task.trigger_mode {
    graph.insert(Triple::new(id, vocab::TRIGGER_MODE, Term::string(mode.as_str())));
  }
  if let Some(instances) = &task.instances {
    if let Some(count) = instances.count {
      graph.insert(Triple::new(id, vocab::INSTANCE_COUNT, Term::integer(count.into())));
    }
    if let Some(key) = &instances.count_key {
      graph.insert(Triple::new(id, vocab::INSTANCE_COUNT_KEY, Term::string(key)));
    }
  }
  if let Some(quorum) = task.quorum {
    graph.insert(Triple::new(id, vocab::QUORUM, Term::integer(quorum.into())));
  }
  if let Some(key) = &task.quorum_key {
    graph.insert(Triple::new(id, vocab::QUORUM_KEY, Term::string(key)));
  }
  for region in &task.cancels_regions {
    graph.insert(Triple::new(id, vocab::CANCELS_REGION, Term::node(region)));
  }
  for target in &task.cancels_instances_of {
    graph.insert(Triple::new(id, vocab::CANCELS_INSTANCES_OF, Term::node(target)));
  }
}

fn compile_flow(graph: &mut Graph, flow: &FlowDef) -> Result<(), WorkflowError> {
  let id = flow_id(&flow.from, &flow.to);

  graph.insert(kind(id.as_str(), "flow"));
  graph.insert(Triple::new(flow.from.as_str(), vocab::FLOWS_INTO, Term::node(&id)));
  graph.insert(Triple::new(&id, vocab::NEXT_ELEMENT, Term::node(&flow.to)));
  graph.insert(Triple::new(&id, vocab::ORDERING, Term::integer(flow.ordering)));

  if let Some(predicate) = &flow.predicate {
    Expr::parse(predicate).map_err(|source| WorkflowError::InvalidPredicate {
      from: flow.from.clone(),
      to: flow.to.clone(),
      source,
    })?;
    graph.insert(Triple::new(&id, vocab::PREDICATE, Term::string(predicate)));
  }
  if flow.default {
    graph.insert(Triple::new(&id, vocab::IS_DEFAULT_FLOW, Term::boolean(true)));
  }
  Ok(())
}
