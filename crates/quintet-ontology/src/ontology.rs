use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, info};

use quintet_graph::{Graph, Literal, NodeId, PatternTerm, Term, TriplePattern};

use crate::error::OntologyError;
use crate::mapping::{MappingParams, PatternMapping};
use crate::params::VerbKind;
use crate::terms;
use crate::turtle;

/// Number of pattern mappings a complete ontology declares.
pub const PATTERN_COUNT: usize = 41;

const BUILTIN: &str = include_str!("../ontology/patterns.ttl");

/// The loaded, validated pattern dataset.
///
/// Read-only once constructed; lookups go through graph-pattern queries
/// against the underlying triples.
#[derive(Debug, Clone)]
pub struct PatternOntology {
  graph: Graph,
  /// Mapping resource -> validated mapping.
  mappings: BTreeMap<NodeId, PatternMapping>,
}

impl PatternOntology {
  /// The ontology shipped with the crate.
  pub fn builtin() -> Result<Self, OntologyError> {
    Self::from_turtle(BUILTIN)
  }

  /// Load a Turtle file from disk.
  pub fn load(path: &Path) -> Result<Self, OntologyError> {
    let source = std::fs::read_to_string(path).map_err(|source| OntologyError::Io {
      path: path.display().to_string(),
      source,
    })?;
    Self::from_turtle(&source)
  }

  pub fn from_turtle(source: &str) -> Result<Self, OntologyError> {
    Self::from_graph(turtle::parse(source)?)
  }

  /// Validate a dataset that is already in graph form.
  pub fn from_graph(graph: Graph) -> Result<Self, OntologyError> {
    let verbs = declared_verbs(&graph)?;

    let mut mappings = BTreeMap::new();
    let mut names = BTreeSet::new();
    for resource in instances_of(&graph, terms::MAPPING_CLASS) {
      let mapping = read_mapping(&graph, &resource, &verbs)?;
      mapping.validate()?;
      if !names.insert(mapping.name.clone()) {
        return Err(OntologyError::DuplicatePattern { name: mapping.name });
      }
      mappings.insert(resource, mapping);
    }

    if mappings.len() != PATTERN_COUNT {
      return Err(OntologyError::MappingCount {
        expected: PATTERN_COUNT,
        found: mappings.len(),
      });
    }

    info!(
      verbs = verbs.len(),
      mappings = mappings.len(),
      triples = graph.len(),
      "ontology_loaded"
    );

    Ok(Self { graph, mappings })
  }

  pub fn graph(&self) -> &Graph {
    &self.graph
  }

  pub fn len(&self) -> usize {
    self.mappings.len()
  }

  pub fn is_empty(&self) -> bool {
    self.mappings.is_empty()
  }

  /// All mappings ordered by pattern name.
  pub fn mappings(&self) -> Vec<&PatternMapping> {
    let mut all: Vec<_> = self.mappings.values().collect();
    all.sort_by(|a, b| a.name.cmp(&b.name));
    all
  }

  /// Mappings whose `name` equals `name`.
  pub fn find_by_name(&self, name: &str) -> Vec<&PatternMapping> {
    self.find(terms::NAME, name)
  }

  /// Mappings registered for a structural key such as `join:and`.
  pub fn find_by_structural_key(&self, key: &str) -> Vec<&PatternMapping> {
    self.find(terms::STRUCTURAL_KEY, key)
  }

  /// `?m type PatternMapping . ?m <property> "value"`
  fn find(&self, property: &str, value: &str) -> Vec<&PatternMapping> {
    let solutions = self.graph.query(&[
      TriplePattern::new(
        PatternTerm::var("m"),
        PatternTerm::node(terms::TYPE),
        PatternTerm::node(terms::MAPPING_CLASS),
      ),
      TriplePattern::new(
        PatternTerm::var("m"),
        PatternTerm::node(property),
        PatternTerm::literal(Literal::String(value.to_string())),
      ),
    ]);

    let found: Vec<&PatternMapping> = solutions
      .iter()
      .filter_map(|b| b.get("m").and_then(Term::as_node))
      .filter_map(|m| self.mappings.get(m))
      .collect();

    debug!(property, value, matches = found.len(), "ontology_query");
    found
  }
}

fn instances_of(graph: &Graph, class: &str) -> Vec<NodeId> {
  graph
    .subjects(terms::TYPE, &Term::node(class))
    .cloned()
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect()
}

fn declared_verbs(graph: &Graph) -> Result<BTreeSet<VerbKind>, OntologyError> {
  let declared = instances_of(graph, terms::VERB_CLASS);
  let verbs: BTreeSet<VerbKind> = declared
    .iter()
    .filter_map(|v| VerbKind::from_str(v.as_str()).ok())
    .collect();

  if declared.len() != VerbKind::ALL.len() || verbs.len() != VerbKind::ALL.len() {
    return Err(OntologyError::VerbSet {
      found: declared.iter().map(|v| v.to_string()).collect(),
    });
  }
  Ok(verbs)
}

fn read_mapping(
  graph: &Graph,
  resource: &NodeId,
  verbs: &BTreeSet<VerbKind>,
) -> Result<PatternMapping, OntologyError> {
  let invalid = |reason: String| OntologyError::InvalidMapping {
    mapping: resource.to_string(),
    reason,
  };

  for triple in graph.matching(Some(resource.as_str()), None, None) {
    if !is_mapping_property(triple.predicate.as_str()) {
      return Err(invalid(format!("unknown property '{}'", triple.predicate)));
    }
  }

  let name = match single(graph, resource, terms::NAME).map_err(&invalid)? {
    Some(Term::Literal(Literal::String(name))) => name.clone(),
    Some(_) => return Err(invalid("name must be a string".to_string())),
    None => return Err(invalid("missing name".to_string())),
  };

  let verb = match single(graph, resource, terms::VERB).map_err(&invalid)? {
    Some(Term::Node(verb)) => VerbKind::from_str(verb.as_str())?,
    Some(_) => return Err(invalid("verb must be a resource".to_string())),
    None => return Err(invalid("missing verb".to_string())),
  };
  if !verbs.contains(&verb) {
    return Err(invalid(format!("verb {} is not declared", verb)));
  }

  let text = |property: &str| -> Result<Option<String>, OntologyError> {
    match single(graph, resource, property).map_err(&invalid)? {
      None => Ok(None),
      Some(Term::Literal(Literal::String(s))) => Ok(Some(s.clone())),
      Some(other) => Err(invalid(format!("{} must be a string, found {}", property, other))),
    }
  };
  let reset_on_fire = match single(graph, resource, terms::RESET_ON_FIRE).map_err(&invalid)? {
    None => None,
    Some(Term::Literal(Literal::Bool(b))) => Some(*b),
    Some(other) => return Err(invalid(format!("resetOnFire must be a boolean, found {}", other))),
  };
  let trigger_value = match single(graph, resource, terms::TRIGGER_VALUE).map_err(&invalid)? {
    None => None,
    Some(Term::Literal(lit)) => Some(lit.clone()),
    Some(other) => return Err(invalid(format!("triggerValue must be a literal, found {}", other))),
  };

  let params = MappingParams {
    threshold: parse_value(text(terms::THRESHOLD)?)?,
    cardinality: parse_value(text(terms::CARDINALITY)?)?,
    completion_strategy: parse_value(text(terms::COMPLETION_STRATEGY)?)?,
    selection_mode: parse_value(text(terms::SELECTION_MODE)?)?,
    cancellation_scope: parse_value(text(terms::CANCELLATION_SCOPE)?)?,
    reset_on_fire,
    instance_binding: parse_value(text(terms::INSTANCE_BINDING)?)?,
    trigger_property: text(terms::TRIGGER_PROPERTY)?,
    trigger_value,
  };

  Ok(PatternMapping {
    name,
    verb,
    structural_key: text(terms::STRUCTURAL_KEY)?,
    params,
  })
}

fn parse_value<T>(text: Option<String>) -> Result<Option<T>, OntologyError>
where
  T: FromStr<Err = OntologyError>,
{
  text.map(|s| s.parse()).transpose()
}

fn is_mapping_property(predicate: &str) -> bool {
  matches!(
    predicate,
    terms::TYPE
      | terms::NAME
      | terms::VERB
      | terms::STRUCTURAL_KEY
      | terms::THRESHOLD
      | terms::CARDINALITY
      | terms::COMPLETION_STRATEGY
      | terms::SELECTION_MODE
      | terms::CANCELLATION_SCOPE
      | terms::RESET_ON_FIRE
      | terms::INSTANCE_BINDING
      | terms::TRIGGER_PROPERTY
      | terms::TRIGGER_VALUE
  )
}

/// The only object of `(resource, property, ?)`, if any.
fn single<'g>(graph: &'g Graph, resource: &NodeId, property: &str) -> Result<Option<&'g Term>, String> {
  let mut objects = graph.objects(resource.as_str(), property);
  let first = objects.next();
  if objects.next().is_some() {
    return Err(format!("'{}' is given more than once", property));
  }
  Ok(first)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::params::{Cardinality, CancellationScope, InstanceBinding, SelectionMode, ThresholdSpec};

  #[test]
  fn test_builtin_has_every_pattern() {
    let ontology = PatternOntology::builtin().unwrap();
    assert_eq!(ontology.len(), PATTERN_COUNT);

    let per_verb = |verb: VerbKind| ontology.mappings().iter().filter(|m| m.verb == verb).count();
    assert_eq!(per_verb(VerbKind::Transmute), 3);
    assert_eq!(per_verb(VerbKind::Copy), 7);
    assert_eq!(per_verb(VerbKind::Filter), 10);
    assert_eq!(per_verb(VerbKind::Await), 15);
    assert_eq!(per_verb(VerbKind::Void), 6);
  }

  #[test]
  fn test_find_by_name() {
    let ontology = PatternOntology::builtin().unwrap();
    let found = ontology.find_by_name("StructuredDiscriminator");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].verb, VerbKind::Await);
    assert_eq!(found[0].params.threshold, Some(ThresholdSpec::AtLeast(1)));
    assert_eq!(found[0].params.reset_on_fire, Some(true));

    assert!(ontology.find_by_name("NoSuchPattern").is_empty());
  }

  #[test]
  fn test_structural_keys_are_unique() {
    let ontology = PatternOntology::builtin().unwrap();
    let expected = [
      ("none", "Sequence"),
      ("split:and", "ParallelSplit"),
      ("split:xor", "ExclusiveChoice"),
      ("split:or", "MultiChoice"),
      ("join:and", "Synchronization"),
      ("join:xor", "SimpleMerge"),
      ("join:or", "StructuredSynchronizingMerge"),
      ("trigger:transient", "TransientTrigger"),
      ("trigger:persistent", "PersistentTrigger"),
    ];
    for (key, pattern) in expected {
      let found = ontology.find_by_structural_key(key);
      assert_eq!(found.len(), 1, "key {}", key);
      assert_eq!(found[0].name, pattern);
    }
  }

  #[test]
  fn test_builtin_parameters() {
    let ontology = PatternOntology::builtin().unwrap();
    let get = |name: &str| ontology.find_by_name(name)[0].clone();

    let split = get("ParallelSplit");
    assert_eq!(split.params.cardinality, Some(Cardinality::Topology));

    let mi = get("MIWithDesignTimeKnowledge");
    assert_eq!(mi.params.cardinality, Some(Cardinality::Static));
    assert_eq!(mi.params.instance_binding, Some(InstanceBinding::Index));

    assert_eq!(
      get("MultiChoice").params.selection_mode,
      Some(SelectionMode::OneOrMore)
    );
    assert_eq!(
      get("CancelMIActivity").params.cancellation_scope,
      Some(CancellationScope::Instances)
    );

    let persistent = get("PersistentTrigger");
    assert_eq!(persistent.params.trigger_property.as_deref(), Some("completedAt"));
    assert_eq!(persistent.params.trigger_value, None);

    let milestone = get("Milestone");
    assert_eq!(milestone.params.trigger_value, Some(Literal::Bool(true)));
  }

  #[test]
  fn test_missing_verb_declaration() {
    let source = BUILTIN.replace("pat:Void a pat:Verb ; rdfs:label \"Void\" .", "");
    let err = PatternOntology::from_turtle(&source).unwrap_err();
    assert!(matches!(err, OntologyError::VerbSet { .. }));
  }

  #[test]
  fn test_illegal_parameter_for_verb() {
    let source = BUILTIN.replace(
      "pat:name \"Sequence\" ;",
      "pat:name \"Sequence\" ;\n  pat:cancellationScope \"case\" ;",
    );
    let err = PatternOntology::from_turtle(&source).unwrap_err();
    assert!(matches!(err, OntologyError::InvalidMapping { .. }));
  }

  #[test]
  fn test_unknown_parameter_value() {
    let source = BUILTIN.replace("pat:selectionMode \"mutex\"", "pat:selectionMode \"maybe\"");
    let err = PatternOntology::from_turtle(&source).unwrap_err();
    assert!(matches!(
      err,
      OntologyError::UnknownValue { parameter: "selectionMode", .. }
    ));
  }

  #[test]
  fn test_duplicate_pattern_name() {
    let source = BUILTIN.replace("pat:name \"MultiMerge\"", "pat:name \"SimpleMerge\"");
    let err = PatternOntology::from_turtle(&source).unwrap_err();
    assert!(matches!(err, OntologyError::DuplicatePattern { name } if name == "SimpleMerge"));
  }

  #[test]
  fn test_mapping_count_enforced() {
    let source = BUILTIN.replace("pat:AuthorizationGateMapping a pat:PatternMapping ;", "pat:AuthorizationGateMapping a pat:Retired ;");
    let err = PatternOntology::from_turtle(&source).unwrap_err();
    assert!(matches!(err, OntologyError::MappingCount { expected: 41, found: 40 }));
  }

  #[test]
  fn test_load_missing_file() {
    let err = PatternOntology::load(Path::new("/nonexistent/patterns.ttl")).unwrap_err();
    assert!(matches!(err, OntologyError::Io { .. }));
  }
}
