//! Quintet Ontology
//!
//! The pattern ontology is a small RDF dataset, loaded once, that maps each
//! named workflow control-flow pattern onto one of the five verbs together
//! with the policy parameters that specialise the verb (join threshold,
//! instance cardinality, selection mode, cancellation scope and so on).
//!
//! The dataset is written in Turtle. It is parsed into a [`quintet_graph::Graph`]
//! and every mapping is validated against the closed parameter vocabularies in
//! [`params`]. Lookups are basic-graph-pattern queries over that graph, so a
//! custom ontology file is consulted exactly the same way as the built-in one.

mod error;
mod mapping;
mod ontology;
pub mod params;
mod turtle;

pub use error::OntologyError;
pub use mapping::{MappingParams, PatternMapping};
pub use ontology::{PATTERN_COUNT, PatternOntology};
pub use params::{
  Cardinality, CancellationScope, CompletionStrategy, InstanceBinding, SelectionMode,
  ThresholdSpec, VerbKind,
};

/// Predicate and class names used inside the ontology dataset, with the
/// `urn:quintet:pattern#` namespace stripped.
pub mod terms {
  pub const NAMESPACE: &str = "urn:quintet:pattern#";

  pub const TYPE: &str = "type";
  pub const VERB_CLASS: &str = "Verb";
  pub const MAPPING_CLASS: &str = "PatternMapping";

  pub const NAME: &str = "name";
  pub const VERB: &str = "verb";
  pub const STRUCTURAL_KEY: &str = "structuralKey";

  pub const THRESHOLD: &str = "threshold";
  pub const CARDINALITY: &str = "cardinality";
  pub const COMPLETION_STRATEGY: &str = "completionStrategy";
  pub const SELECTION_MODE: &str = "selectionMode";
  pub const CANCELLATION_SCOPE: &str = "cancellationScope";
  pub const RESET_ON_FIRE: &str = "resetOnFire";
  pub const INSTANCE_BINDING: &str = "instanceBinding";
  pub const TRIGGER_PROPERTY: &str = "triggerProperty";
  pub const TRIGGER_VALUE: &str = "triggerValue";
}
